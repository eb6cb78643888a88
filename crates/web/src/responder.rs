//! Response handling module that converts handler results into HTTP responses.
//!
//! Every response leaving the server is a JSON [`Envelope`]:
//!
//! ```json
//! { "isError": false, "data": [ { "patientID": 1, "name": "A" } ] }
//! { "isError": true, "data": "Method not allowed" }
//! ```
//!
//! A failure only ever puts its human-readable message on the wire. Structured detail
//! (error codes, the statement that failed, source chains) stays on the server side.
//!
//! The [`Responder`] trait is the last step of the response pipeline, handlers return any
//! `Responder` and the dispatcher turns it into the final `Response`.

use crate::body::ResponseBody;
use crate::error::{BodyParseError, DispatchError, RoutingError};
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use std::error::Error;
use tracing::error;

const APPLICATION_JSON: &str = "application/json";
const ENCODE_FAILURE: &str = r#"{"isError":true,"data":"failed to encode response"}"#;

/// The uniform JSON wrapper around every payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T = Value> {
    pub is_error: bool,
    pub data: T,
    /// Optional echo field. The server never fills it, clients may see it from other producers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self { is_error: false, data, err: None }
    }
}

impl Envelope<Value> {
    /// Wraps a failure, keeping only its message.
    pub fn failure<E: Error + ?Sized>(err: &E) -> Self {
        Self { is_error: true, data: Value::String(err.to_string()), err: None }
    }
}

/// Writes `envelope` as the JSON body of a response with the given status.
pub fn write_envelope<T: Serialize>(status: StatusCode, envelope: &Envelope<T>) -> Response<ResponseBody> {
    match serde_json::to_vec(envelope) {
        Ok(bytes) => json_response(status, ResponseBody::from(bytes)),
        Err(e) => {
            error!(cause = %e, "failed to encode response envelope");
            json_response(StatusCode::INTERNAL_SERVER_ERROR, ResponseBody::from(ENCODE_FAILURE))
        }
    }
}

/// Shorthand for a failure envelope with an explicit status.
pub fn write_failure<E: Error + ?Sized>(status: StatusCode, err: &E) -> Response<ResponseBody> {
    write_envelope(status, &Envelope::failure(err))
}

fn json_response(status: StatusCode, body: ResponseBody) -> Response<ResponseBody> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    response
}

/// A trait for types that can be converted into HTTP responses.
///
/// Types implementing this trait can be returned directly from request handlers
/// and will be automatically converted into HTTP responses.
pub trait Responder {
    fn into_response(self) -> Response<ResponseBody>;
}

/// A bare envelope answers 200 on success and 500 on failure.
impl<T: Serialize> Responder for Envelope<T> {
    fn into_response(self) -> Response<ResponseBody> {
        let status = if self.is_error { StatusCode::INTERNAL_SERVER_ERROR } else { StatusCode::OK };
        write_envelope(status, &self)
    }
}

/// Implementation for Result allows handlers to return Result types directly.
/// The Ok and Err variants must both implement Responder.
impl<T: Responder, E: Responder> Responder for Result<T, E> {
    fn into_response(self) -> Response<ResponseBody> {
        match self {
            Ok(t) => t.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

/// Implementation for (StatusCode, T) tuple allows setting a status code
/// along with the response content.
impl<T: Responder> Responder for (StatusCode, T) {
    fn into_response(self) -> Response<ResponseBody> {
        let (status, responder) = self;
        let mut response = responder.into_response();
        *response.status_mut() = status;
        response
    }
}

/// Pre-built responses pass through untouched.
impl Responder for Response<ResponseBody> {
    fn into_response(self) -> Response<ResponseBody> {
        self
    }
}

impl Responder for RoutingError {
    fn into_response(self) -> Response<ResponseBody> {
        write_failure(self.status(), &self)
    }
}

impl Responder for BodyParseError {
    fn into_response(self) -> Response<ResponseBody> {
        write_failure(self.status(), &self)
    }
}

impl Responder for DispatchError {
    fn into_response(self) -> Response<ResponseBody> {
        write_failure(self.status(), &self)
    }
}

impl Responder for Infallible {
    fn into_response(self) -> Response<ResponseBody> {
        match self {}
    }
}

#[cfg(test)]
mod tests {
    use super::{Envelope, Responder, write_envelope};
    use crate::body::ResponseBody;
    use crate::error::{BodyParseError, RoutingError};
    use http::header::CONTENT_TYPE;
    use http::{Response, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    async fn decode(response: Response<ResponseBody>) -> Envelope {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_round_trip() {
        let payload = json!([{ "patientID": 1, "name": "A", "dateOfBirth": "2000-01-01T00:00:00.000Z" }]);

        let response = write_envelope(StatusCode::OK, &Envelope::success(payload.clone()));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], mime::APPLICATION_JSON.as_ref());

        let envelope = decode(response).await;
        assert!(!envelope.is_error);
        assert_eq!(envelope.data, payload);
        assert_eq!(envelope.err, None);
    }

    #[tokio::test]
    async fn test_failure_only_carries_message() {
        let err = std::io::Error::other("Table 'lab5.nope' doesn't exist");
        let envelope = decode(Envelope::failure(&err).into_response()).await;

        assert!(envelope.is_error);
        assert_eq!(envelope.data, Value::String("Table 'lab5.nope' doesn't exist".into()));
    }

    #[test]
    fn test_bare_envelope_status() {
        assert_eq!(Envelope::success(json!(1)).into_response().status(), StatusCode::OK);
        let err = std::io::Error::other("boom");
        assert_eq!(Envelope::failure(&err).into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_override() {
        let response = (StatusCode::ACCEPTED, Envelope::success(json!({}))).into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn test_err_field_is_omitted() {
        let encoded = serde_json::to_string(&Envelope::success(json!("ok"))).unwrap();
        assert_eq!(encoded, r#"{"isError":false,"data":"ok"}"#);

        let decoded: Envelope = serde_json::from_str(r#"{"isError":true,"data":"x","err":"y"}"#).unwrap();
        assert_eq!(decoded.err.as_deref(), Some("y"));
    }

    #[tokio::test]
    async fn test_routing_errors() {
        let response = RoutingError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let envelope = decode(response).await;
        assert!(envelope.is_error);
        assert_eq!(envelope.data, json!("Method not allowed"));

        let response = RoutingError::not_found("/missing").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(decode(response).await.data, json!("Could not find route at /missing"));
    }

    #[tokio::test]
    async fn test_body_parse_error() {
        let response = BodyParseError::NotAnObject.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(decode(response).await.data, json!("request body must be a json object"));
    }
}
