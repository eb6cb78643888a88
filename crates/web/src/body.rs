//! Request body reading and the response body type.
//!
//! The request side buffers the whole body (up to a limit) and parses it as a JSON object.
//! The response side is always a single, fully encoded chunk.

use crate::error::BodyParseError;
use crate::request::JsonBody;
use bytes::Bytes;
use http::Method;
use http_body::Body as HttpBody;
use http_body::{Frame, SizeHint};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::Value;
use std::convert::Infallible;
use std::error::Error;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Default cap on a buffered request body: 1 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Returns false for methods that carry no request body:
/// - GET
/// - HEAD
/// - DELETE
/// - OPTIONS
/// - CONNECT
/// - TRACE
#[inline]
pub fn carries_body(method: &Method) -> bool {
    !matches!(
        *method,
        Method::GET | Method::HEAD | Method::DELETE | Method::OPTIONS | Method::CONNECT | Method::TRACE
    )
}

/// Reads the request body and parses it as a JSON object.
///
/// Methods without a body resolve to an empty object and leave `body` untouched. Otherwise
/// every frame is accumulated until the stream ends or `limit` bytes have been exceeded.
pub async fn read_json_body<B>(method: &Method, body: B, limit: usize) -> Result<JsonBody, BodyParseError>
where
    B: HttpBody,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    if !carries_body(method) {
        return Ok(JsonBody::new());
    }

    let collected = Limited::new(body, limit).collect().await.map_err(|e| {
        if e.downcast_ref::<LengthLimitError>().is_some() {
            BodyParseError::too_large(limit)
        } else {
            BodyParseError::read(e)
        }
    })?;

    match serde_json::from_slice::<Value>(&collected.to_bytes())? {
        Value::Object(map) => Ok(map),
        _ => Err(BodyParseError::NotAnObject),
    }
}

/// A response body holding at most one chunk of bytes.
#[derive(Debug)]
pub struct ResponseBody {
    inner: Option<Bytes>,
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self { inner: None }
    }

    pub fn once(bytes: Bytes) -> Self {
        if bytes.is_empty() { Self::empty() } else { Self { inner: Some(bytes) } }
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        Self::once(Bytes::from(value))
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(value: Vec<u8>) -> Self {
        Self::once(Bytes::from(value))
    }
}

impl From<&'static str> for ResponseBody {
    fn from(value: &'static str) -> Self {
        Self::once(Bytes::from_static(value.as_bytes()))
    }
}

impl From<()> for ResponseBody {
    fn from((): ()) -> Self {
        Self::empty()
    }
}

impl HttpBody for ResponseBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.get_mut().inner.take().map(|bytes| Ok(Frame::data(bytes))))
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        match &self.inner {
            None => SizeHint::with_exact(0),
            Some(bytes) => SizeHint::with_exact(bytes.len() as u64),
        }
    }
}
