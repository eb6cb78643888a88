use http::StatusCode;
use thiserror::Error;

/// No registered route for the request. Raised by the dispatcher before any handler runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Could not find route at {path}")]
    NotFound { path: String },
}

impl RoutingError {
    pub fn not_found<S: ToString>(path: S) -> Self {
        Self::NotFound { path: path.to_string() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RoutingError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RoutingError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

/// The request body could not be turned into a JSON object.
#[derive(Error, Debug)]
pub enum BodyParseError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {reason}")]
    Read { reason: String },

    #[error("request body is not valid json: {source}")]
    InvalidJson {
        #[from]
        source: serde_json::Error,
    },

    #[error("request body must be a json object")]
    NotAnObject,
}

impl BodyParseError {
    pub fn too_large(limit: usize) -> Self {
        Self::TooLarge { limit }
    }

    pub fn read<S: ToString>(str: S) -> Self {
        Self::Read { reason: str.to_string() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BodyParseError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Any failure the dispatcher answers by itself, without reaching a handler.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    BodyParse(#[from] BodyParseError),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Routing(e) => e.status(),
            DispatchError::BodyParse(e) => e.status(),
        }
    }
}
