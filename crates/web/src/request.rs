//! Request handling module that provides access to HTTP request information and path parameters.
//!
//! This module contains the core types for working with HTTP requests in the dispatch engine:
//! - `RequestContext`: Per-request state handed to a handler
//! - `PathParams`: Named path segments extracted from the request path

use http::request::Parts;
use http::{HeaderMap, Method, Uri};
use serde_json::{Map, Value};

/// The parsed JSON object of a request body. Empty when the method carries no body.
pub type JsonBody = Map<String, Value>;

/// Represents the context of a single HTTP request.
///
/// It is created once routing has succeeded and the body has been read, handed to exactly one
/// handler, and dropped when the response has been produced.
#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    path_params: PathParams,
    body: JsonBody,
}

impl RequestContext {
    pub fn new(parts: Parts, path_params: PathParams, body: JsonBody) -> Self {
        Self { method: parts.method, uri: parts.uri, headers: parts.headers, path_params, body }
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the raw request path, percent-encoding included
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a reference to the path parameters extracted from the request URL
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Returns the parsed JSON body
    pub fn body(&self) -> &JsonBody {
        &self.body
    }
}

/// Represents path parameters extracted from the URL path of an HTTP request.
///
/// For the pattern `/users/:id` and the path `/users/42`, `id` is bound to `"42"`. Values are
/// kept exactly as they appear in the path, so they are still percent-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Gets the value of a path parameter by its name.
    /// When a name is bound twice the last binding wins.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.params.iter().rev().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl FromIterator<(String, String)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self { params: iter.into_iter().collect() }
    }
}
