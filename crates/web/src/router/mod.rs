//! The route table.
//!
//! Routes are grouped per HTTP method and kept in registration order, which is also the order
//! the matcher tries them in. The table is built once through [`RouterBuilder`] and is
//! read-only afterwards.

mod pattern;

pub use pattern::{RoutePattern, Segment, extract_route_params, find_matching_route};

use crate::PathParams;
use crate::error::RoutingError;
use crate::handler::RequestHandler;
use http::Method;
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Main router structure that maps (method, pattern) pairs to handlers
pub struct Router<S> {
    routes: HashMap<Method, Vec<RouterItem<S>>>,
}

/// A registered pattern together with its handler
pub struct RouterItem<S> {
    pattern: RoutePattern,
    handler: Box<dyn RequestHandler<S>>,
}

/// Result of a successful lookup
pub struct RouteMatch<'router, S> {
    pattern: &'router RoutePattern,
    handler: &'router dyn RequestHandler<S>,
    params: PathParams,
}

impl<S> Router<S> {
    /// Creates a new, empty router builder
    pub fn builder() -> RouterBuilder<S> {
        RouterBuilder::new()
    }

    /// Resolves `method` and `url` to a handler.
    ///
    /// `url` may carry a query string, it is ignored for matching but echoed in the
    /// not-found error. A method without any registered route fails before the path is looked at.
    pub fn at(&self, method: &Method, url: &str) -> Result<RouteMatch<'_, S>, RoutingError> {
        let items = self.routes.get(method).ok_or(RoutingError::MethodNotAllowed)?;

        let item = find_matching_route(url, items.iter().map(RouterItem::pattern))
            .and_then(|pattern| items.iter().find(|item| std::ptr::eq(item.pattern(), pattern)))
            .ok_or_else(|| RoutingError::not_found(url))?;

        trace!(%method, url, route = %item.pattern, "route matched");
        Ok(RouteMatch {
            pattern: &item.pattern,
            handler: item.handler.as_ref(),
            params: extract_route_params(url, &item.pattern),
        })
    }

    /// Returns true if at least one route is registered for `method`
    pub fn allows(&self, method: &Method) -> bool {
        self.routes.contains_key(method)
    }

    /// Iterates over every registered (method, pattern) pair
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &RoutePattern)> {
        self.routes.iter().flat_map(|(method, items)| items.iter().map(move |item| (method, &item.pattern)))
    }
}

impl<S> fmt::Debug for Router<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.routes.iter().map(|(method, items)| (method, items.as_slice()))).finish()
    }
}

impl<S> RouterItem<S> {
    /// Gets the pattern of this router item
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Gets the request handler for this router item
    pub fn handler(&self) -> &dyn RequestHandler<S> {
        self.handler.as_ref()
    }
}

impl<S> fmt::Debug for RouterItem<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern.as_str())
    }
}

impl<'router, S> RouteMatch<'router, S> {
    /// Gets the pattern that matched
    pub fn pattern(&self) -> &'router RoutePattern {
        self.pattern
    }

    /// Gets the matched handler
    pub fn handler(&self) -> &'router dyn RequestHandler<S> {
        self.handler
    }

    /// Gets the path parameters from the matched route
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn into_parts(self) -> (&'router dyn RequestHandler<S>, PathParams) {
        (self.handler, self.params)
    }
}

impl<S> fmt::Debug for RouteMatch<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch").field("pattern", &self.pattern).field("params", &self.params).finish()
    }
}

pub struct RouterBuilder<S> {
    routes: HashMap<Method, Vec<RouterItem<S>>>,
}

impl<S> RouterBuilder<S> {
    fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Registers `item` under `pattern`.
    ///
    /// Registering the same (method, pattern) twice replaces the handler but keeps the
    /// position of the first registration.
    pub fn route(mut self, pattern: impl Into<String>, item: RouterItemBuilder<S>) -> Self {
        let pattern = RoutePattern::parse(pattern);
        let items = self.routes.entry(item.method).or_default();

        match items.iter_mut().find(|existing| existing.pattern == pattern) {
            Some(existing) => existing.handler = item.handler,
            None => items.push(RouterItem { pattern, handler: item.handler }),
        }
        self
    }

    pub fn build(self) -> Router<S> {
        Router { routes: self.routes }
    }
}

impl<S> fmt::Debug for RouterBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder").field("methods", &self.routes.len()).finish()
    }
}

/// A handler waiting to be bound to a pattern, see [`get`], [`post`] and friends
pub struct RouterItemBuilder<S> {
    method: Method,
    handler: Box<dyn RequestHandler<S>>,
}

impl<S> fmt::Debug for RouterItemBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterItemBuilder").field("method", &self.method).finish_non_exhaustive()
    }
}

macro_rules! method_router {
    ($method:ident, $upper_case_method:ident) => {
        #[doc = concat!("Binds a handler to HTTP ", stringify!($upper_case_method), " requests.")]
        pub fn $method<S, H: RequestHandler<S> + 'static>(handler: H) -> RouterItemBuilder<S> {
            RouterItemBuilder { method: Method::$upper_case_method, handler: Box::new(handler) }
        }
    };
}

method_router!(get, GET);
method_router!(post, POST);
method_router!(put, PUT);
method_router!(patch, PATCH);
method_router!(delete, DELETE);

#[cfg(test)]
mod tests {
    use super::{Router, get, post};
    use crate::error::RoutingError;
    use crate::handler::{RequestHandler, handler_fn};
    use crate::request::RequestContext;
    use crate::responder::Envelope;
    use http::{Method, Request, StatusCode};
    use serde_json::{Map, json};
    use std::sync::Arc;

    async fn first(_req: RequestContext, _state: Arc<()>) -> Envelope {
        Envelope::success(json!(1))
    }

    async fn second(_req: RequestContext, _state: Arc<()>) -> (StatusCode, Envelope) {
        (StatusCode::CREATED, Envelope::success(json!(2)))
    }

    fn router() -> Router<()> {
        Router::builder()
            .route("/query/:query", get(handler_fn(first)))
            .route("/query", post(handler_fn(first)))
            .route("/users/:id", get(handler_fn(first)))
            .route("/users/me", get(handler_fn(second)))
            .build()
    }

    #[test]
    fn test_route_get() {
        let router = router();
        let matched = router.at(&Method::GET, "/query/SELECT%201").unwrap();

        assert_eq!(matched.pattern().as_str(), "/query/:query");
        assert_eq!(matched.params().get("query"), Some("SELECT%201"));
    }

    #[test]
    fn test_route_post() {
        let router = router();
        let matched = router.at(&Method::POST, "/query").unwrap();

        assert_eq!(matched.pattern().as_str(), "/query");
        assert!(matched.params().is_empty());
    }

    #[test]
    fn test_method_not_allowed() {
        let router = router();
        assert_eq!(router.at(&Method::PATCH, "/query").unwrap_err(), RoutingError::MethodNotAllowed);
        assert!(!router.allows(&Method::DELETE));
        assert!(router.allows(&Method::GET));
    }

    #[test]
    fn test_route_not_found_echoes_url() {
        let router = router();
        let err = router.at(&Method::GET, "/nowhere?x=1").unwrap_err();
        assert_eq!(err, RoutingError::not_found("/nowhere?x=1"));

        // registered for GET only
        let err = router.at(&Method::POST, "/query/SELECT").unwrap_err();
        assert_eq!(err, RoutingError::not_found("/query/SELECT"));
    }

    #[test]
    fn test_registration_order_wins() {
        let router = router();
        let matched = router.at(&Method::GET, "/users/me").unwrap();
        assert_eq!(matched.pattern().as_str(), "/users/:id");
        assert_eq!(matched.params().get("id"), Some("me"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_position() {
        let router: Router<()> = Router::builder()
            .route("/a/:x", get(handler_fn(first)))
            .route("/a/b", get(handler_fn(first)))
            .route("/a/:x", get(handler_fn(second)))
            .build();

        assert_eq!(router.routes().count(), 2);
        let matched = router.at(&Method::GET, "/a/b").unwrap();
        assert_eq!(matched.pattern().as_str(), "/a/:x");

        // the later registration's handler is the one that runs
        let (parts, ()) = Request::builder().uri("/a/b").body(()).unwrap().into_parts();
        let req = RequestContext::new(parts, matched.params().clone(), Map::new());
        let response = matched.handler().invoke(req, Arc::new(())).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
