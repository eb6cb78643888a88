use crate::body::ResponseBody;
use crate::request::RequestContext;
use crate::responder::Responder;
use async_trait::async_trait;
use http::Response;
use std::fmt;
use std::sync::Arc;

/// The unit of logic bound to a (method, pattern) pair.
///
/// `S` is the application state built once at startup, typically the database executors. The
/// dispatcher hands it to the handler on every call, handlers never reach it any other way.
#[async_trait]
pub trait RequestHandler<S>: Send + Sync {
    async fn invoke(&self, req: RequestContext, state: Arc<S>) -> Response<ResponseBody>;
}

/// Adapts an async fn `(RequestContext, Arc<S>) -> impl Responder` into a [`RequestHandler`].
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F>(f: F) -> FnHandler<F> {
    FnHandler { f }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<S, F, Fut> RequestHandler<S> for FnHandler<F>
where
    S: Send + Sync + 'static,
    F: Fn(RequestContext, Arc<S>) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
    async fn invoke(&self, req: RequestContext, state: Arc<S>) -> Response<ResponseBody> {
        (self.f)(req, state).await.into_response()
    }
}
