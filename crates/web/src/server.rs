//! The dispatcher and the connection accept loop.
//!
//! Per request the dispatcher walks `method check -> route match -> params -> body -> handler`.
//! Any step failing short-circuits to a single error envelope, so every request gets exactly
//! one response.

use crate::body::{DEFAULT_MAX_BODY_SIZE, ResponseBody, read_json_body};
use crate::error::DispatchError;
use crate::request::RequestContext;
use crate::responder::Responder;
use crate::router::Router;
use http::{Request, Response};
use http_body::Body as HttpBody;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::error::Error;
use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

pub struct ServerBuilder<S> {
    router: Option<Router<S>>,
    state: Option<Arc<S>>,
    address: Option<io::Result<Vec<SocketAddr>>>,
    max_body_size: usize,
}

impl<S> ServerBuilder<S> {
    fn new() -> Self {
        Self { router: None, state: None, address: None, max_body_size: DEFAULT_MAX_BODY_SIZE }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(|addrs| addrs.collect()));
        self
    }

    pub fn router(mut self, router: Router<S>) -> Self {
        self.router = Some(router);
        self
    }

    /// The shared state every handler receives, created once and kept for the server's lifetime.
    pub fn state(mut self, state: Arc<S>) -> Self {
        self.state = Some(state);
        self
    }

    /// Caps how many bytes of a request body are buffered before giving up.
    pub fn max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    pub fn build(self) -> Result<Server<S>, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        let state = self.state.ok_or(ServerBuildError::MissingState)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)??;
        if address.is_empty() {
            return Err(ServerBuildError::MissingAddress);
        }
        Ok(Server { router, state, address, max_body_size: self.max_body_size })
    }
}

impl<S> fmt::Debug for ServerBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("router", &self.router)
            .field("address", &self.address)
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

pub struct Server<S> {
    router: Router<S>,
    state: Arc<S>,
    address: Vec<SocketAddr>,
    max_body_size: usize,
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,
    #[error("state must be set")]
    MissingState,
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress {
        #[from]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {address:?}: {source}")]
    Bind { address: Vec<SocketAddr>, source: io::Error },
}

impl<S> Server<S>
where
    S: Send + Sync + 'static,
{
    pub fn builder() -> ServerBuilder<S> {
        ServerBuilder::new()
    }

    /// Answers one request.
    ///
    /// Never fails: routing and body errors become error envelopes here, handler errors are
    /// turned into envelopes by the handler itself.
    pub async fn dispatch<B>(&self, req: Request<B>) -> Response<ResponseBody>
    where
        B: HttpBody + Send,
        B::Data: Send,
        B::Error: Into<Box<dyn Error + Send + Sync>>,
    {
        let started = Instant::now();
        let method = req.method().clone();
        let url = req.uri().path_and_query().map_or_else(|| req.uri().path(), |pq| pq.as_str()).to_string();
        debug!(%method, url = %url, "request received");

        let response = match self.resolve(req, &url).await {
            Ok(response) => response,
            Err(e) => {
                debug!(%method, url = %url, cause = %e, "request rejected before reaching a handler");
                e.into_response()
            }
        };

        info!(
            %method,
            url = %url,
            status = response.status().as_u16(),
            elapsed = ?started.elapsed(),
            "request finished"
        );
        response
    }

    async fn resolve<B>(&self, req: Request<B>, url: &str) -> Result<Response<ResponseBody>, DispatchError>
    where
        B: HttpBody + Send,
        B::Data: Send,
        B::Error: Into<Box<dyn Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();

        let (handler, params) = self.router.at(&parts.method, url)?.into_parts();
        let body = read_json_body(&parts.method, body, self.max_body_size).await?;

        let request_context = RequestContext::new(parts, params, body);
        Ok(handler.invoke(request_context, Arc::clone(&self.state)).await)
    }

    /// Accepts connections until `shutdown` resolves.
    ///
    /// Each connection is served on its own task. Connections already accepted are not
    /// waited for.
    pub async fn start<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let tcp_listener = TcpListener::bind(self.address.as_slice())
            .await
            .map_err(|source| ServerError::Bind { address: self.address.clone(), source })?;

        for (method, route) in self.router.routes() {
            info!(%method, %route, "route registered");
        }
        match tcp_listener.local_addr() {
            Ok(local_addr) => info!("Server started on http://{local_addr}/"),
            Err(e) => warn!(cause = %e, "listening, but the local address is unknown"),
        }

        let server = Arc::new(self);
        tokio::pin!(shutdown);

        loop {
            let (tcp_stream, remote_addr) = tokio::select! {
                accepted = tcp_listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
                () = &mut shutdown => {
                    info!("shutdown requested, stop accepting connections");
                    break;
                }
            };

            let server = Arc::clone(&server);
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let server = Arc::clone(&server);
                    async move { Ok::<_, Infallible>(server.dispatch(req).await) }
                });

                match http1::Builder::new().serve_connection(TokioIo::new(tcp_stream), service).await {
                    Ok(()) => debug!(%remote_addr, "finished process, connection shutdown"),
                    Err(e) => error!(%remote_addr, cause = %e, "service has error, connection shutdown"),
                }
            });
        }

        Ok(())
    }
}

impl<S> fmt::Debug for Server<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("router", &self.router)
            .field("address", &self.address)
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}
