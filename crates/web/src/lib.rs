//! A small request dispatch engine on top of hyper.
//!
//! Routes are hand-rolled segment patterns (`/api/v1/query/:query`), matched in registration
//! order. Every response is a JSON [`Envelope`], either the handler's payload or the message
//! of whatever went wrong.
//!
//! # Example
//!
//! ```no_run
//! use relay_web::router::{get, post};
//! use relay_web::{Envelope, RequestContext, Router, Server, handler_fn};
//! use serde_json::{Value, json};
//! use std::sync::Arc;
//!
//! struct AppState {
//!     greeting: String,
//! }
//!
//! async fn hello(req: RequestContext, state: Arc<AppState>) -> Envelope {
//!     let name = req.path_params().get("name").unwrap_or("world");
//!     Envelope::success(json!(format!("{} {name}", state.greeting)))
//! }
//!
//! async fn echo(req: RequestContext, _state: Arc<AppState>) -> Envelope {
//!     Envelope::success(Value::Object(req.body().clone()))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::builder()
//!         .route("/hello/:name", get(handler_fn(hello)))
//!         .route("/echo", post(handler_fn(echo)))
//!         .build();
//!
//!     let server = Server::builder()
//!         .router(router)
//!         .state(Arc::new(AppState { greeting: "hello".into() }))
//!         .address("127.0.0.1:8080")
//!         .build()
//!         .unwrap();
//!
//!     server.start(async { tokio::signal::ctrl_c().await.ok(); }).await.unwrap();
//! }
//! ```

mod body;
mod error;
mod handler;
mod request;
mod responder;
mod server;

pub mod router;

pub use body::{DEFAULT_MAX_BODY_SIZE, ResponseBody, carries_body, read_json_body};
pub use error::{BodyParseError, DispatchError, RoutingError};
pub use handler::{FnHandler, RequestHandler, handler_fn};
pub use request::{JsonBody, PathParams, RequestContext};
pub use responder::{Envelope, Responder, write_envelope, write_failure};
pub use router::Router;
pub use server::{Server, ServerBuildError, ServerBuilder, ServerError};
