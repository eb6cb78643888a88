use relay_web::router::{get, post};
use relay_web::{Envelope, RequestContext, Router, Server, handler_fn};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

struct Greeting {
    prefix: String,
}

async fn hello(req: RequestContext, greeting: Arc<Greeting>) -> Envelope {
    let name = req.path_params().get("name").unwrap_or("world");
    Envelope::success(json!(format!("{} {name}", greeting.prefix)))
}

async fn echo(req: RequestContext, _greeting: Arc<Greeting>) -> Envelope {
    Envelope::success(Value::Object(req.body().clone()))
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let router = Router::builder()
        .route("/hello/:name", get(handler_fn(hello)))
        .route("/echo", post(handler_fn(echo)))
        .build();

    Server::builder()
        .router(router)
        .state(Arc::new(Greeting { prefix: "hello".into() }))
        .address("127.0.0.1:3000")
        .build()
        .unwrap()
        .start(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .unwrap();
}
