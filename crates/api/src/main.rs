use clap::Parser;
use relay_api::config::Config;
use relay_api::error::StartupError;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), StartupError> {
    let config = Config::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(config.log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(database = %config.database_name, host = %config.database_host, "starting relay-api");

    let result = relay_api::run(config, shutdown_signal()).await;
    if let Err(e) = &result {
        error!(cause = %e, "relay-api stopped with an error");
    }
    result
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            error!(cause = %e, "unable to listen for the shutdown signal, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
