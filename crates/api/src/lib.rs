//! An HTTP API that relays SQL text to MySQL.
//!
//! `GET /comp4537/lab5/api/v1/query/:query` runs the decoded segment with read-only
//! credentials, `POST /comp4537/lab5/api/v1/query` runs the body's `query` field with write
//! credentials. Results and failures come back wrapped in an `{ isError, data }` envelope.

pub mod config;
pub mod error;
pub mod executor;
pub mod mysql;
pub mod routes;
pub mod schema;

use crate::config::Config;
use crate::error::StartupError;
use crate::executor::Executors;
use crate::mysql::MySqlExecutor;
use relay_web::Server;
use std::sync::Arc;
use tracing::info;

/// Provisions the schema, opens both pools and serves until `shutdown` resolves.
///
/// The pools are closed once the accept loop has stopped, whether it stopped cleanly or not.
pub async fn run<F>(config: Config, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()>,
{
    if config.skip_schema {
        info!("schema provisioning skipped");
    } else {
        schema::provision(&config.admin_options()).await.map_err(|source| StartupError::Schema { source })?;
    }

    let reader = MySqlExecutor::connect("reader", config.reader_options(), config.pool_size)
        .await
        .map_err(|source| StartupError::Connect { role: "reader", source })?;
    let writer = MySqlExecutor::connect("writer", config.writer_options(), config.pool_size)
        .await
        .map_err(|source| StartupError::Connect { role: "writer", source })?;
    let executors = Arc::new(Executors::new(Box::new(reader), Box::new(writer)));

    let server = match Server::builder()
        .router(routes::router())
        .state(Arc::clone(&executors))
        .address(config.bind_address())
        .max_body_size(config.max_body_size)
        .build()
    {
        Ok(server) => server,
        Err(e) => {
            executors.close().await;
            return Err(e.into());
        }
    };

    let served = server.start(shutdown).await;
    info!("server stopped, closing database pools");
    executors.close().await;

    served.map_err(StartupError::from)
}
