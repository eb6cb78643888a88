use relay_web::{ServerBuildError, ServerError};
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;

/// Anything that stops the process before or while serving.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("failed to install the log subscriber: {source}")]
    Logging {
        #[from]
        source: SetGlobalDefaultError,
    },

    #[error("failed to provision the schema: {source}")]
    Schema { source: sqlx::Error },

    #[error("failed to open the {role} pool: {source}")]
    Connect { role: &'static str, source: sqlx::Error },

    #[error(transparent)]
    Build(#[from] ServerBuildError),

    #[error(transparent)]
    Serve(#[from] ServerError),
}
