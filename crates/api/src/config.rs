//! Process configuration, read from the command line with environment fallbacks.

use clap::Parser;
use relay_web::DEFAULT_MAX_BODY_SIZE;
use sqlx::mysql::MySqlConnectOptions;
use tracing::{Level, warn};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

#[derive(Parser, Debug, Clone)]
#[command(name = "relay-api", version, about = "Relays SQL text to read-only and read-write MySQL pools")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "API_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "API_PORT")]
    pub port: Option<u16>,

    #[arg(long, env = "DATABASE_HOST", default_value = "localhost")]
    pub database_host: String,

    #[arg(long, env = "DATABASE_PORT", default_value_t = 3306)]
    pub database_port: u16,

    #[arg(long, env = "DATABASE_NAME")]
    pub database_name: String,

    /// User that provisions the schema at startup
    #[arg(long, env = "DATABASE_ADMIN_USER", default_value = "root")]
    pub database_admin_user: String,

    #[arg(long, env = "DATABASE_ADMIN_PASSWORD", default_value = "", hide_env_values = true)]
    pub database_admin_password: String,

    /// User behind the read route, expected to hold SELECT privileges only
    #[arg(long, env = "DATABASE_READER_USER", default_value = "reader")]
    pub database_reader_user: String,

    #[arg(long, env = "DATABASE_READER_PASSWORD", default_value = "", hide_env_values = true)]
    pub database_reader_password: String,

    /// User behind the write route
    #[arg(long, env = "DATABASE_WRITER_USER", default_value = "writer")]
    pub database_writer_user: String,

    #[arg(long, env = "DATABASE_WRITER_PASSWORD", default_value = "", hide_env_values = true)]
    pub database_writer_password: String,

    /// Maximum connections per pool
    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = 10)]
    pub pool_size: u32,

    /// Largest request body, in bytes, that is buffered
    #[arg(long, env = "MAX_BODY_SIZE", default_value_t = DEFAULT_MAX_BODY_SIZE)]
    pub max_body_size: usize,

    #[arg(long, env = "LOG_LEVEL", default_value_t = Level::INFO)]
    pub log_level: Level,

    /// Do not create the `patient` table at startup
    #[arg(long, env = "SKIP_SCHEMA")]
    pub skip_schema: bool,
}

impl Config {
    /// The listen address, warning about every part that falls back to its default.
    pub fn bind_address(&self) -> (String, u16) {
        let host = self.host.clone().unwrap_or_else(|| {
            warn!("No API_HOST environment variable detected. Defaulting to {DEFAULT_HOST}");
            DEFAULT_HOST.to_string()
        });
        let port = self.port.unwrap_or_else(|| {
            warn!("No API_PORT environment variable detected. Defaulting to {DEFAULT_PORT}");
            DEFAULT_PORT
        });
        (host, port)
    }

    pub fn admin_options(&self) -> MySqlConnectOptions {
        self.connect_options(&self.database_admin_user, &self.database_admin_password)
    }

    pub fn reader_options(&self) -> MySqlConnectOptions {
        self.connect_options(&self.database_reader_user, &self.database_reader_password)
    }

    pub fn writer_options(&self) -> MySqlConnectOptions {
        self.connect_options(&self.database_writer_user, &self.database_writer_password)
    }

    fn connect_options(&self, username: &str, password: &str) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.database_host)
            .port(self.database_port)
            .database(&self.database_name)
            .username(username)
            .password(password)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use clap::{CommandFactory, Parser};
    use tracing::Level;

    #[test]
    fn verify_command() {
        Config::command().debug_assert();
    }

    #[test]
    fn test_explicit_arguments() {
        let config = Config::try_parse_from([
            "relay-api",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--database-name",
            "lab5",
            "--database-reader-user",
            "ro",
            "--max-body-size",
            "4096",
            "--log-level",
            "debug",
            "--skip-schema",
        ])
        .unwrap();

        assert_eq!(config.bind_address(), ("127.0.0.1".to_string(), 8080));
        assert_eq!(config.database_name, "lab5");
        assert_eq!(config.database_reader_user, "ro");
        assert_eq!(config.max_body_size, 4096);
        assert_eq!(config.log_level, Level::DEBUG);
        assert!(config.skip_schema);
    }

    #[test]
    fn test_database_name_is_required() {
        // only meaningful when the environment does not provide it
        if std::env::var_os("DATABASE_NAME").is_none() {
            assert!(Config::try_parse_from(["relay-api"]).is_err());
        }
    }
}
