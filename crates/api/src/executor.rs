//! The database capability handlers run statements against.
//!
//! Two executors exist per process, one connected with read-only credentials and one with
//! write credentials. Both are opened at startup and closed once the server has stopped.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A failed statement.
///
/// Only `message` is meant for clients, `code` and `sql` are kept for the server log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DatabaseError {
    pub code: Option<String>,
    pub message: String,
    pub sql: String,
}

impl DatabaseError {
    pub fn new<M: ToString, S: ToString>(message: M, sql: S) -> Self {
        Self { code: None, message: message.to_string(), sql: sql.to_string() }
    }

    pub fn with_code<C: ToString>(mut self, code: C) -> Self {
        self.code = Some(code.to_string());
        self
    }
}

/// Runs raw SQL text.
///
/// Implementations must be safe to share between concurrent requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Executor: Send + Sync {
    /// Executes `sql` and returns its result as JSON: an array of row objects for statements
    /// that produce rows, a summary object otherwise.
    async fn execute(&self, sql: &str) -> Result<Value, DatabaseError>;

    /// Releases every connection held by this executor.
    async fn close(&self);
}

/// The application state shared by every handler.
pub struct Executors {
    reader: Box<dyn Executor>,
    writer: Box<dyn Executor>,
}

impl Executors {
    pub fn new(reader: Box<dyn Executor>, writer: Box<dyn Executor>) -> Self {
        Self { reader, writer }
    }

    /// The executor connected with read-only privileges
    pub fn reader(&self) -> &dyn Executor {
        self.reader.as_ref()
    }

    /// The executor connected with write privileges
    pub fn writer(&self) -> &dyn Executor {
        self.writer.as_ref()
    }

    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
    }
}

impl fmt::Debug for Executors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executors").finish_non_exhaustive()
    }
}
