//! The route table: one read route, one write route.
//!
//! Both handlers relay SQL text verbatim. They differ only in where the text comes from (a
//! path segment or the JSON body) and in which executor runs it.

use crate::executor::{DatabaseError, Executor, Executors};
use relay_web::router::{get, post};
use relay_web::{Envelope, RequestContext, Responder, ResponseBody, Router, handler_fn, write_failure};
use serde_json::Value;
use std::string::FromUtf8Error;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

pub const READ_QUERY_ROUTE: &str = "/comp4537/lab5/api/v1/query/:query";
pub const WRITE_QUERY_ROUTE: &str = "/comp4537/lab5/api/v1/query";

const QUERY_PARAM: &str = "query";
const QUERY_FIELD: &str = "query";

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("query is not valid utf8 once decoded: {source}")]
    InvalidEncoding {
        #[from]
        source: FromUtf8Error,
    },

    #[error("request body must contain a string \"query\" field")]
    MissingQuery,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl Responder for QueryError {
    fn into_response(self) -> http::Response<ResponseBody> {
        let status = match self {
            QueryError::Database(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => http::StatusCode::BAD_REQUEST,
        };
        write_failure(status, &self)
    }
}

pub fn router() -> Router<Executors> {
    Router::builder()
        .route(READ_QUERY_ROUTE, get(handler_fn(read_query)))
        .route(WRITE_QUERY_ROUTE, post(handler_fn(write_query)))
        .build()
}

/// `GET /comp4537/lab5/api/v1/query/:query`, runs the percent-decoded segment on the reader.
pub async fn read_query(req: RequestContext, executors: Arc<Executors>) -> Result<Envelope, QueryError> {
    // always bound, READ_QUERY_ROUTE captures it
    let raw = req.path_params().get(QUERY_PARAM).unwrap_or_default();
    let sql = urlencoding::decode(raw)?;
    relay(executors.reader(), &sql).await
}

/// `POST /comp4537/lab5/api/v1/query` with `{ "query": "..." }`, runs it on the writer.
pub async fn write_query(req: RequestContext, executors: Arc<Executors>) -> Result<Envelope, QueryError> {
    let sql = req.body().get(QUERY_FIELD).and_then(Value::as_str).ok_or(QueryError::MissingQuery)?;
    relay(executors.writer(), sql).await
}

async fn relay(executor: &dyn Executor, sql: &str) -> Result<Envelope, QueryError> {
    match executor.execute(sql).await {
        Ok(result) => Ok(Envelope::success(result)),
        Err(e) => {
            warn!(code = ?e.code, sql = %e.sql, cause = %e, "statement failed");
            Err(e.into())
        }
    }
}
