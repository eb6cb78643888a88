//! [`Executor`] backed by a MySQL connection pool.
//!
//! Results are shaped like the mysql2 driver shapes them: statements with result columns give
//! an array of row objects, everything else gives `{ fieldCount, affectedRows, insertId }`.

use crate::executor::{DatabaseError, Executor};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use futures::TryStreamExt;
use serde_json::{Map, Value, json};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlTypeInfo};
use sqlx::{Column, Either, Executor as _, Row, Statement, TypeInfo, ValueRef};
use tracing::{debug, info};

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Debug)]
pub struct MySqlExecutor {
    name: &'static str,
    pool: MySqlPool,
}

impl MySqlExecutor {
    /// Opens a pool of at most `max_connections` connections. `name` only shows up in logs.
    pub async fn connect(
        name: &'static str,
        options: MySqlConnectOptions,
        max_connections: u32,
    ) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new().max_connections(max_connections).connect_with(options).await?;
        info!(executor = name, max_connections, "database pool ready");
        Ok(Self { name, pool })
    }

    async fn run(&self, sql: &str) -> Result<Value, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;

        // the statement is cached per connection, the query below reuses it
        let returns_rows = !(&mut *conn).prepare(sql).await?.columns().is_empty();

        let mut results = sqlx::query(sql).fetch_many(&mut *conn);
        let mut rows = Vec::new();
        let mut summary = Summary::default();

        while let Some(item) = results.try_next().await? {
            match item {
                Either::Left(done) => {
                    summary.affected_rows += done.rows_affected();
                    summary.insert_id = done.last_insert_id();
                }
                Either::Right(row) => rows.push(row_to_json(&row)?),
            }
        }

        Ok(shape_result(returns_rows, rows, &summary))
    }
}

#[async_trait]
impl Executor for MySqlExecutor {
    async fn execute(&self, sql: &str) -> Result<Value, DatabaseError> {
        debug!(executor = self.name, sql, "executing statement");
        self.run(sql).await.map_err(|e| database_error(e, sql))
    }

    async fn close(&self) {
        self.pool.close().await;
        info!(executor = self.name, "database pool closed");
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    affected_rows: u64,
    insert_id: u64,
}

fn shape_result(returns_rows: bool, rows: Vec<Value>, summary: &Summary) -> Value {
    if returns_rows {
        Value::Array(rows)
    } else {
        json!({
            "fieldCount": 0,
            "affectedRows": summary.affected_rows,
            "insertId": summary.insert_id,
        })
    }
}

fn database_error(err: sqlx::Error, sql: &str) -> DatabaseError {
    match err {
        sqlx::Error::Database(db_err) => {
            let error = DatabaseError::new(db_err.message(), sql);
            match db_err.code() {
                Some(code) => error.with_code(code),
                None => error,
            }
        }
        other => DatabaseError::new(other, sql),
    }
}

fn row_to_json(row: &MySqlRow) -> Result<Value, sqlx::Error> {
    let mut object = Map::with_capacity(row.len());
    for column in row.columns() {
        let value = column_to_json(row, column.ordinal(), column.type_info())?;
        object.insert(column.name().to_string(), value);
    }
    Ok(Value::Object(object))
}

/// How a column's values are turned into JSON, decided from the MySQL type name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Signed,
    Unsigned,
    Float,
    Double,
    /// Kept as the exact decimal text the server sent
    Decimal,
    Date,
    DateTime,
    Time,
    Json,
    Bytes,
    Text,
}

impl ColumnKind {
    fn of(type_name: &str) -> Self {
        match type_name {
            "BOOLEAN" => ColumnKind::Bool,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => ColumnKind::Signed,
            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED" | "BIGINT UNSIGNED"
            | "YEAR" => ColumnKind::Unsigned,
            "FLOAT" => ColumnKind::Float,
            "DOUBLE" => ColumnKind::Double,
            "DECIMAL" => ColumnKind::Decimal,
            "DATE" => ColumnKind::Date,
            "DATETIME" | "TIMESTAMP" => ColumnKind::DateTime,
            "TIME" => ColumnKind::Time,
            "JSON" => ColumnKind::Json,
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" | "GEOMETRY" => {
                ColumnKind::Bytes
            }
            _ => ColumnKind::Text,
        }
    }
}

fn column_to_json(row: &MySqlRow, index: usize, type_info: &MySqlTypeInfo) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match ColumnKind::of(type_info.name()) {
        ColumnKind::Bool => Value::Bool(row.try_get(index)?),
        ColumnKind::Signed => Value::from(row.try_get_unchecked::<i64, _>(index)?),
        ColumnKind::Unsigned => Value::from(row.try_get_unchecked::<u64, _>(index)?),
        ColumnKind::Float => Value::from(f64::from(row.try_get::<f32, _>(index)?)),
        ColumnKind::Double => Value::from(row.try_get::<f64, _>(index)?),
        ColumnKind::Decimal | ColumnKind::Text => Value::String(row.try_get_unchecked::<String, _>(index)?),
        ColumnKind::Date => date_to_json(row.try_get(index)?),
        ColumnKind::DateTime => datetime_to_json(row.try_get(index)?),
        ColumnKind::Time => time_to_json(row.try_get(index)?),
        ColumnKind::Json => row.try_get::<Value, _>(index)?,
        ColumnKind::Bytes => bytes_to_json(row.try_get_unchecked(index)?),
    };
    Ok(value)
}

fn date_to_json(date: NaiveDate) -> Value {
    datetime_to_json(date.and_time(NaiveTime::MIN))
}

fn datetime_to_json(datetime: NaiveDateTime) -> Value {
    Value::String(datetime.format(DATETIME_FORMAT).to_string())
}

fn time_to_json(time: NaiveTime) -> Value {
    Value::String(time.to_string())
}

fn bytes_to_json(bytes: Vec<u8>) -> Value {
    Value::from(bytes)
}
