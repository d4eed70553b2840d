use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::types::Decimal;
use sqlx::{Column, Connection, Executor, Row, Statement, TypeInfo, ValueRef};
use tracing::{debug, warn};

use crate::error::{DashboardError, Result};
use crate::models::{Scalar, TabularResult};
use crate::warehouse::WarehouseConfig;

/// Executes one read-only statement against the warehouse and hands back the
/// full result set. Implementations own the connection lifecycle: acquire,
/// run, release, on every exit path.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn execute(&self, statement: &str) -> Result<TabularResult>;
}

/// Opens a fresh PostgreSQL connection per statement. No pooling, no retries.
pub struct PostgresConnector {
    options: PgConnectOptions,
    target: String,
}

impl PostgresConnector {
    pub fn new(config: &WarehouseConfig) -> Self {
        Self {
            options: config.connect_options(),
            target: format!("{}:{}/{}", config.host, config.port, config.database),
        }
    }

    async fn connect(&self) -> Result<PgConnection> {
        debug!(target = %self.target, "opening warehouse connection");
        PgConnection::connect_with(&self.options)
            .await
            .map_err(|e| DashboardError::Connection(format!("{}: {}", self.target, e)))
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    async fn execute(&self, statement: &str) -> Result<TabularResult> {
        let mut conn = self.connect().await?;
        let outcome = run_statement(&mut conn, statement).await;

        if let Err(e) = conn.close().await {
            warn!(target = %self.target, error = %e, "warehouse connection did not close cleanly");
        } else {
            debug!(target = %self.target, "closed warehouse connection");
        }

        if let Err(ref e) = outcome {
            warn!(error = %e, "warehouse query failed");
        }
        outcome
    }
}

async fn run_statement(conn: &mut PgConnection, statement: &str) -> Result<TabularResult> {
    let prepared = (&mut *conn)
        .prepare(statement)
        .await
        .map_err(|e| DashboardError::query(statement, e))?;

    let columns: Vec<String> = prepared
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let rows = prepared
        .query()
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DashboardError::query(statement, e))?;

    let decoded = rows
        .iter()
        .map(decode_row)
        .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
        .map_err(|e| DashboardError::query(statement, e))?;

    TabularResult::new(columns, decoded)
}

fn decode_row(row: &PgRow) -> std::result::Result<Vec<Scalar>, sqlx::Error> {
    (0..row.columns().len())
        .map(|idx| decode_cell(row, idx))
        .collect()
}

/// Maps a cell to a [`Scalar`] by its PostgreSQL type name. Types without a
/// mapping render as `<TYPE>` rather than failing the whole table.
fn decode_cell(row: &PgRow, idx: usize) -> std::result::Result<Scalar, sqlx::Error> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Scalar::Null);
    }

    let type_name = row.column(idx).type_info().name().to_string();
    let scalar = match type_name.as_str() {
        "BOOL" => Scalar::Bool(row.try_get::<bool, _>(idx)?),
        "INT2" => Scalar::Int(i64::from(row.try_get::<i16, _>(idx)?)),
        "INT4" => Scalar::Int(i64::from(row.try_get::<i32, _>(idx)?)),
        "INT8" => Scalar::Int(row.try_get::<i64, _>(idx)?),
        "FLOAT4" => Scalar::Float(f64::from(row.try_get::<f32, _>(idx)?)),
        "FLOAT8" => Scalar::Float(row.try_get::<f64, _>(idx)?),
        "NUMERIC" => numeric_scalar(row.try_get::<Decimal, _>(idx)),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR" | "CITEXT" => {
            Scalar::Text(row.try_get::<String, _>(idx)?)
        }
        "DATE" => Scalar::Date(row.try_get::<NaiveDate, _>(idx)?),
        "TIMESTAMP" => Scalar::Timestamp(row.try_get::<NaiveDateTime, _>(idx)?),
        "TIMESTAMPTZ" => Scalar::TimestampTz(row.try_get::<DateTime<Utc>, _>(idx)?),
        other => Scalar::Text(format!("<{}>", other)),
    };

    Ok(scalar)
}

/// `Decimal` cannot hold `'NaN'::numeric`; such a cell renders like an
/// unmapped type instead of failing the table.
fn numeric_scalar(decoded: std::result::Result<Decimal, sqlx::Error>) -> Scalar {
    match decoded {
        Ok(value) => match value.to_string().parse::<f64>() {
            Ok(v) => Scalar::Float(v),
            Err(_) => Scalar::Text(value.to_string()),
        },
        Err(e) => {
            debug!(error = %e, "NUMERIC cell not representable");
            Scalar::Text("<NUMERIC>".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_cells_decode_to_float() {
        let value: Decimal = "12.50".parse().unwrap();
        assert_eq!(numeric_scalar(Ok(value)), Scalar::Float(12.5));
    }

    #[test]
    fn test_unrepresentable_numeric_renders_type_name() {
        let decoded = Err(sqlx::Error::Decode("NaN cannot be a Decimal".into()));
        assert_eq!(numeric_scalar(decoded), Scalar::Text("<NUMERIC>".to_string()));
    }
}
