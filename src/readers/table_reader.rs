use crate::error::Result;
use crate::models::{TableIdentifier, TabularResult};
use crate::utils::constants::TABLE_ROW_CAP;
use crate::warehouse::Connector;

/// Bounded `SELECT *`. There is deliberately no ORDER BY, so which rows come
/// back from a table larger than the cap is up to the engine.
pub fn fetch_table_statement(table: &TableIdentifier) -> String {
    format!("SELECT * FROM {} LIMIT {}", table.quoted(), TABLE_ROW_CAP)
}

pub async fn fetch_table<C: Connector + ?Sized>(
    connector: &C,
    table: &TableIdentifier,
) -> Result<TabularResult> {
    connector.execute(&fetch_table_statement(table)).await
}
