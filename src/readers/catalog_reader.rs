use crate::error::{DashboardError, Result};
use crate::models::{TableIdentifier, TabularResult};
use crate::utils::constants::SYSTEM_SCHEMAS;
use crate::warehouse::Connector;

/// Every user-visible relation, ordered by schema then table.
pub fn list_tables_statement() -> String {
    let excluded = SYSTEM_SCHEMAS
        .iter()
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT table_schema::text AS table_schema, table_name::text AS table_name \
         FROM information_schema.tables \
         WHERE table_schema NOT IN ({}) \
         ORDER BY table_schema, table_name",
        excluded
    )
}

pub fn parse_table_list(catalog: &TabularResult) -> Result<Vec<TableIdentifier>> {
    let schema_idx = catalog.require_column("table_schema")?;
    let table_idx = catalog.require_column("table_name")?;

    catalog
        .rows()
        .iter()
        .map(|row| match (row[schema_idx].as_str(), row[table_idx].as_str()) {
            (Some(schema), Some(table)) => Ok(TableIdentifier::new(schema, table)),
            _ => Err(DashboardError::InvalidFormat(format!(
                "catalog row without schema/table name: {:?}",
                row
            ))),
        })
        .collect()
}

pub async fn fetch_catalog<C: Connector + ?Sized>(connector: &C) -> Result<TabularResult> {
    connector.execute(&list_tables_statement()).await
}

/// Uncached listing straight from the warehouse.
pub async fn list_tables<C: Connector + ?Sized>(connector: &C) -> Result<Vec<TableIdentifier>> {
    parse_table_list(&fetch_catalog(connector).await?)
}
