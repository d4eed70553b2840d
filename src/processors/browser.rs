use tracing::{info, warn};

use crate::cache::CachedWarehouse;
use crate::error::Result;
use crate::models::{TableFetch, TableIdentifier};
use crate::warehouse::Connector;

/// Lists the warehouse and fetches every table through the cache.
///
/// Only the listing itself can fail the call. Each table gets its own
/// [`TableFetch`], so a missing relation or a permission error shows up next
/// to that table while its siblings load normally.
pub async fn browse_tables<C: Connector>(
    warehouse: &CachedWarehouse<C>,
    schema: Option<&str>,
) -> Result<Vec<TableFetch>> {
    let tables: Vec<TableIdentifier> = warehouse
        .list_tables()
        .await?
        .into_iter()
        .filter(|t| schema.map_or(true, |s| t.schema_name == s))
        .collect();

    info!(count = tables.len(), "browsing warehouse tables");

    let mut fetched = Vec::with_capacity(tables.len());
    for table in tables {
        let result = warehouse.fetch_table(&table).await;
        if let Err(ref e) = result {
            warn!(table = %table, error = %e, "table could not be loaded");
        }
        fetched.push(TableFetch { table, result });
    }

    Ok(fetched)
}
