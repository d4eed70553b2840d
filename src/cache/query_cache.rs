use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::models::{TableIdentifier, TabularResult};
use crate::readers::{fetch_catalog, fetch_table, load_weather_facts, parse_table_list};
use crate::warehouse::Connector;

/// Operation identity plus its arguments, compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    TableList,
    TableData(TableIdentifier),
    WeatherFacts,
}

/// Process-lifetime memoization of the three warehouse queries.
///
/// There is no TTL and no eviction: once a key is populated it is served from
/// memory until [`clear`](Self::clear) or process exit, so warehouse updates
/// made after the first load stay invisible. Failed queries are not stored.
/// The lock is never held across a query; two concurrent first calls for the
/// same key may both reach the warehouse and the later result wins.
pub struct CachedWarehouse<C> {
    connector: C,
    entries: Mutex<HashMap<CacheKey, Arc<TabularResult>>>,
}

impl<C: Connector> CachedWarehouse<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub async fn list_tables(&self) -> Result<Vec<TableIdentifier>> {
        let catalog = self
            .cached(CacheKey::TableList, || fetch_catalog(&self.connector))
            .await?;
        parse_table_list(&catalog)
    }

    pub async fn fetch_table(&self, table: &TableIdentifier) -> Result<Arc<TabularResult>> {
        self.cached(CacheKey::TableData(table.clone()), || {
            fetch_table(&self.connector, table)
        })
        .await
    }

    pub async fn load_weather_facts(&self) -> Result<Arc<TabularResult>> {
        self.cached(CacheKey::WeatherFacts, || load_weather_facts(&self.connector))
            .await
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drops every entry. Nothing in the crate calls this on its own.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    async fn cached<F, Fut>(&self, key: CacheKey, load: F) -> Result<Arc<TabularResult>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TabularResult>>,
    {
        let hit = self.entries.lock().get(&key).cloned();
        if let Some(result) = hit {
            debug!(?key, "cache hit");
            return Ok(result);
        }

        debug!(?key, "cache miss, querying warehouse");
        let fresh = Arc::new(load().await?);
        self.entries.lock().insert(key, Arc::clone(&fresh));

        Ok(fresh)
    }
}
