use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::DashboardError;
use crate::models::TabularResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableIdentifier {
    pub schema_name: String,
    pub table_name: String,
}

impl TableIdentifier {
    pub fn new(schema_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            table_name: table_name.into(),
        }
    }

    /// `"schema"."table"` with embedded quotes doubled, safe to splice into
    /// a statement regardless of case or reserved words.
    pub fn quoted(&self) -> String {
        format!(
            "{}.{}",
            quote_ident(&self.schema_name),
            quote_ident(&self.table_name)
        )
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema_name, self.table_name)
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Outcome of fetching one table during a browse. A failure here is local to
/// the table and never aborts the rest of the listing.
#[derive(Debug)]
pub struct TableFetch {
    pub table: TableIdentifier,
    pub result: std::result::Result<Arc<TabularResult>, DashboardError>,
}

impl TableFetch {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}
