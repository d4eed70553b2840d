//! Versioned description of the star schema the weather fact join depends on.
//!
//! The join in [`crate::readers::fact_reader`] hardcodes these names. Checking
//! them against `information_schema.columns` up front turns a schema break
//! into a readable report instead of a failed join.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::{DashboardError, Result};
use crate::models::{TableIdentifier, TabularResult};
use crate::warehouse::Connector;

pub const CONTRACT_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct RelationContract {
    pub schema: &'static str,
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

impl RelationContract {
    pub fn identifier(&self) -> TableIdentifier {
        TableIdentifier::new(self.schema, self.table)
    }
}

#[derive(Debug, Clone)]
pub struct SchemaContract {
    pub version: u32,
    pub relations: Vec<RelationContract>,
}

impl SchemaContract {
    pub fn v1() -> Self {
        Self {
            version: CONTRACT_VERSION,
            relations: vec![
                RelationContract {
                    schema: "fact",
                    table: "temperature",
                    columns: &["temperature_id", "temp", "date_id", "city_id", "condition_id"],
                },
                RelationContract {
                    schema: "dim",
                    table: "date",
                    columns: &["date_id", "full_date"],
                },
                RelationContract {
                    schema: "dim",
                    table: "city",
                    columns: &["city_id", "city_name", "country_id"],
                },
                RelationContract {
                    schema: "dim",
                    table: "country",
                    columns: &["country_id", "country_name"],
                },
                RelationContract {
                    schema: "dim",
                    table: "conditions",
                    columns: &["condition_id", "condition_name"],
                },
            ],
        }
    }

    /// Catalog query covering every schema the contract names.
    pub fn statement(&self) -> String {
        let schemas: BTreeSet<&str> = self.relations.iter().map(|r| r.schema).collect();
        let list = schemas
            .iter()
            .map(|s| format!("'{}'", s))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "SELECT table_schema::text AS table_schema, \
                    table_name::text AS table_name, \
                    column_name::text AS column_name \
             FROM information_schema.columns \
             WHERE table_schema IN ({}) \
             ORDER BY table_schema, table_name, ordinal_position",
            list
        )
    }

    /// Compares the catalog rows returned by [`statement`](Self::statement)
    /// against the contract.
    pub fn evaluate(&self, catalog: &TabularResult) -> Result<ContractReport> {
        let schema_idx = catalog.require_column("table_schema")?;
        let table_idx = catalog.require_column("table_name")?;
        let column_idx = catalog.require_column("column_name")?;

        let mut present: HashMap<TableIdentifier, HashSet<String>> = HashMap::new();
        for row in catalog.rows() {
            let (Some(schema), Some(table), Some(column)) = (
                row[schema_idx].as_str(),
                row[table_idx].as_str(),
                row[column_idx].as_str(),
            ) else {
                continue;
            };
            present
                .entry(TableIdentifier::new(schema, table))
                .or_default()
                .insert(column.to_string());
        }

        let mut report = ContractReport {
            version: self.version,
            missing_tables: Vec::new(),
            missing_columns: Vec::new(),
        };

        for relation in &self.relations {
            let id = relation.identifier();
            match present.get(&id) {
                None => report.missing_tables.push(id),
                Some(columns) => {
                    for column in relation.columns {
                        if !columns.contains(*column) {
                            report.missing_columns.push((id.clone(), column.to_string()));
                        }
                    }
                }
            }
        }

        Ok(report)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractReport {
    pub version: u32,
    pub missing_tables: Vec<TableIdentifier>,
    pub missing_columns: Vec<(TableIdentifier, String)>,
}

impl ContractReport {
    pub fn is_satisfied(&self) -> bool {
        self.missing_tables.is_empty() && self.missing_columns.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.is_satisfied() {
            return format!("Schema contract v{}: all relations present", self.version);
        }

        let mut lines = vec![format!("Schema contract v{}: violations found", self.version)];
        for table in &self.missing_tables {
            lines.push(format!("- missing table {}", table));
        }
        for (table, column) in &self.missing_columns {
            lines.push(format!("- missing column {}.{}", table, column));
        }
        lines.join("\n")
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_satisfied() {
            return Ok(());
        }

        let mut details: Vec<String> = self
            .missing_tables
            .iter()
            .map(|t| format!("table {}", t))
            .collect();
        details.extend(
            self.missing_columns
                .iter()
                .map(|(t, c)| format!("column {}.{}", t, c)),
        );

        Err(DashboardError::ContractViolation {
            version: self.version,
            details: format!("missing {}", details.join(", ")),
        })
    }
}

/// Runs the v1 contract check against the live warehouse.
pub async fn check_contract<C: Connector + ?Sized>(connector: &C) -> Result<ContractReport> {
    let contract = SchemaContract::v1();
    let catalog = connector.execute(&contract.statement()).await?;
    contract.evaluate(&catalog)
}
