use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error in `{statement}`: {reason}")]
    Query { statement: String, reason: String },

    #[error("Column `{0}` missing from result set")]
    MissingColumn(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Warehouse does not match schema contract v{version}: {details}")]
    ContractViolation { version: u32, details: String },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl DashboardError {
    pub fn query(statement: &str, reason: impl ToString) -> Self {
        DashboardError::Query {
            statement: statement.split_whitespace().collect::<Vec<_>>().join(" "),
            reason: reason.to_string(),
        }
    }
}

impl From<config::ConfigError> for DashboardError {
    fn from(err: config::ConfigError) -> Self {
        DashboardError::Configuration(err.to_string())
    }
}
