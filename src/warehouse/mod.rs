pub mod config;
pub mod connector;
pub mod contract;

pub use config::WarehouseConfig;
pub use connector::{Connector, PostgresConnector};
pub use contract::{check_contract, ContractReport, SchemaContract, CONTRACT_VERSION};
