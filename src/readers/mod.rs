pub mod catalog_reader;
pub mod fact_reader;
pub mod table_reader;

pub use catalog_reader::{fetch_catalog, list_tables, list_tables_statement, parse_table_list};
pub use fact_reader::{load_weather_facts, WEATHER_FACTS_STATEMENT};
pub use table_reader::{fetch_table, fetch_table_statement};
