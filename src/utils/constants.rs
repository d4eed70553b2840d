/// Row cap applied when browsing an arbitrary table
pub const TABLE_ROW_CAP: usize = 500;

/// Connection defaults
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Schemas hidden from the table browser
pub const SYSTEM_SCHEMAS: [&str; 2] = ["pg_catalog", "information_schema"];

/// Export artifact
pub const EXPORT_FILE_NAME: &str = "filtered_weather_data.csv";
pub const EXPORT_MIME_TYPE: &str = "text/csv";

/// Shown wherever a mean has no defined value
pub const PLACEHOLDER: &str = "–";

/// Weather fact columns, in query order
pub const COL_TEMPERATURE_ID: &str = "temperature_id";
pub const COL_TEMP: &str = "temp";
pub const COL_FULL_DATE: &str = "full_date";
pub const COL_CITY_NAME: &str = "city_name";
pub const COL_COUNTRY_NAME: &str = "country_name";
pub const COL_CONDITION_NAME: &str = "condition_name";
pub const COL_TEMP_RANGE: &str = "temp_range";

/// Browse defaults
pub const DEFAULT_PREVIEW_ROWS: usize = 10;
