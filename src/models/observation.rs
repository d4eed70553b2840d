use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DashboardError, Result};
use crate::models::{Scalar, TabularResult};
use crate::processors::categorize;
use crate::utils::constants::{
    COL_CITY_NAME, COL_CONDITION_NAME, COL_COUNTRY_NAME, COL_FULL_DATE, COL_TEMP,
    COL_TEMPERATURE_ID, COL_TEMP_RANGE,
};

/// Ordinal temperature band. Variant order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemperatureBucket {
    Below10,
    From10To20,
    From20To30,
    AtLeast30,
    Unknown,
}

impl TemperatureBucket {
    pub const ALL: [TemperatureBucket; 5] = [
        TemperatureBucket::Below10,
        TemperatureBucket::From10To20,
        TemperatureBucket::From20To30,
        TemperatureBucket::AtLeast30,
        TemperatureBucket::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TemperatureBucket::Below10 => "<10°C",
            TemperatureBucket::From10To20 => "10–20°C",
            TemperatureBucket::From20To30 => "20–30°C",
            TemperatureBucket::AtLeast30 => "≥30°C",
            TemperatureBucket::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TemperatureBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TemperatureBucket {
    type Err = DashboardError;

    /// Accepts the display labels plus ASCII spellings for shells.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "<10°c" | "<10" | "lt10" | "below10" => Ok(TemperatureBucket::Below10),
            "10–20°c" | "10-20°c" | "10-20" | "10to20" => Ok(TemperatureBucket::From10To20),
            "20–30°c" | "20-30°c" | "20-30" | "20to30" => Ok(TemperatureBucket::From20To30),
            "≥30°c" | ">=30" | "ge30" | "30+" => Ok(TemperatureBucket::AtLeast30),
            "unknown" => Ok(TemperatureBucket::Unknown),
            _ => Err(DashboardError::InvalidFormat(format!(
                "unknown temperature range '{}'",
                s
            ))),
        }
    }
}

/// One denormalized row of the weather fact load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature_id: i64,
    pub temp: Option<f64>,
    pub full_date: NaiveDate,
    pub city_name: String,
    pub country_name: String,
    pub condition_name: String,
}

impl WeatherObservation {
    pub fn bucket(&self) -> TemperatureBucket {
        categorize(self.temp)
    }

    /// Decodes the fact load. Every column of the join must be present;
    /// extra columns are ignored.
    pub fn from_table(table: &TabularResult) -> Result<Vec<Self>> {
        let id_idx = table.require_column(COL_TEMPERATURE_ID)?;
        let temp_idx = table.require_column(COL_TEMP)?;
        let date_idx = table.require_column(COL_FULL_DATE)?;
        let city_idx = table.require_column(COL_CITY_NAME)?;
        let country_idx = table.require_column(COL_COUNTRY_NAME)?;
        let condition_idx = table.require_column(COL_CONDITION_NAME)?;

        table
            .rows()
            .iter()
            .enumerate()
            .map(|(n, row)| -> Result<Self> {
                Ok(Self {
                    temperature_id: parse_id(&row[id_idx], n)?,
                    temp: row[temp_idx].as_f64(),
                    full_date: row[date_idx].as_date().ok_or_else(|| {
                        invalid_cell(COL_FULL_DATE, n, &row[date_idx])
                    })?,
                    city_name: text_cell(&row[city_idx], COL_CITY_NAME, n)?,
                    country_name: text_cell(&row[country_idx], COL_COUNTRY_NAME, n)?,
                    condition_name: text_cell(&row[condition_idx], COL_CONDITION_NAME, n)?,
                })
            })
            .collect()
    }

    /// Tabular form with the derived `temp_range` column appended, as shown
    /// in the filtered table and written to the export.
    pub fn to_table(observations: &[Self]) -> TabularResult {
        let columns = [
            COL_TEMPERATURE_ID,
            COL_TEMP,
            COL_FULL_DATE,
            COL_CITY_NAME,
            COL_COUNTRY_NAME,
            COL_CONDITION_NAME,
            COL_TEMP_RANGE,
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();

        let rows = observations
            .iter()
            .map(|obs| {
                vec![
                    Scalar::Int(obs.temperature_id),
                    Scalar::from(obs.temp),
                    Scalar::Date(obs.full_date),
                    Scalar::Text(obs.city_name.clone()),
                    Scalar::Text(obs.country_name.clone()),
                    Scalar::Text(obs.condition_name.clone()),
                    Scalar::Text(obs.bucket().label().to_string()),
                ]
            })
            .collect();

        // Every row is built with exactly one cell per column.
        TabularResult::new(columns, rows).unwrap_or_default()
    }
}

fn parse_id(value: &Scalar, row: usize) -> Result<i64> {
    match value {
        Scalar::Int(id) => Ok(*id),
        // NUMERIC keys decode as floats.
        Scalar::Float(id) if id.fract() == 0.0 && id.abs() < i64::MAX as f64 => Ok(*id as i64),
        Scalar::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| invalid_cell(COL_TEMPERATURE_ID, row, value)),
        _ => Err(invalid_cell(COL_TEMPERATURE_ID, row, value)),
    }
}

fn text_cell(value: &Scalar, column: &str, row: usize) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid_cell(column, row, value))
}

fn invalid_cell(column: &str, row: usize, value: &Scalar) -> DashboardError {
    DashboardError::InvalidFormat(format!(
        "unexpected value {} in column '{}' at row {}",
        value, column, row
    ))
}
