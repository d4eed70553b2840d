use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::error::{DashboardError, Result};

/// A single cell of a result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
}

impl Scalar {
    /// Numeric view of the cell. NaN reads as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Scalar::Date(d) => Some(*d),
            Scalar::Timestamp(ts) => Some(ts.date()),
            Scalar::TimestampTz(ts) => Some(ts.date_naive()),
            _ => None,
        }
    }

    /// Text form used for CSV cells. Nulls become empty fields and floats
    /// always carry a fractional part.
    pub fn to_csv_field(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Float(v) if v.is_nan() => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "NULL"),
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Text(s) => write!(f, "{}", s),
            Scalar::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Scalar::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Scalar::TimestampTz(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%:z")),
        }
    }
}

impl From<Option<f64>> for Scalar {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Scalar::Null, Scalar::Float)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// Named, ordered columns over ordered rows. Stored row-major since every
/// consumer walks it row by row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabularResult {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

impl TabularResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Result<Self> {
        if let Some(bad) = rows.iter().position(|row| row.len() != columns.len()) {
            return Err(DashboardError::InvalidFormat(format!(
                "row {} has {} cells but the result has {} columns",
                bad,
                rows[bad].len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| DashboardError::MissingColumn(name.to_string()))
    }

    /// Plain-text grid for terminal output, limited to `max_rows` rows.
    pub fn render(&self, max_rows: usize) -> String {
        let shown = self.rows.len().min(max_rows);
        let cells: Vec<Vec<String>> = self.rows[..shown]
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let format_line = |values: Vec<&str>| -> String {
            values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{:<width$}", v, width = *w))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = Vec::with_capacity(shown + 3);
        out.push(format_line(self.columns.iter().map(String::as_str).collect()));
        out.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in &cells {
            out.push(format_line(row.iter().map(String::as_str).collect()));
        }
        if self.rows.len() > shown {
            out.push(format!("... {} more rows", self.rows.len() - shown));
        }

        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TabularResult {
        TabularResult::new(
            vec!["city".to_string(), "temp".to_string()],
            vec![
                vec![Scalar::from("Recife"), Scalar::Float(27.5)],
                vec![Scalar::from("Curitiba"), Scalar::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = TabularResult::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Scalar::Int(1)]],
        );
        assert!(matches!(result, Err(DashboardError::InvalidFormat(_))));
    }

    #[test]
    fn test_column_lookup() {
        let table = sample();
        assert_eq!(table.column_index("temp"), Some(1));
        assert!(matches!(
            table.require_column("humidity"),
            Err(DashboardError::MissingColumn(name)) if name == "humidity"
        ));
    }

    #[test]
    fn test_scalar_formatting() {
        assert_eq!(Scalar::Float(20.0).to_string(), "20.0");
        assert_eq!(Scalar::Float(21.25).to_string(), "21.25");
        assert_eq!(Scalar::Null.to_csv_field(), "");
        assert_eq!(Scalar::Float(f64::NAN).to_csv_field(), "");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Scalar::Date(date).to_csv_field(), "2024-03-09");
        assert_eq!(Scalar::Float(f64::NAN).as_f64(), None);
    }

    #[test]
    fn test_render_truncates() {
        let rendered = sample().render(1);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("city"));
        assert!(lines[2].contains("Recife"));
        assert_eq!(lines[3], "... 1 more rows");
    }
}
