use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{DashboardError, Result};
use crate::models::TabularResult;
use crate::utils::constants::{EXPORT_FILE_NAME, EXPORT_MIME_TYPE};

/// A downloadable file: name, MIME type and UTF-8 CSV content.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Writes a result set as CSV: one header row of column names, one line per
/// row, no index column. Missing values are empty fields.
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn to_bytes(&self, table: &TabularResult) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        if !table.columns().is_empty() {
            writer.write_record(table.columns())?;
        }
        for row in table.rows() {
            writer.write_record(row.iter().map(|v| v.to_csv_field()))?;
        }

        writer
            .into_inner()
            .map_err(|e| DashboardError::Io(e.into_error()))
    }

    pub fn artifact(&self, table: &TabularResult) -> Result<ExportArtifact> {
        Ok(ExportArtifact {
            file_name: EXPORT_FILE_NAME,
            mime_type: EXPORT_MIME_TYPE,
            bytes: self.to_bytes(table)?,
        })
    }

    /// Writes the artifact into `dir` (created if needed) and returns the path.
    pub fn write_to_dir(&self, table: &TabularResult, dir: &Path) -> Result<PathBuf> {
        let artifact = self.artifact(table)?;
        fs::create_dir_all(dir)?;

        let path = dir.join(artifact.file_name);
        fs::write(&path, &artifact.bytes)?;
        info!(path = %path.display(), rows = table.row_count(), "exported filtered rows");

        Ok(path)
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scalar;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn table() -> TabularResult {
        TabularResult::new(
            vec!["city_name".to_string(), "temp".to_string(), "full_date".to_string()],
            vec![
                vec![
                    Scalar::from("São Paulo"),
                    Scalar::Float(21.0),
                    Scalar::Date(NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()),
                ],
                vec![
                    Scalar::from("Rio, RJ"),
                    Scalar::Null,
                    Scalar::Date(NaiveDate::from_ymd_opt(2024, 7, 5).unwrap()),
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let bytes = CsvExporter::new().to_bytes(&table()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "city_name,temp,full_date\nSão Paulo,21.0,2024-07-04\n\"Rio, RJ\",,2024-07-05\n"
        );
    }

    #[test]
    fn test_empty_result_still_has_header() {
        let empty = TabularResult::empty(vec!["a".to_string(), "b".to_string()]);
        let bytes = CsvExporter::new().to_bytes(&empty).unwrap();
        assert_eq!(bytes, b"a,b\n".to_vec());
    }

    #[test]
    fn test_write_to_dir_uses_fixed_name() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new();

        let artifact = exporter.artifact(&table()).unwrap();
        assert_eq!(artifact.file_name, "filtered_weather_data.csv");
        assert_eq!(artifact.mime_type, "text/csv");

        let path = exporter.write_to_dir(&table(), &dir.path().join("out")).unwrap();
        assert!(path.ends_with("filtered_weather_data.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes);
    }
}
