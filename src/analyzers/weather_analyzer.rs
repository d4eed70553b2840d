use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::cache::CachedWarehouse;
use crate::error::DashboardError;
use crate::models::{TabularResult, WeatherObservation};
use crate::processors::{
    filter, format_mean, mean_by_city, mean_by_date, overall_mean, GroupMean, Selection,
};
use crate::warehouse::Connector;

/// The three headline numbers over a (possibly filtered) set of observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub city_count: usize,
    pub record_count: usize,
    pub mean_temp: Option<f64>,
}

impl SummaryMetrics {
    pub fn compute(rows: &[WeatherObservation]) -> Self {
        let cities: HashSet<&str> = rows.iter().map(|o| o.city_name.as_str()).collect();
        Self {
            city_count: cities.len(),
            record_count: rows.len(),
            mean_temp: overall_mean(rows),
        }
    }

    /// Two decimals, or the placeholder when there is nothing to average.
    pub fn mean_temp_display(&self) -> String {
        format_mean(self.mean_temp)
    }

    pub fn summary(&self) -> String {
        format!(
            "Number of Cities: {}\n\
            Temperature Records: {}\n\
            Average Temp (°C): {}",
            self.city_count,
            self.record_count,
            self.mean_temp_display()
        )
    }
}

/// Both chart series, ready for an external renderer.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub by_city: Vec<GroupMean>,
    pub by_date: Vec<GroupMean>,
}

/// The weather fact load as seen by charts, filters and metrics.
///
/// Loading never fails outright: if the query or decoding fails, the view
/// is empty and keeps the error so the caller can show it, and everything
/// downstream renders its empty state.
#[derive(Debug)]
pub struct WeatherView {
    observations: Vec<WeatherObservation>,
    load_error: Option<DashboardError>,
}

impl WeatherView {
    pub async fn load<C: Connector>(warehouse: &CachedWarehouse<C>) -> Self {
        let decoded = match warehouse.load_weather_facts().await {
            Ok(table) => WeatherObservation::from_table(&table),
            Err(e) => Err(e),
        };

        match decoded {
            Ok(observations) => {
                info!(rows = observations.len(), "weather facts loaded");
                Self::from_observations(observations)
            }
            Err(e) => Self::degraded(e),
        }
    }

    /// Empty view carrying the error that prevented the load.
    pub fn degraded(error: DashboardError) -> Self {
        warn!(error = %error, "weather facts unavailable, showing empty view");
        Self {
            observations: Vec::new(),
            load_error: Some(error),
        }
    }

    pub fn from_observations(observations: Vec<WeatherObservation>) -> Self {
        Self {
            observations,
            load_error: None,
        }
    }

    pub fn observations(&self) -> &[WeatherObservation] {
        &self.observations
    }

    pub fn load_error(&self) -> Option<&DashboardError> {
        self.load_error.as_ref()
    }

    pub fn is_degraded(&self) -> bool {
        self.load_error.is_some()
    }

    pub fn charts(&self) -> ChartSeries {
        ChartSeries {
            by_city: mean_by_city(&self.observations),
            by_date: mean_by_date(&self.observations),
        }
    }

    pub fn default_selection(&self) -> Selection {
        Selection::all(&self.observations)
    }

    pub fn apply(&self, selection: &Selection) -> FilteredView {
        let rows = filter(&self.observations, selection);
        let metrics = SummaryMetrics::compute(&rows);
        FilteredView { rows, metrics }
    }
}

#[derive(Debug, Clone)]
pub struct FilteredView {
    pub rows: Vec<WeatherObservation>,
    pub metrics: SummaryMetrics,
}

impl FilteredView {
    pub fn to_table(&self) -> TabularResult {
        WeatherObservation::to_table(&self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(city: &str, temp: Option<f64>) -> WeatherObservation {
        WeatherObservation {
            temperature_id: 1,
            temp,
            full_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            city_name: city.to_string(),
            country_name: "Brazil".to_string(),
            condition_name: "Clear".to_string(),
        }
    }

    #[test]
    fn test_metrics_on_empty_set() {
        let metrics = SummaryMetrics::compute(&[]);
        assert_eq!(metrics.city_count, 0);
        assert_eq!(metrics.record_count, 0);
        assert_eq!(metrics.mean_temp, None);
        assert_eq!(metrics.mean_temp_display(), "–");
    }

    #[test]
    fn test_metrics_skip_missing_readings() {
        let rows = vec![obs("Belém", Some(27.0)), obs("Belém", None), obs("Macapá", Some(28.5))];
        let metrics = SummaryMetrics::compute(&rows);
        assert_eq!(metrics.city_count, 2);
        assert_eq!(metrics.record_count, 3);
        assert_eq!(metrics.mean_temp_display(), "27.75");
        assert!(metrics.summary().contains("Temperature Records: 3"));
    }

    #[test]
    fn test_degraded_view_keeps_error() {
        let view = WeatherView::degraded(DashboardError::ContractViolation {
            version: 1,
            details: "missing table fact.temperature".to_string(),
        });
        assert!(view.is_degraded());
        assert!(view.observations().is_empty());
        assert!(view.charts().by_city.is_empty());
        assert_eq!(view.apply(&view.default_selection()).metrics.record_count, 0);
    }

    #[test]
    fn test_chart_series_json_shape() {
        let mut day_two = obs("Palmas", None);
        day_two.full_date = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let view = WeatherView::from_observations(vec![obs("Natal", Some(28.5)), day_two]);

        let json = serde_json::to_value(view.charts()).unwrap();
        assert_eq!(
            json["by_city"],
            serde_json::json!([
                {"key": "Natal", "mean": 28.5, "readings": 1, "rows": 1},
                {"key": "Palmas", "mean": null, "readings": 0, "rows": 1}
            ])
        );
        assert_eq!(json["by_date"][0]["key"], "2024-06-01");
        assert_eq!(json["by_date"][1]["key"], "2024-06-02");
        assert_eq!(json["by_date"][1]["mean"], serde_json::Value::Null);
    }

    #[test]
    fn test_empty_view_renders_empty_state() {
        let view = WeatherView::from_observations(Vec::new());
        let charts = view.charts();
        assert!(charts.by_city.is_empty());
        assert!(charts.by_date.is_empty());

        let filtered = view.apply(&view.default_selection());
        assert!(filtered.rows.is_empty());
        assert_eq!(filtered.metrics.mean_temp_display(), "–");
        assert!(filtered.to_table().is_empty());
    }
}
