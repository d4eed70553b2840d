use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{TemperatureBucket, WeatherObservation};
use crate::utils::constants::PLACEHOLDER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    City,
    Country,
    Condition,
    Date,
    Bucket,
}

impl GroupKey {
    fn value_of(&self, obs: &WeatherObservation) -> GroupValue {
        match self {
            GroupKey::City => GroupValue::Text(obs.city_name.clone()),
            GroupKey::Country => GroupValue::Text(obs.country_name.clone()),
            GroupKey::Condition => GroupValue::Text(obs.condition_name.clone()),
            GroupKey::Date => GroupValue::Date(obs.full_date),
            GroupKey::Bucket => GroupValue::Bucket(obs.bucket()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupValue {
    Text(String),
    Date(NaiveDate),
    Bucket(TemperatureBucket),
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Text(s) => f.write_str(s),
            GroupValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            GroupValue::Bucket(b) => f.write_str(b.label()),
        }
    }
}

impl Serialize for GroupValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Mean temperature of one group. `mean` is `None` when every reading in the
/// group is missing; `readings` counts the non-missing ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: GroupValue,
    pub mean: Option<f64>,
    pub readings: usize,
    pub rows: usize,
}

impl GroupMean {
    pub fn mean_display(&self) -> String {
        format_mean(self.mean)
    }
}

pub fn format_mean(mean: Option<f64>) -> String {
    mean.map_or_else(|| PLACEHOLDER.to_string(), |m| format!("{:.2}", m))
}

/// Mean of `temp` per group, skipping missing readings.
///
/// City groups come back hottest first (undefined means last, ties by
/// name); every other grouping is ordered by its key, so dates run
/// oldest to newest.
pub fn group_mean(rows: &[WeatherObservation], key: GroupKey) -> Vec<GroupMean> {
    let mut groups: BTreeMap<GroupValue, (f64, usize, usize)> = BTreeMap::new();
    for obs in rows {
        let entry = groups.entry(key.value_of(obs)).or_insert((0.0, 0, 0));
        entry.2 += 1;
        if let Some(t) = obs.temp.filter(|t| !t.is_nan()) {
            entry.0 += t;
            entry.1 += 1;
        }
    }

    let mut means: Vec<GroupMean> = groups
        .into_iter()
        .map(|(value, (sum, readings, rows))| GroupMean {
            key: value,
            mean: (readings > 0).then(|| sum / readings as f64),
            readings,
            rows,
        })
        .collect();

    if key == GroupKey::City {
        means.sort_by(|a, b| descending_mean(a.mean, b.mean));
    }

    means
}

pub fn mean_by_city(rows: &[WeatherObservation]) -> Vec<GroupMean> {
    group_mean(rows, GroupKey::City)
}

pub fn mean_by_date(rows: &[WeatherObservation]) -> Vec<GroupMean> {
    group_mean(rows, GroupKey::Date)
}

/// Overall mean of the non-missing readings.
pub fn overall_mean(rows: &[WeatherObservation]) -> Option<f64> {
    let (sum, count) = rows
        .iter()
        .filter_map(|obs| obs.temp.filter(|t| !t.is_nan()))
        .fold((0.0, 0usize), |(sum, count), t| (sum + t, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn descending_mean(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn obs(city: &str, day: u32, temp: Option<f64>) -> WeatherObservation {
        WeatherObservation {
            temperature_id: i64::from(day),
            temp,
            full_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            city_name: city.to_string(),
            country_name: "Brazil".to_string(),
            condition_name: "Clear".to_string(),
        }
    }

    #[test]
    fn test_city_means_skip_nulls_and_sort_descending() {
        let rows = vec![obs("A", 1, Some(10.0)), obs("A", 2, None), obs("B", 3, Some(20.0))];
        let means = mean_by_city(&rows);

        let pairs: Vec<(String, Option<f64>)> = means
            .iter()
            .map(|g| (g.key.to_string(), g.mean))
            .collect();
        assert_eq!(
            pairs,
            vec![("B".to_string(), Some(20.0)), ("A".to_string(), Some(10.0))]
        );
        assert_eq!(means[1].readings, 1);
        assert_eq!(means[1].rows, 2);
    }

    #[test]
    fn test_all_null_group_has_placeholder_mean() {
        let rows = vec![obs("Palmas", 1, None), obs("Natal", 1, Some(28.0)), obs("Palmas", 2, None)];
        let means = mean_by_city(&rows);

        assert_eq!(means.len(), 2);
        assert_eq!(means[0].key.to_string(), "Natal");
        assert_eq!(means[1].mean, None);
        assert_eq!(means[1].mean_display(), "–");
        assert_eq!(means[0].mean_display(), "28.00");
    }

    #[test]
    fn test_date_means_ascend_by_date() {
        let rows = vec![
            obs("A", 3, Some(30.0)),
            obs("B", 1, Some(10.0)),
            obs("C", 1, Some(20.0)),
            obs("A", 2, Some(25.0)),
        ];
        let means = mean_by_date(&rows);

        let days: Vec<String> = means.iter().map(|g| g.key.to_string()).collect();
        assert_eq!(days, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(means[0].mean, Some(15.0));
    }

    #[test]
    fn test_bucket_groups_follow_bucket_order() {
        let rows = vec![obs("A", 1, None), obs("B", 1, Some(35.0)), obs("C", 1, Some(5.0))];
        let keys: Vec<GroupValue> = group_mean(&rows, GroupKey::Bucket)
            .into_iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(
            keys,
            vec![
                GroupValue::Bucket(TemperatureBucket::Below10),
                GroupValue::Bucket(TemperatureBucket::AtLeast30),
                GroupValue::Bucket(TemperatureBucket::Unknown),
            ]
        );
    }

    #[test]
    fn test_country_and_condition_groups_sort_by_name() {
        let mut rows = vec![obs("Rosario", 1, Some(22.0)), obs("Recife", 1, Some(30.0))];
        rows[0].country_name = "Argentina".to_string();
        rows[0].condition_name = "Rain".to_string();

        let countries: Vec<(String, Option<f64>)> = group_mean(&rows, GroupKey::Country)
            .iter()
            .map(|g| (g.key.to_string(), g.mean))
            .collect();
        assert_eq!(
            countries,
            vec![("Argentina".to_string(), Some(22.0)), ("Brazil".to_string(), Some(30.0))]
        );

        let conditions: Vec<String> = group_mean(&rows, GroupKey::Condition)
            .iter()
            .map(|g| g.key.to_string())
            .collect();
        assert_eq!(conditions, vec!["Clear", "Rain"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(mean_by_city(&[]).is_empty());
        assert_eq!(overall_mean(&[]), None);
    }
}
