use std::collections::{BTreeSet, HashSet};

use crate::models::{TemperatureBucket, WeatherObservation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Condition,
    Country,
    City,
    Bucket,
}

/// The four multi-select filters. A row survives only if each of its
/// categorical attributes is selected; an empty set selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub conditions: BTreeSet<String>,
    pub countries: BTreeSet<String>,
    pub cities: BTreeSet<String>,
    pub buckets: BTreeSet<TemperatureBucket>,
}

impl Selection {
    /// Every value present in `rows`: the unfiltered default.
    pub fn all(rows: &[WeatherObservation]) -> Self {
        let mut selection = Self::default();
        for obs in rows {
            selection.conditions.insert(obs.condition_name.clone());
            selection.countries.insert(obs.country_name.clone());
            selection.cities.insert(obs.city_name.clone());
            selection.buckets.insert(obs.bucket());
        }
        selection
    }

    pub fn with_conditions<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_countries<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cities<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_buckets<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = TemperatureBucket>,
    {
        self.buckets = values.into_iter().collect();
        self
    }

    pub fn matches(&self, obs: &WeatherObservation) -> bool {
        self.conditions.contains(&obs.condition_name)
            && self.countries.contains(&obs.country_name)
            && self.cities.contains(&obs.city_name)
            && self.buckets.contains(&obs.bucket())
    }
}

/// Rows that pass `selection`, in their original order.
pub fn filter(rows: &[WeatherObservation], selection: &Selection) -> Vec<WeatherObservation> {
    rows.iter()
        .filter(|obs| selection.matches(obs))
        .cloned()
        .collect()
}

/// Distinct values of one dimension in order of first appearance, which is
/// the order the filter widgets list them in.
pub fn distinct_values(rows: &[WeatherObservation], dimension: Dimension) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(|obs| match dimension {
            Dimension::Condition => obs.condition_name.clone(),
            Dimension::Country => obs.country_name.clone(),
            Dimension::City => obs.city_name.clone(),
            Dimension::Bucket => obs.bucket().label().to_string(),
        })
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
