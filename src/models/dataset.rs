use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::PollenRecord;

/// A distinct coring site, taken from the first record that names it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// The in-memory table of observations. Loaded once, read-only afterwards;
/// every downstream operation is a non-destructive row selection.
#[derive(Debug, Clone, Default)]
pub struct PollenDataset {
    records: Vec<PollenRecord>,
}

impl PollenDataset {
    pub fn from_records(records: Vec<PollenRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PollenRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PollenRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct taxa, sorted; drives the selector control in map output
    pub fn taxa(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.taxon.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct sites keyed by name; coordinates come from the first record
    pub fn sites(&self) -> Vec<Site> {
        let mut by_name: BTreeMap<&str, Site> = BTreeMap::new();

        for record in &self.records {
            by_name.entry(record.site_name.as_str()).or_insert(Site {
                name: record.site_name.clone(),
                latitude: record.latitude,
                longitude: record.longitude,
            });
        }

        by_name.into_values().collect()
    }

    pub fn site_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.site_name.as_str())
            .collect::<std::collections::BTreeSet<_>>()
            .len()
    }

    /// (oldest, youngest) span of ages present, None for an empty table
    pub fn age_span(&self) -> Option<(f64, f64)> {
        let mut ages = self.records.iter().map(|r| r.age);
        let first = ages.next()?;

        let (min, max) = ages.fold((first, first), |(lo, hi), age| {
            (lo.min(age), hi.max(age))
        });

        Some((min, max))
    }
}
