use crate::models::{PollenDataset, PollenRecord};
use std::collections::HashSet;

/// Identity key for exact-duplicate detection. Float fields compare by bit
/// pattern, so two rows merge only when they are byte-for-byte the same
/// observation.
#[derive(Hash, PartialEq, Eq)]
struct RecordKey {
    site_name: String,
    latitude: u64,
    longitude: u64,
    age: u64,
    taxon: String,
    percentage: u32,
}

impl RecordKey {
    fn from_record(record: &PollenRecord) -> Self {
        Self {
            site_name: record.site_name.clone(),
            latitude: record.latitude.to_bits(),
            longitude: record.longitude.to_bits(),
            age: record.age.to_bits(),
            taxon: record.taxon.clone(),
            percentage: record.percentage.to_bits(),
        }
    }
}

#[derive(Debug)]
pub struct MergeOutcome {
    pub dataset: PollenDataset,
    pub duplicates_removed: usize,
}

/// Concatenates tables loaded from separate files, dropping rows that are
/// exact duplicates of ones already seen. Input order is preserved.
pub struct DatasetMerger;

impl DatasetMerger {
    pub fn new() -> Self {
        Self
    }

    pub fn merge(&self, tables: Vec<PollenDataset>) -> MergeOutcome {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        let mut duplicates_removed = 0;

        for table in tables {
            for record in table.into_records() {
                if seen.insert(RecordKey::from_record(&record)) {
                    merged.push(record);
                } else {
                    duplicates_removed += 1;
                }
            }
        }

        MergeOutcome {
            dataset: PollenDataset::from_records(merged),
            duplicates_removed,
        }
    }
}

impl Default for DatasetMerger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgeType;

    fn record(site: &str, age: f64, taxon: &str, pct: f32) -> PollenRecord {
        PollenRecord::new(
            site.to_string(),
            43.42,
            -89.73,
            age,
            AgeType::CalendarYearsBp,
            taxon.to_string(),
            pct,
        )
    }

    #[test]
    fn test_merge_concatenates() {
        let a = PollenDataset::from_records(vec![record("Devils Lake", 100.0, "Pinus", 20.0)]);
        let b = PollenDataset::from_records(vec![record("Wolsfeld Lake", 600.0, "Quercus", 5.0)]);

        let outcome = DatasetMerger::new().merge(vec![a, b]);

        assert_eq!(outcome.dataset.len(), 2);
        assert_eq!(outcome.duplicates_removed, 0);
        // input order preserved
        assert_eq!(outcome.dataset.records()[0].site_name, "Devils Lake");
    }

    #[test]
    fn test_merge_drops_exact_duplicates() {
        let a = PollenDataset::from_records(vec![
            record("Devils Lake", 100.0, "Pinus", 20.0),
            record("Devils Lake", 100.0, "Pinus", 20.0),
        ]);
        let b = PollenDataset::from_records(vec![record("Devils Lake", 100.0, "Pinus", 20.0)]);

        let outcome = DatasetMerger::new().merge(vec![a, b]);

        assert_eq!(outcome.dataset.len(), 1);
        assert_eq!(outcome.duplicates_removed, 2);
    }

    #[test]
    fn test_near_duplicates_kept() {
        let a = PollenDataset::from_records(vec![
            record("Devils Lake", 100.0, "Pinus", 20.0),
            record("Devils Lake", 100.0, "Pinus", 20.1),
            record("Devils Lake", 100.5, "Pinus", 20.0),
        ]);

        let outcome = DatasetMerger::new().merge(vec![a]);

        assert_eq!(outcome.dataset.len(), 3);
        assert_eq!(outcome.duplicates_removed, 0);
    }

    #[test]
    fn test_merge_empty_input() {
        let outcome = DatasetMerger::new().merge(vec![]);
        assert!(outcome.dataset.is_empty());
        assert_eq!(outcome.duplicates_removed, 0);
    }
}
