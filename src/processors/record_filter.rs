use crate::models::PollenRecord;
use crate::utils::constants::AGE_WINDOW_HALF_WIDTH;

/// A (time, taxon) selection over the loaded table
#[derive(Debug, Clone, PartialEq)]
pub struct FilterQuery {
    /// Center of the age window, years before present
    pub time: f64,
    /// Taxon name, matched exactly
    pub taxon: String,
}

impl FilterQuery {
    pub fn new(time: f64, taxon: impl Into<String>) -> Self {
        Self {
            time,
            taxon: taxon.into(),
        }
    }
}

/// Selects records whose age falls inside a fixed-width window around the
/// query time and whose taxon matches exactly. The window is closed on both
/// ends. Selection is pure: the table is never modified and re-running the
/// same query yields the same rows.
pub struct RecordFilter {
    half_width: f64,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self {
            half_width: AGE_WINDOW_HALF_WIDTH,
        }
    }

    pub fn with_half_width(half_width: f64) -> Self {
        Self { half_width }
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    pub fn matches(&self, record: &PollenRecord, query: &FilterQuery) -> bool {
        record.is_within_window(query.time, self.half_width) && record.matches_taxon(&query.taxon)
    }

    pub fn apply<'a>(
        &self,
        records: &'a [PollenRecord],
        query: &FilterQuery,
    ) -> Vec<&'a PollenRecord> {
        records
            .iter()
            .filter(|record| self.matches(record, query))
            .collect()
    }
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self::new()
    }
}
