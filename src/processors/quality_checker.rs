use crate::models::PollenRecord;
use crate::utils::constants::{
    MAX_PLAUSIBLE_AGE, MAX_VALID_PERCENTAGE, MIN_PLAUSIBLE_AGE, MIN_VALID_PERCENTAGE,
};
use crate::utils::coordinates::validate_coordinates;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct QualityReport {
    pub total_records: usize,
    pub clean_records: usize,
    pub violations: Vec<QualityViolation>,
    pub site_statistics: HashMap<String, SiteStatistics>,
}

impl QualityReport {
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct QualityViolation {
    pub site_name: String,
    pub taxon: String,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationType {
    CoordinateOutOfBounds,
    PercentageOutOfRange,
    ImplausibleAge,
    BlankField,
}

#[derive(Debug, Clone, Default)]
pub struct SiteStatistics {
    pub total_records: usize,
    pub taxa: usize,
    pub youngest_age: Option<f64>,
    pub oldest_age: Option<f64>,
}

/// Scans a loaded table for values that parsed but look wrong. Nothing here
/// fails the run: the load already dropped unusable rows, and suspect values
/// are reported rather than removed.
pub struct QualityChecker;

impl QualityChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, records: &[PollenRecord]) -> QualityReport {
        let mut report = QualityReport {
            total_records: records.len(),
            clean_records: 0,
            violations: Vec::new(),
            site_statistics: HashMap::new(),
        };

        let mut site_taxa: HashMap<String, std::collections::HashSet<&str>> = HashMap::new();

        for record in records {
            let before = report.violations.len();
            self.check_record(record, &mut report);

            if report.violations.len() == before {
                report.clean_records += 1;
            }

            let stats = report
                .site_statistics
                .entry(record.site_name.clone())
                .or_default();
            stats.total_records += 1;
            stats.youngest_age = Some(
                stats
                    .youngest_age
                    .map_or(record.age, |age| age.min(record.age)),
            );
            stats.oldest_age = Some(
                stats
                    .oldest_age
                    .map_or(record.age, |age| age.max(record.age)),
            );

            site_taxa
                .entry(record.site_name.clone())
                .or_default()
                .insert(record.taxon.as_str());
        }

        for (site, taxa) in site_taxa {
            if let Some(stats) = report.site_statistics.get_mut(&site) {
                stats.taxa = taxa.len();
            }
        }

        report
    }

    fn check_record(&self, record: &PollenRecord, report: &mut QualityReport) {
        if record.site_name.trim().is_empty() || record.taxon.trim().is_empty() {
            report.violations.push(QualityViolation {
                site_name: record.site_name.clone(),
                taxon: record.taxon.clone(),
                violation_type: ViolationType::BlankField,
                details: "Blank site or taxon name".to_string(),
            });
        }

        if validate_coordinates(record.latitude, record.longitude).is_err() {
            report.violations.push(QualityViolation {
                site_name: record.site_name.clone(),
                taxon: record.taxon.clone(),
                violation_type: ViolationType::CoordinateOutOfBounds,
                details: format!(
                    "Coordinates ({}, {}) are off the globe",
                    record.latitude, record.longitude
                ),
            });
        }

        if !record.percentage.is_finite()
            || !(MIN_VALID_PERCENTAGE..=MAX_VALID_PERCENTAGE).contains(&record.percentage)
        {
            report.violations.push(QualityViolation {
                site_name: record.site_name.clone(),
                taxon: record.taxon.clone(),
                violation_type: ViolationType::PercentageOutOfRange,
                details: format!("Abundance {}% is outside [0, 100]", record.percentage),
            });
        }

        if !(MIN_PLAUSIBLE_AGE..=MAX_PLAUSIBLE_AGE).contains(&record.age) {
            report.violations.push(QualityViolation {
                site_name: record.site_name.clone(),
                taxon: record.taxon.clone(),
                violation_type: ViolationType::ImplausibleAge,
                details: format!(
                    "Age {} yr BP is outside the plausible range [{}, {}]",
                    record.age, MIN_PLAUSIBLE_AGE, MAX_PLAUSIBLE_AGE
                ),
            });
        }
    }

    pub fn generate_summary(&self, report: &QualityReport) -> String {
        let mut summary = String::new();

        summary.push_str("Quality Report\n");
        summary.push_str("==============\n");
        summary.push_str(&format!("Total records:  {}\n", report.total_records));
        summary.push_str(&format!("Clean records:  {}\n", report.clean_records));
        summary.push_str(&format!("Violations:     {}\n", report.violations.len()));
        summary.push_str(&format!("Sites:          {}\n", report.site_statistics.len()));

        if !report.violations.is_empty() {
            summary.push_str("\nViolations:\n");
            for violation in report.violations.iter().take(20) {
                summary.push_str(&format!(
                    "  {} / {}: {}\n",
                    violation.site_name, violation.taxon, violation.details
                ));
            }
            if report.violations.len() > 20 {
                summary.push_str(&format!(
                    "  ... and {} more\n",
                    report.violations.len() - 20
                ));
            }
        }

        summary
    }
}

impl Default for QualityChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgeType;

    fn record(site: &str, lat: f64, lon: f64, age: f64, taxon: &str, pct: f32) -> PollenRecord {
        PollenRecord::new(
            site.to_string(),
            lat,
            lon,
            age,
            AgeType::CalendarYearsBp,
            taxon.to_string(),
            pct,
        )
    }

    #[test]
    fn test_clean_dataset() {
        let records = vec![
            record("Devils Lake", 43.42, -89.73, 100.0, "Pinus", 20.0),
            record("Devils Lake", 43.42, -89.73, 600.0, "Quercus", 35.0),
        ];

        let report = QualityChecker::new().check(&records);

        assert_eq!(report.total_records, 2);
        assert_eq!(report.clean_records, 2);
        assert!(!report.has_violations());

        let stats = &report.site_statistics["Devils Lake"];
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.taxa, 2);
        assert_eq!(stats.youngest_age, Some(100.0));
        assert_eq!(stats.oldest_age, Some(600.0));
    }

    #[test]
    fn test_out_of_bounds_coordinates_flagged() {
        let records = vec![record("Nowhere", 91.0, 0.0, 100.0, "Pinus", 20.0)];

        let report = QualityChecker::new().check(&records);

        assert_eq!(report.violations.len(), 1);
        assert_eq!(
            report.violations[0].violation_type,
            ViolationType::CoordinateOutOfBounds
        );
        assert_eq!(report.clean_records, 0);
    }

    #[test]
    fn test_percentage_out_of_range_flagged() {
        let records = vec![record("Devils Lake", 43.42, -89.73, 100.0, "Pinus", 120.0)];

        let report = QualityChecker::new().check(&records);

        assert_eq!(report.violations.len(), 1);
        assert_eq!(
            report.violations[0].violation_type,
            ViolationType::PercentageOutOfRange
        );
    }

    #[test]
    fn test_implausible_age_flagged() {
        let records = vec![record("Devils Lake", 43.42, -89.73, 2e6, "Pinus", 20.0)];

        let report = QualityChecker::new().check(&records);

        assert_eq!(report.violations.len(), 1);
        assert_eq!(
            report.violations[0].violation_type,
            ViolationType::ImplausibleAge
        );
    }

    #[test]
    fn test_record_with_multiple_violations() {
        let records = vec![record("", 91.0, 0.0, 100.0, "Pinus", 20.0)];

        let report = QualityChecker::new().check(&records);

        assert_eq!(report.violations.len(), 2); // blank field + coordinates
        assert_eq!(report.clean_records, 0);
    }

    #[test]
    fn test_summary_format() {
        let records = vec![record("Devils Lake", 43.42, -89.73, 100.0, "Pinus", 20.0)];
        let checker = QualityChecker::new();
        let report = checker.check(&records);
        let summary = checker.generate_summary(&report);

        assert!(summary.contains("Total records:  1"));
        assert!(summary.contains("Clean records:  1"));
        assert!(!summary.contains("Violations:\n  "));
    }
}
