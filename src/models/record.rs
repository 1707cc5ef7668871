use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{PollenError, Result};
use crate::models::AgeType;
use crate::utils::constants::{MAX_VALID_PERCENTAGE, MIN_VALID_PERCENTAGE};

/// A single pollen-taxon observation at a site and time. Records are built
/// once at load and never mutated; downstream stages only select subsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PollenRecord {
    pub site_name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    /// Years before present; negative for samples younger than the 1950 datum
    pub age: f64,

    pub age_type: AgeType,

    pub taxon: String,

    /// Abundance as a percentage of the pollen sum
    #[validate(range(min = 0.0, max = 100.0))]
    pub percentage: f32,
}

impl PollenRecord {
    pub fn new(
        site_name: String,
        latitude: f64,
        longitude: f64,
        age: f64,
        age_type: AgeType,
        taxon: String,
        percentage: f32,
    ) -> Self {
        Self {
            site_name,
            latitude,
            longitude,
            age,
            age_type,
            taxon,
            percentage,
        }
    }

    pub fn builder() -> PollenRecordBuilder {
        PollenRecordBuilder::new()
    }

    /// Closed-interval membership test: a record exactly `half_width` years
    /// from `time` is included.
    pub fn is_within_window(&self, time: f64, half_width: f64) -> bool {
        (self.age - time).abs() <= half_width
    }

    /// Exact, case-sensitive taxon match
    pub fn matches_taxon(&self, taxon: &str) -> bool {
        self.taxon == taxon
    }

    /// Marker fill opacity for map output, proportional to abundance
    pub fn marker_opacity(&self) -> f32 {
        (self.percentage / 100.0).clamp(0.0, 1.0)
    }

    pub fn has_plausible_percentage(&self) -> bool {
        self.percentage.is_finite()
            && (MIN_VALID_PERCENTAGE..=MAX_VALID_PERCENTAGE).contains(&self.percentage)
    }

    /// Structural checks beyond the field-range attributes
    pub fn validate_integrity(&self) -> Result<()> {
        if self.site_name.trim().is_empty() {
            return Err(PollenError::MissingData("site_name".to_string()));
        }

        if self.taxon.trim().is_empty() {
            return Err(PollenError::MissingData("taxon".to_string()));
        }

        if !self.age.is_finite() {
            return Err(PollenError::InvalidAge(format!(
                "Non-finite age for site '{}'",
                self.site_name
            )));
        }

        self.validate()?;
        Ok(())
    }
}

pub struct PollenRecordBuilder {
    site_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    age: Option<f64>,
    age_type: Option<AgeType>,
    taxon: Option<String>,
    percentage: Option<f32>,
}

impl Default for PollenRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PollenRecordBuilder {
    pub fn new() -> Self {
        Self {
            site_name: None,
            latitude: None,
            longitude: None,
            age: None,
            age_type: None,
            taxon: None,
            percentage: None,
        }
    }

    pub fn site_name(mut self, name: impl Into<String>) -> Self {
        self.site_name = Some(name.into());
        self
    }

    pub fn coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn age(mut self, age: f64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn age_type(mut self, age_type: AgeType) -> Self {
        self.age_type = Some(age_type);
        self
    }

    pub fn taxon(mut self, taxon: impl Into<String>) -> Self {
        self.taxon = Some(taxon.into());
        self
    }

    pub fn percentage(mut self, percentage: f32) -> Self {
        self.percentage = Some(percentage);
        self
    }

    pub fn build(self) -> Result<PollenRecord> {
        let record = PollenRecord {
            site_name: self
                .site_name
                .ok_or_else(|| PollenError::MissingData("site_name".to_string()))?,
            latitude: self
                .latitude
                .ok_or_else(|| PollenError::MissingData("latitude".to_string()))?,
            longitude: self
                .longitude
                .ok_or_else(|| PollenError::MissingData("longitude".to_string()))?,
            age: self
                .age
                .ok_or_else(|| PollenError::MissingData("age".to_string()))?,
            age_type: self
                .age_type
                .unwrap_or_else(|| AgeType::Other("unknown".to_string())),
            taxon: self
                .taxon
                .ok_or_else(|| PollenError::MissingData("taxon".to_string()))?,
            percentage: self
                .percentage
                .ok_or_else(|| PollenError::MissingData("percentage".to_string()))?,
        };

        record.validate_integrity()?;
        Ok(record)
    }
}
