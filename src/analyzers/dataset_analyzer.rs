use crate::error::{PollenError, Result};
use crate::models::PollenDataset;
use crate::utils::coordinates::haversine_distance;

#[derive(Debug)]
pub struct DatasetStatistics {
    pub total_records: usize,
    pub unique_sites: usize,
    pub unique_taxa: usize,
    pub age_range: (f64, f64),
    pub percentage_stats: PercentageStats,
    pub geographic_bounds: GeographicBounds,
    /// Greatest great-circle separation between any two sites, km
    pub max_site_separation_km: f64,
}

#[derive(Debug)]
pub struct PercentageStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

#[derive(Debug)]
pub struct GeographicBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl DatasetStatistics {
    pub fn detailed_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Dataset Statistics\n");
        summary.push_str("==================\n");
        summary.push_str(&format!("Records:       {}\n", self.total_records));
        summary.push_str(&format!("Sites:         {}\n", self.unique_sites));
        summary.push_str(&format!("Taxa:          {}\n", self.unique_taxa));
        summary.push_str(&format!(
            "Age span:      {:.0} - {:.0} yr BP\n",
            self.age_range.0, self.age_range.1
        ));
        summary.push_str(&format!(
            "Abundance:     {:.1}% min, {:.1}% mean, {:.1}% max\n",
            self.percentage_stats.min, self.percentage_stats.mean, self.percentage_stats.max
        ));
        summary.push_str(&format!(
            "Extent:        lat [{:.2}, {:.2}], lon [{:.2}, {:.2}]\n",
            self.geographic_bounds.min_lat,
            self.geographic_bounds.max_lat,
            self.geographic_bounds.min_lon,
            self.geographic_bounds.max_lon
        ));
        summary.push_str(&format!(
            "Site spread:   {:.0} km\n",
            self.max_site_separation_km
        ));

        summary
    }
}

pub struct DatasetAnalyzer;

impl DatasetAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, dataset: &PollenDataset) -> Result<DatasetStatistics> {
        let records = dataset.records();

        if records.is_empty() {
            return Err(PollenError::Config(
                "No records to analyze".to_string(),
            ));
        }

        let age_range = dataset
            .age_span()
            .ok_or_else(|| PollenError::MissingData("age span".to_string()))?;

        let mut pct_min = f32::INFINITY;
        let mut pct_max = f32::NEG_INFINITY;
        let mut pct_sum = 0.0f64;

        let mut min_lat = records[0].latitude;
        let mut max_lat = records[0].latitude;
        let mut min_lon = records[0].longitude;
        let mut max_lon = records[0].longitude;

        for record in records {
            if record.percentage.is_finite() {
                pct_min = pct_min.min(record.percentage);
                pct_max = pct_max.max(record.percentage);
            }
            pct_sum += record.percentage as f64;

            min_lat = min_lat.min(record.latitude);
            max_lat = max_lat.max(record.latitude);
            min_lon = min_lon.min(record.longitude);
            max_lon = max_lon.max(record.longitude);
        }

        // Sites are few relative to records, so the pairwise scan is cheap
        let sites = dataset.sites();
        let mut max_separation = 0.0f64;
        for (i, a) in sites.iter().enumerate() {
            for b in sites.iter().skip(i + 1) {
                let distance =
                    haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude);
                max_separation = max_separation.max(distance);
            }
        }

        Ok(DatasetStatistics {
            total_records: records.len(),
            unique_sites: sites.len(),
            unique_taxa: dataset.taxa().len(),
            age_range,
            percentage_stats: PercentageStats {
                min: pct_min,
                max: pct_max,
                mean: (pct_sum / records.len() as f64) as f32,
            },
            geographic_bounds: GeographicBounds {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            },
            max_site_separation_km: max_separation,
        })
    }
}

impl Default for DatasetAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
