use serde::{Deserialize, Serialize};

/// Age convention attached to a pollen observation. Neotoma-style exports
/// label each row with the chronology its age was interpolated from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeType {
    CalendarYearsBp,
    RadiocarbonYearsBp,
    VarveYearsBp,
    Other(String),
}

impl AgeType {
    /// Parse the free-text label carried in the dataset. Labels vary between
    /// exports, so matching is lenient; unrecognized labels are preserved
    /// rather than dropped.
    pub fn parse_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();

        if normalized.is_empty() {
            return AgeType::Other("unknown".to_string());
        }

        if normalized.contains("calendar") || normalized.contains("cal yr") {
            AgeType::CalendarYearsBp
        } else if normalized.contains("radiocarbon")
            || normalized.contains("14c")
            || normalized.contains("c14")
        {
            AgeType::RadiocarbonYearsBp
        } else if normalized.contains("varve") {
            AgeType::VarveYearsBp
        } else {
            AgeType::Other(label.trim().to_string())
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            AgeType::CalendarYearsBp => "Calendar years BP",
            AgeType::RadiocarbonYearsBp => "Radiocarbon years BP",
            AgeType::VarveYearsBp => "Varve years BP",
            AgeType::Other(label) => label,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self, AgeType::CalendarYearsBp | AgeType::VarveYearsBp)
    }
}

impl std::fmt::Display for AgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
