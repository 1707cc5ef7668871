pub mod dataset_merger;
pub mod quality_checker;
pub mod record_filter;

pub use dataset_merger::{DatasetMerger, MergeOutcome};
pub use quality_checker::{
    QualityChecker, QualityReport, QualityViolation, SiteStatistics, ViolationType,
};
pub use record_filter::{FilterQuery, RecordFilter};
