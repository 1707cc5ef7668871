pub mod age;
pub mod dataset;
pub mod record;

pub use age::AgeType;
pub use dataset::{PollenDataset, Site};
pub use record::{PollenRecord, PollenRecordBuilder};
