pub mod concurrent_reader;
pub mod dataset_reader;

pub use concurrent_reader::ConcurrentDatasetReader;
pub use dataset_reader::{DatasetReader, LoadReport};
