pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::haversine_distance;
pub use filename::{generate_default_map_filename, generate_default_parquet_filename};
pub use progress::ProgressReporter;
