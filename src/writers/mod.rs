pub mod map_writer;
pub mod parquet_writer;

pub use map_writer::{MapOptions, MapWriter};
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
