use crate::error::{PollenError, Result};
use crate::models::{AgeType, PollenRecord};
use crate::utils::constants::DEFAULT_ROW_GROUP_SIZE;
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4,
            "zstd" => Compression::ZSTD(parquet::basic::ZstdLevel::default()),
            "none" => Compression::UNCOMPRESSED,
            _ => {
                return Err(PollenError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write pollen records to a Parquet file
    pub fn write_records(&self, records: &[PollenRecord], path: &Path) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let schema = self.create_schema();
        let batch = self.records_to_batch(records, schema.clone())?;

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        Ok(())
    }

    /// Write records in batches for memory efficiency
    pub fn write_records_batched(
        &self,
        records: &[PollenRecord],
        path: &Path,
        batch_size: usize,
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let schema = self.create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        for chunk in records.chunks(batch_size.max(1)) {
            let batch = self.records_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(())
    }

    /// Create Arrow schema for pollen observation data
    fn create_schema(&self) -> Arc<Schema> {
        let fields = vec![
            Field::new("site_name", DataType::Utf8, false),
            Field::new("latitude", DataType::Float64, false),
            Field::new("longitude", DataType::Float64, false),
            Field::new("age", DataType::Float64, false),
            Field::new("age_type", DataType::Utf8, false),
            Field::new("taxon", DataType::Utf8, false),
            Field::new("percentage", DataType::Float32, false),
        ];

        Arc::new(Schema::new(fields))
    }

    /// Convert records to an Arrow RecordBatch
    fn records_to_batch(
        &self,
        records: &[PollenRecord],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let site_names: Vec<String> = records.iter().map(|r| r.site_name.clone()).collect();
        let latitudes: Vec<f64> = records.iter().map(|r| r.latitude).collect();
        let longitudes: Vec<f64> = records.iter().map(|r| r.longitude).collect();
        let ages: Vec<f64> = records.iter().map(|r| r.age).collect();
        let age_types: Vec<String> = records
            .iter()
            .map(|r| r.age_type.display_name().to_string())
            .collect();
        let taxa: Vec<String> = records.iter().map(|r| r.taxon.clone()).collect();
        let percentages: Vec<f32> = records.iter().map(|r| r.percentage).collect();

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(site_names)),
                Arc::new(Float64Array::from(latitudes)),
                Arc::new(Float64Array::from(longitudes)),
                Arc::new(Float64Array::from(ages)),
                Arc::new(StringArray::from(age_types)),
                Arc::new(StringArray::from(taxa)),
                Arc::new(Float32Array::from(percentages)),
            ],
        )?;

        Ok(batch)
    }

    /// Read sample records back from a Parquet file
    pub fn read_sample_records(&self, path: &Path, limit: usize) -> Result<Vec<PollenRecord>> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        if limit == 0 {
            return Ok(Vec::new());
        }

        let file = File::open(path)?;
        let parquet_reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(limit.min(8192))
            .build()?;

        let mut records = Vec::new();
        let mut total_read = 0;

        for batch_result in parquet_reader {
            let batch = batch_result?;

            let site_names = downcast::<StringArray>(&batch, 0, "site_name")?;
            let latitudes = downcast::<Float64Array>(&batch, 1, "latitude")?;
            let longitudes = downcast::<Float64Array>(&batch, 2, "longitude")?;
            let ages = downcast::<Float64Array>(&batch, 3, "age")?;
            let age_types = downcast::<StringArray>(&batch, 4, "age_type")?;
            let taxa = downcast::<StringArray>(&batch, 5, "taxon")?;
            let percentages = downcast::<Float32Array>(&batch, 6, "percentage")?;

            let batch_records_to_read = batch.num_rows().min(limit - total_read);

            for i in 0..batch_records_to_read {
                records.push(PollenRecord::new(
                    site_names.value(i).to_string(),
                    latitudes.value(i),
                    longitudes.value(i),
                    ages.value(i),
                    AgeType::parse_label(age_types.value(i)),
                    taxa.value(i).to_string(),
                    percentages.value(i),
                ));
                total_read += 1;
            }

            if total_read >= limit {
                break;
            }
        }

        Ok(records)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let mut row_group_sizes = Vec::new();
        for i in 0..row_groups {
            let rg_metadata = metadata.row_group(i);
            row_group_sizes.push(rg_metadata.num_rows());
        }

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast<'a, T: 'static>(
    batch: &'a RecordBatch,
    column: usize,
    name: &str,
) -> Result<&'a T> {
    batch
        .column(column)
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| PollenError::Config(format!("Invalid {} column type", name)))
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Rows: {}\nRow groups: {}\nFile size: {} bytes\nCompression: {:?}",
            self.total_rows, self.row_groups, self.file_size, self.compression
        )
    }
}
