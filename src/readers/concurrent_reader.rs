use crate::error::{PollenError, Result};
use crate::models::PollenDataset;
use crate::processors::DatasetMerger;
use crate::readers::dataset_reader::{DatasetReader, LoadReport};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

const DATASET_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

/// Loads every delimited dataset file in a directory, parsing files in
/// parallel and merging the results into one table.
pub struct ConcurrentDatasetReader {
    max_workers: usize,
}

impl ConcurrentDatasetReader {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub async fn read_directory(&self, dir: &Path) -> Result<(PollenDataset, LoadReport)> {
        let files = Self::find_dataset_files(dir)?;

        if files.is_empty() {
            return Err(PollenError::MissingData(format!(
                "No dataset files (.csv/.tsv/.txt) found in {}",
                dir.display()
            )));
        }

        info!(files = files.len(), "loading dataset directory");

        let max_workers = self.max_workers;
        let outcome = tokio::task::spawn_blocking(move || {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(max_workers)
                .build()
                .map_err(|e| PollenError::Config(format!("Worker pool error: {}", e)))?;

            pool.install(|| {
                files
                    .par_iter()
                    .map(|path| {
                        let reader = DatasetReader::new();
                        reader.read_dataset(path)
                    })
                    .collect::<Result<Vec<_>>>()
            })
        })
        .await??;

        let mut report = LoadReport::default();
        let mut tables = Vec::with_capacity(outcome.len());
        for (dataset, file_report) in outcome {
            report.merge(file_report);
            tables.push(dataset);
        }

        let merger = DatasetMerger::new();
        let merged = merger.merge(tables);

        if merged.duplicates_removed > 0 {
            info!(
                duplicates = merged.duplicates_removed,
                "removed duplicate rows while merging"
            );
        }

        Ok((merged.dataset, report))
    }

    fn find_dataset_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| DATASET_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false);

            if matches {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, rows: &[&str]) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        writeln!(file, "site,lat,long,age,ageboundtype,taxon,pct").unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
    }

    #[tokio::test]
    async fn test_read_directory_merges_files() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "a.csv",
            &["Devils Lake,43.42,-89.73,100,Calendar years BP,Pinus,20.5"],
        );
        write_file(
            dir.path(),
            "b.csv",
            &[
                "Wolsfeld Lake,45.0,-93.5,1200,Calendar years BP,Pinus,5.0",
                // exact duplicate of the row in a.csv
                "Devils Lake,43.42,-89.73,100,Calendar years BP,Pinus,20.5",
            ],
        );

        let reader = ConcurrentDatasetReader::new(2);
        let (dataset, report) = reader.read_directory(dir.path()).await.unwrap();

        assert_eq!(report.parsed, 3);
        assert_eq!(dataset.len(), 2); // duplicate removed by the merger
        assert_eq!(dataset.site_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let reader = ConcurrentDatasetReader::new(2);

        let result = reader.read_directory(dir.path()).await;
        assert!(matches!(result, Err(PollenError::MissingData(_))));
    }

    #[tokio::test]
    async fn test_non_dataset_files_ignored() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "a.csv",
            &["Devils Lake,43.42,-89.73,100,Calendar years BP,Pinus,20.5"],
        );
        std::fs::write(dir.path().join("notes.md"), "not a dataset").unwrap();

        let reader = ConcurrentDatasetReader::new(2);
        let (dataset, _) = reader.read_directory(dir.path()).await.unwrap();

        assert_eq!(dataset.len(), 1);
    }
}
