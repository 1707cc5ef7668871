use crate::analyzers::DatasetAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::load_map_defaults;
use crate::error::{PollenError, Result};
use crate::models::{PollenDataset, PollenRecord};
use crate::processors::{FilterQuery, QualityChecker, RecordFilter};
use crate::readers::{ConcurrentDatasetReader, DatasetReader, LoadReport};
use crate::utils::filename::{generate_default_map_filename, generate_default_parquet_filename};
use crate::utils::progress::ProgressReporter;
use crate::writers::{MapOptions, MapWriter, ParquetWriter};
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            input,
            output,
            config,
            center_lat,
            center_lon,
            zoom,
            tile_url,
            attribution,
            time,
            taxon,
            window,
            no_cluster,
            max_workers,
        } => {
            println!("Rendering pollen map...");
            println!("Input: {}", input.display());

            let progress = ProgressReporter::new_spinner("Loading dataset...", false);
            let (dataset, report) = load_dataset(&input, max_workers).await?;
            progress.finish_with_message(&format!(
                "Loaded {} records ({} dropped)",
                report.parsed, report.dropped
            ));

            let defaults = load_map_defaults(config.as_deref())?;

            let options = MapOptions {
                title: map_title(&input),
                center_lat: center_lat.unwrap_or(defaults.center_lat),
                center_lon: center_lon.unwrap_or(defaults.center_lon),
                zoom: zoom.unwrap_or(defaults.zoom),
                tile_url: tile_url.unwrap_or(defaults.tile_url),
                attribution: attribution.unwrap_or(defaults.attribution),
                initial_time: time,
                initial_taxon: taxon,
                window_half_width: window.unwrap_or(defaults.window_half_width),
                cluster_sites: !no_cluster,
            };

            let output_file = output.unwrap_or_else(generate_default_map_filename);
            if let Some(parent) = output_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let writer = MapWriter::with_options(options);
            writer.write_document(&dataset, &output_file)?;

            println!(
                "Map covers {} records, {} sites, {} taxa",
                dataset.len(),
                dataset.site_count(),
                dataset.taxa().len()
            );
            println!("Map written to {}", output_file.display());
        }

        Commands::Query {
            input,
            time,
            taxon,
            window,
            format,
            max_workers,
        } => {
            let (dataset, _report) = load_dataset(&input, max_workers).await?;

            let filter = match window {
                Some(half_width) => RecordFilter::with_half_width(half_width),
                None => RecordFilter::new(),
            };
            let query = FilterQuery::new(time, taxon);
            let matches = filter.apply(dataset.records(), &query);

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&matches)?);
                }
                "table" => {
                    println!(
                        "{} records match '{}' within {} years of {} yr BP",
                        matches.len(),
                        query.taxon,
                        filter.half_width(),
                        query.time
                    );
                    for (i, record) in matches.iter().enumerate() {
                        println!(
                            "{}. {} ({:.2}, {:.2}): {} {:.1}% at {:.0} yr BP",
                            i + 1,
                            record.site_name,
                            record.latitude,
                            record.longitude,
                            record.taxon,
                            record.percentage,
                            record.age
                        );
                    }
                }
                other => {
                    return Err(PollenError::Config(format!(
                        "Unsupported format: {}",
                        other
                    )))
                }
            }
        }

        Commands::Validate { input, max_workers } => {
            println!("Validating pollen dataset...");
            println!("Input: {}", input.display());

            let progress = ProgressReporter::new_spinner("Checking data...", false);
            let (dataset, report) = load_dataset(&input, max_workers).await?;

            let checker = QualityChecker::new();
            let quality_report = checker.check(dataset.records());
            progress.finish_with_message("Validation complete");

            println!(
                "\nLoaded {} records, dropped {} malformed rows",
                report.parsed, report.dropped
            );
            println!("\n{}", checker.generate_summary(&quality_report));

            if quality_report.has_violations() {
                println!(
                    "⚠️  Found {} quality issues",
                    quality_report.violations.len()
                );
            } else {
                println!("✅ All records passed quality checks");
            }
        }

        Commands::Info {
            input,
            file,
            sample,
            max_workers,
        } => {
            if let Some(file) = file {
                println!("Analyzing Parquet file: {}", file.display());

                let writer = ParquetWriter::new();
                let file_info = writer.get_file_info(&file)?;

                println!("\nFile Details:");
                println!("{}", file_info.summary());

                if sample > 0 {
                    println!("\nSample Records (showing up to {} records):", sample);
                    match writer.read_sample_records(&file, sample) {
                        Ok(records) => print_record_sample(&records),
                        Err(e) => println!("Error reading sample data: {}", e),
                    }
                }
            } else if let Some(input) = input {
                println!("Analyzing dataset: {}", input.display());

                let (dataset, report) = load_dataset(&input, max_workers).await?;
                println!(
                    "Loaded {} records ({} dropped)",
                    report.parsed, report.dropped
                );

                let analyzer = DatasetAnalyzer::new();
                let stats = analyzer.analyze(&dataset)?;
                println!("\n{}", stats.detailed_summary());

                if sample > 0 {
                    println!("Sample Records (showing up to {} records):", sample);
                    print_record_sample(&dataset.records()[..dataset.len().min(sample)]);
                }
            } else {
                return Err(PollenError::Config(
                    "Provide --input for a dataset or --file for a Parquet export".to_string(),
                ));
            }
        }

        Commands::Export {
            input,
            output,
            compression,
            time,
            taxon,
            window,
            chunk_size,
            max_workers,
        } => {
            println!("Exporting pollen records...");
            println!("Input: {}", input.display());

            let progress = ProgressReporter::new_spinner("Loading dataset...", false);
            let (dataset, report) = load_dataset(&input, max_workers).await?;
            progress.finish_with_message(&format!(
                "Loaded {} records ({} dropped)",
                report.parsed, report.dropped
            ));

            let records: Vec<PollenRecord> = match (time, taxon) {
                (Some(time), Some(taxon)) => {
                    let filter = match window {
                        Some(half_width) => RecordFilter::with_half_width(half_width),
                        None => RecordFilter::new(),
                    };
                    let query = FilterQuery::new(time, taxon);
                    filter
                        .apply(dataset.records(), &query)
                        .into_iter()
                        .cloned()
                        .collect()
                }
                (None, None) => dataset.into_records(),
                _ => {
                    return Err(PollenError::Config(
                        "--time and --taxon must be used together".to_string(),
                    ))
                }
            };

            if records.is_empty() {
                println!("No records to write");
                return Ok(());
            }

            let output_file = output.unwrap_or_else(generate_default_parquet_filename);
            if let Some(parent) = output_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            println!("Writing {} records to Parquet file...", records.len());
            let writer = ParquetWriter::new().with_compression(&compression)?;
            writer.write_records_batched(&records, &output_file, chunk_size)?;

            let file_info = writer.get_file_info(&output_file)?;
            println!("\n{}", file_info.summary());
            println!("Export complete: {}", output_file.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "pollen_mapper=debug"
    } else {
        "pollen_mapper=warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Load from a single file, or merge every dataset file in a directory
async fn load_dataset(input: &Path, max_workers: usize) -> Result<(PollenDataset, LoadReport)> {
    if input.is_dir() {
        let reader = ConcurrentDatasetReader::new(max_workers);
        reader.read_directory(input).await
    } else {
        let reader = DatasetReader::new();
        reader.read_dataset(input)
    }
}

fn map_title(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| format!("Fossil pollen records: {}", stem))
        .unwrap_or_else(|| "Fossil pollen records".to_string())
}

fn print_record_sample(records: &[PollenRecord]) {
    for (i, record) in records.iter().enumerate() {
        println!(
            "{}. {} ({:.2}, {:.2}): {} {:.1}% at {:.0} yr BP ({})",
            i + 1,
            record.site_name,
            record.latitude,
            record.longitude,
            record.taxon,
            record.percentage,
            record.age,
            record.age_type
        );
    }
}
