use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pollen-mapper")]
#[command(about = "Fossil pollen occurrence processor and interactive map generator")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an interactive map document from a dataset file or directory
    Render {
        #[arg(short, long, help = "Input dataset file or directory")]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Output HTML path [default: output/pollen-map-{YYMMDD}.html]"
        )]
        output: Option<PathBuf>,

        #[arg(long, help = "Settings file (TOML) with map defaults")]
        config: Option<PathBuf>,

        #[arg(long, help = "Map center latitude")]
        center_lat: Option<f64>,

        #[arg(long, help = "Map center longitude")]
        center_lon: Option<f64>,

        #[arg(long, help = "Initial zoom level")]
        zoom: Option<u8>,

        #[arg(long, help = "Tile layer URL template")]
        tile_url: Option<String>,

        #[arg(long, help = "Tile layer attribution (HTML)")]
        attribution: Option<String>,

        #[arg(long, help = "Initial slider position, years before present")]
        time: Option<f64>,

        #[arg(long, help = "Initially selected taxon")]
        taxon: Option<String>,

        #[arg(long, help = "Age window half-width in years")]
        window: Option<f64>,

        #[arg(long, default_value = "false", help = "Disable site marker clustering")]
        no_cluster: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Select records matching a time window and taxon
    Query {
        #[arg(short, long, help = "Input dataset file or directory")]
        input: PathBuf,

        #[arg(short, long, help = "Time before present, years")]
        time: f64,

        #[arg(long, help = "Taxon name (exact match)")]
        taxon: String,

        #[arg(long, help = "Age window half-width in years")]
        window: Option<f64>,

        #[arg(long, default_value = "table", help = "Output format: table or json")]
        format: String,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Check dataset quality without producing output
    Validate {
        #[arg(short, long, help = "Input dataset file or directory")]
        input: PathBuf,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Display dataset statistics, or details of an exported Parquet file
    Info {
        #[arg(short, long, help = "Input dataset file or directory")]
        input: Option<PathBuf>,

        #[arg(short, long, help = "Previously exported Parquet file")]
        file: Option<PathBuf>,

        #[arg(short, long, default_value = "10")]
        sample: usize,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Export records to a Parquet file, optionally pre-filtered
    Export {
        #[arg(short, long, help = "Input dataset file or directory")]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Output Parquet path [default: output/pollen-records-{YYMMDD}.parquet]"
        )]
        output: Option<PathBuf>,

        #[arg(short, long, default_value = "snappy")]
        compression: String,

        #[arg(long, help = "Pre-filter: time before present, years")]
        time: Option<f64>,

        #[arg(long, help = "Pre-filter: taxon name")]
        taxon: Option<String>,

        #[arg(long, help = "Age window half-width in years")]
        window: Option<f64>,

        #[arg(long, default_value = "1000")]
        chunk_size: usize,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },
}
