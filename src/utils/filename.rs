use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default map filename with format: pollen-map-{YYMMDD}.html
pub fn generate_default_map_filename() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!("pollen-map-{:02}{:02}{:02}.html", year, month, day);
    PathBuf::from("output").join(filename)
}

/// Generate default Parquet filename with format: pollen-records-{YYMMDD}.parquet
pub fn generate_default_parquet_filename() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100;
    let month = now.month();
    let day = now.day();

    let filename = format!("pollen-records-{:02}{:02}{:02}.parquet", year, month, day);
    PathBuf::from("output").join(filename)
}
