use crate::error::Result;
use crate::utils::constants::{
    AGE_WINDOW_HALF_WIDTH, DEFAULT_MAP_CENTER_LAT, DEFAULT_MAP_CENTER_LON, DEFAULT_MAP_ZOOM,
    DEFAULT_TILE_ATTRIBUTION, DEFAULT_TILE_URL,
};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Map defaults layered from an optional settings file and `POLLEN_*`
/// environment variables. Command-line flags override these per run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapDefaults {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub window_half_width: f64,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            center_lat: DEFAULT_MAP_CENTER_LAT,
            center_lon: DEFAULT_MAP_CENTER_LON,
            zoom: DEFAULT_MAP_ZOOM,
            tile_url: DEFAULT_TILE_URL.to_string(),
            attribution: DEFAULT_TILE_ATTRIBUTION.to_string(),
            window_half_width: AGE_WINDOW_HALF_WIDTH,
        }
    }
}

/// Load map defaults. With no explicit path, a `pollen-mapper.toml` in the
/// working directory is picked up when present.
pub fn load_map_defaults(path: Option<&Path>) -> Result<MapDefaults> {
    let mut builder = Config::builder();

    builder = match path {
        Some(path) => builder.add_source(File::from(path)),
        None => builder.add_source(File::with_name("pollen-mapper").required(false)),
    };

    builder = builder.add_source(Environment::with_prefix("POLLEN"));

    let settings = builder.build()?;
    Ok(settings.try_deserialize()?)
}
