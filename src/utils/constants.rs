/// Age filter window half-width (years)
pub const AGE_WINDOW_HALF_WIDTH: f64 = 250.0;

/// Map view defaults (centered on the North American pollen record)
pub const DEFAULT_MAP_CENTER_LAT: f64 = 45.0;
pub const DEFAULT_MAP_CENTER_LON: f64 = -95.0;
pub const DEFAULT_MAP_ZOOM: u8 = 3;

/// Tile provider defaults
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Browser-side library versions pinned so generated documents stay reproducible
pub const LEAFLET_CSS_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
pub const LEAFLET_JS_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
pub const MARKERCLUSTER_CSS_URL: &str =
    "https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css";
pub const MARKERCLUSTER_DEFAULT_CSS_URL: &str =
    "https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css";
pub const MARKERCLUSTER_JS_URL: &str =
    "https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js";

/// Abundance constraints (percentage of the pollen sum)
pub const MIN_VALID_PERCENTAGE: f32 = 0.0;
pub const MAX_VALID_PERCENTAGE: f32 = 100.0;

/// Age plausibility bounds, years before present. Negative ages are samples
/// younger than the 1950 datum; the upper bound covers the Eemian.
pub const MIN_PLAUSIBLE_AGE: f64 = -100.0;
pub const MAX_PLAUSIBLE_AGE: f64 = 150_000.0;

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
