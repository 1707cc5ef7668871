use crate::error::Result;
use crate::models::PollenDataset;
use crate::utils::constants::{
    AGE_WINDOW_HALF_WIDTH, DEFAULT_MAP_CENTER_LAT, DEFAULT_MAP_CENTER_LON, DEFAULT_MAP_ZOOM,
    DEFAULT_TILE_ATTRIBUTION, DEFAULT_TILE_URL, LEAFLET_CSS_URL, LEAFLET_JS_URL,
    MARKERCLUSTER_CSS_URL, MARKERCLUSTER_DEFAULT_CSS_URL, MARKERCLUSTER_JS_URL,
};
use serde::Serialize;
use std::path::Path;

const TIME_SLIDER_STEP: f64 = 10.0;

/// View and behavior settings for a generated map document
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub title: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    /// Initial slider position, years BP; defaults to the youngest age present
    pub initial_time: Option<f64>,
    /// Initially selected taxon; defaults to the first taxon in the dataset
    pub initial_taxon: Option<String>,
    pub window_half_width: f64,
    pub cluster_sites: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            title: "Fossil pollen records".to_string(),
            center_lat: DEFAULT_MAP_CENTER_LAT,
            center_lon: DEFAULT_MAP_CENTER_LON,
            zoom: DEFAULT_MAP_ZOOM,
            tile_url: DEFAULT_TILE_URL.to_string(),
            attribution: DEFAULT_TILE_ATTRIBUTION.to_string(),
            initial_time: None,
            initial_taxon: None,
            window_half_width: AGE_WINDOW_HALF_WIDTH,
            cluster_sites: true,
        }
    }
}

/// Rows embedded in the document for the browser-side filter
#[derive(Serialize)]
struct MarkerRecord<'a> {
    site: &'a str,
    lat: f64,
    lon: f64,
    age: f64,
    taxon: &'a str,
    pct: f32,
}

#[derive(Serialize)]
struct SiteMarker<'a> {
    name: &'a str,
    lat: f64,
    lon: f64,
}

/// Generates a self-contained interactive map document. All rendering,
/// tile fetching, clustering and input reactivity belong to Leaflet and
/// its marker-cluster plugin, loaded from a CDN; the embedded script only
/// restates the closed-window/exact-taxon selection over the embedded rows.
pub struct MapWriter {
    options: MapOptions,
}

impl MapWriter {
    pub fn new() -> Self {
        Self {
            options: MapOptions::default(),
        }
    }

    pub fn with_options(options: MapOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn write_document(&self, dataset: &PollenDataset, path: &Path) -> Result<()> {
        let document = self.render_document(dataset)?;
        std::fs::write(path, document)?;
        Ok(())
    }

    pub fn render_document(&self, dataset: &PollenDataset) -> Result<String> {
        let records: Vec<MarkerRecord> = dataset
            .records()
            .iter()
            .map(|r| MarkerRecord {
                site: &r.site_name,
                lat: r.latitude,
                lon: r.longitude,
                age: r.age,
                taxon: &r.taxon,
                pct: r.percentage,
            })
            .collect();

        let sites = dataset.sites();
        let site_markers: Vec<SiteMarker> = sites
            .iter()
            .map(|s| SiteMarker {
                name: &s.name,
                lat: s.latitude,
                lon: s.longitude,
            })
            .collect();

        let (time_min, time_max) = match dataset.age_span() {
            Some((min, max)) if max > min => (min.floor(), max.ceil()),
            Some((min, _)) => (min.floor(), min.floor() + TIME_SLIDER_STEP),
            None => (0.0, 15_000.0),
        };

        let initial_time = self
            .options
            .initial_time
            .unwrap_or(time_min)
            .clamp(time_min, time_max);

        let taxa = dataset.taxa();
        let initial_taxon = self
            .options
            .initial_taxon
            .as_ref()
            .filter(|t| taxa.iter().any(|candidate| candidate == *t))
            .cloned()
            .or_else(|| taxa.first().cloned())
            .unwrap_or_default();

        let taxon_options: String = taxa
            .iter()
            .map(|taxon| {
                let escaped = html_escape(taxon);
                if *taxon == initial_taxon {
                    format!("<option value=\"{}\" selected>{}</option>", escaped, escaped)
                } else {
                    format!("<option value=\"{}\">{}</option>", escaped, escaped)
                }
            })
            .collect();

        let (cluster_css, cluster_js, site_layer) = if self.options.cluster_sites {
            (
                format!(
                    "<link rel=\"stylesheet\" href=\"{}\">\n<link rel=\"stylesheet\" href=\"{}\">",
                    MARKERCLUSTER_CSS_URL, MARKERCLUSTER_DEFAULT_CSS_URL
                ),
                format!("<script src=\"{}\"></script>", MARKERCLUSTER_JS_URL),
                "L.markerClusterGroup()".to_string(),
            )
        } else {
            (String::new(), String::new(), "L.layerGroup()".to_string())
        };

        let document = DOCUMENT_TEMPLATE
            .replace("__TITLE__", &html_escape(&self.options.title))
            .replace("__LEAFLET_CSS__", LEAFLET_CSS_URL)
            .replace("__LEAFLET_JS__", LEAFLET_JS_URL)
            .replace("__CLUSTER_CSS__", &cluster_css)
            .replace("__CLUSTER_JS__", &cluster_js)
            .replace("__SITE_LAYER__", &site_layer)
            .replace("__RECORDS_JSON__", &script_json(&records)?)
            .replace("__SITES_JSON__", &script_json(&site_markers)?)
            .replace("__HALF_WIDTH__", &format_number(self.options.window_half_width))
            .replace("__CENTER_LAT__", &format_number(self.options.center_lat))
            .replace("__CENTER_LON__", &format_number(self.options.center_lon))
            .replace("__ZOOM__", &self.options.zoom.to_string())
            .replace("__TILE_URL__", &js_single_quote_escape(&self.options.tile_url))
            .replace(
                "__ATTRIBUTION__",
                &js_single_quote_escape(&self.options.attribution),
            )
            .replace("__TIME_MIN__", &format_number(time_min))
            .replace("__TIME_MAX__", &format_number(time_max))
            .replace("__TIME_STEP__", &format_number(TIME_SLIDER_STEP))
            .replace("__TIME_INITIAL__", &format_number(initial_time))
            .replace("__TAXON_OPTIONS__", &taxon_options);

        Ok(document)
    }
}

impl Default for MapWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize for embedding inside a <script> block. "</" must not appear
/// verbatim or the browser would end the script element early.
fn script_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn js_single_quote_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

const DOCUMENT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<link rel="stylesheet" href="__LEAFLET_CSS__">
__CLUSTER_CSS__
<style>
  html, body { height: 100%; margin: 0; font-family: sans-serif; }
  #map { height: calc(100% - 90px); }
  #controls { height: 90px; box-sizing: border-box; padding: 10px 16px; display: flex; gap: 24px; align-items: center; }
  #controls label { display: block; font-size: 13px; margin-bottom: 4px; }
  #time { width: 320px; }
  #readout { font-size: 13px; color: #444; }
</style>
</head>
<body>
<div id="controls">
  <div>
    <label for="time">Years before present: <span id="time-value"></span></label>
    <input type="range" id="time" min="__TIME_MIN__" max="__TIME_MAX__" step="__TIME_STEP__" value="__TIME_INITIAL__">
  </div>
  <div>
    <label for="taxon">Taxon</label>
    <select id="taxon">__TAXON_OPTIONS__</select>
  </div>
  <div id="readout"></div>
</div>
<div id="map"></div>
<script src="__LEAFLET_JS__"></script>
__CLUSTER_JS__
<script>
const RECORDS = __RECORDS_JSON__;
const SITES = __SITES_JSON__;
const HALF_WIDTH = __HALF_WIDTH__;

const map = L.map('map').setView([__CENTER_LAT__, __CENTER_LON__], __ZOOM__);
L.tileLayer('__TILE_URL__', { attribution: '__ATTRIBUTION__' }).addTo(map);

const siteLayer = __SITE_LAYER__;
for (const site of SITES) {
  siteLayer.addLayer(L.marker([site.lat, site.lon]).bindPopup(site.name));
}
map.addLayer(siteLayer);

const overlay = L.layerGroup().addTo(map);
const slider = document.getElementById('time');
const select = document.getElementById('taxon');
const timeValue = document.getElementById('time-value');
const readout = document.getElementById('readout');

// Same selection rule as the command-line query: closed age window,
// exact taxon match.
function selectRecords(time, taxon) {
  return RECORDS.filter(r => Math.abs(r.age - time) <= HALF_WIDTH && r.taxon === taxon);
}

function redraw() {
  const time = Number(slider.value);
  timeValue.textContent = time;
  overlay.clearLayers();
  const selected = selectRecords(time, select.value);
  for (const r of selected) {
    L.circleMarker([r.lat, r.lon], {
      radius: 8,
      stroke: false,
      fillColor: '#2b8cbe',
      fillOpacity: r.pct / 100
    }).bindPopup(r.site + '<br>' + r.taxon + ': ' + r.pct + '%<br>' + r.age + ' yr BP')
      .addTo(overlay);
  }
  readout.textContent = selected.length + ' records in window';
}

slider.addEventListener('input', redraw);
select.addEventListener('change', redraw);
redraw();
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgeType, PollenRecord};
    use tempfile::TempDir;

    fn record(site: &str, age: f64, taxon: &str, pct: f32) -> PollenRecord {
        PollenRecord::new(
            site.to_string(),
            43.42,
            -89.73,
            age,
            AgeType::CalendarYearsBp,
            taxon.to_string(),
            pct,
        )
    }

    fn sample_dataset() -> PollenDataset {
        PollenDataset::from_records(vec![
            record("Devils Lake", 100.0, "Pinus", 20.0),
            record("Devils Lake", 600.0, "Quercus", 35.0),
        ])
    }

    #[test]
    fn test_render_embeds_data_and_libraries() {
        let writer = MapWriter::new();
        let document = writer.render_document(&sample_dataset()).unwrap();

        assert!(document.contains(LEAFLET_JS_URL));
        assert!(document.contains(MARKERCLUSTER_JS_URL));
        assert!(document.contains("\"site\":\"Devils Lake\""));
        assert!(document.contains("const HALF_WIDTH = 250;"));
        assert!(document.contains("<option value=\"Pinus\" selected>Pinus</option>"));
        assert!(document.contains("<option value=\"Quercus\">Quercus</option>"));
    }

    #[test]
    fn test_slider_bounds_follow_age_span() {
        let writer = MapWriter::new();
        let document = writer.render_document(&sample_dataset()).unwrap();

        assert!(document.contains("min=\"100\""));
        assert!(document.contains("max=\"600\""));
        assert!(document.contains("value=\"100\""));
    }

    #[test]
    fn test_initial_selection_options() {
        let options = MapOptions {
            initial_time: Some(550.0),
            initial_taxon: Some("Quercus".to_string()),
            ..MapOptions::default()
        };

        let writer = MapWriter::with_options(options);
        let document = writer.render_document(&sample_dataset()).unwrap();

        assert!(document.contains("value=\"550\""));
        assert!(document.contains("<option value=\"Quercus\" selected>"));
    }

    #[test]
    fn test_unknown_initial_taxon_falls_back() {
        let options = MapOptions {
            initial_taxon: Some("Tsuga".to_string()),
            ..MapOptions::default()
        };

        let writer = MapWriter::with_options(options);
        let document = writer.render_document(&sample_dataset()).unwrap();

        assert!(document.contains("<option value=\"Pinus\" selected>"));
    }

    #[test]
    fn test_no_cluster_option() {
        let options = MapOptions {
            cluster_sites: false,
            ..MapOptions::default()
        };

        let writer = MapWriter::with_options(options);
        let document = writer.render_document(&sample_dataset()).unwrap();

        assert!(!document.contains("markercluster"));
        assert!(document.contains("const siteLayer = L.layerGroup();"));
    }

    #[test]
    fn test_empty_dataset_still_renders() {
        let writer = MapWriter::new();
        let document = writer.render_document(&PollenDataset::default()).unwrap();

        assert!(document.contains("const RECORDS = [];"));
        assert!(document.contains("min=\"0\""));
        assert!(document.contains("max=\"15000\""));
    }

    #[test]
    fn test_title_is_escaped() {
        let options = MapOptions {
            title: "Pollen <at> Devils Lake".to_string(),
            ..MapOptions::default()
        };

        let writer = MapWriter::with_options(options);
        let document = writer.render_document(&sample_dataset()).unwrap();

        assert!(document.contains("<title>Pollen &lt;at&gt; Devils Lake</title>"));
    }

    #[test]
    fn test_write_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("map.html");

        let writer = MapWriter::new();
        writer.write_document(&sample_dataset(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
    }
}
