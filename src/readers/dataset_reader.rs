use crate::error::{PollenError, Result};
use crate::models::{AgeType, PollenDataset, PollenRecord};
use crate::utils::coordinates::parse_decimal_degrees;
use csv::{ReaderBuilder, StringRecord, Trim};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Outcome counters for a single load. Malformed rows are dropped silently
/// at parse time; the counts are the only trace they leave.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadReport {
    pub parsed: usize,
    pub dropped: usize,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.parsed + self.dropped
    }

    pub fn merge(&mut self, other: LoadReport) {
        self.parsed += other.parsed;
        self.dropped += other.dropped;
    }
}

/// Column positions resolved from the header row
struct ColumnMap {
    site: usize,
    latitude: usize,
    longitude: usize,
    age: usize,
    age_type: Option<usize>,
    taxon: usize,
    percentage: usize,
}

pub struct DatasetReader {
    delimiter: Option<u8>,
    use_mmap: bool,
}

impl DatasetReader {
    pub fn new() -> Self {
        Self {
            delimiter: None,
            use_mmap: false,
        }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
            use_mmap: false,
        }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self {
            delimiter: None,
            use_mmap,
        }
    }

    /// Read a delimited pollen dataset into memory
    pub fn read_dataset(&self, path: &Path) -> Result<(PollenDataset, LoadReport)> {
        let text = if self.use_mmap {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            decode_text(&mmap)
        } else {
            decode_text(&std::fs::read(path)?)
        };

        let delimiter = self
            .delimiter
            .unwrap_or_else(|| infer_delimiter(path, &text));

        self.parse_text(&text, delimiter)
    }

    fn parse_text(&self, text: &str, delimiter: u8) -> Result<(PollenDataset, LoadReport)> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let columns = Self::resolve_columns(reader.headers()?)?;

        let mut records = Vec::new();
        let mut report = LoadReport::default();

        for (index, row_result) in reader.records().enumerate() {
            let row = match row_result {
                Ok(row) => row,
                Err(e) => {
                    debug!(row = index + 2, error = %e, "dropping unreadable row");
                    report.dropped += 1;
                    continue;
                }
            };

            // Blank separator lines are not data rows
            if row.iter().all(|field| field.is_empty()) {
                continue;
            }

            match Self::parse_row(&row, &columns) {
                Some(record) => {
                    records.push(record);
                    report.parsed += 1;
                }
                None => {
                    debug!(row = index + 2, "dropping row with missing or uncoercible values");
                    report.dropped += 1;
                }
            }
        }

        Ok((PollenDataset::from_records(records), report))
    }

    /// Match headers leniently: exports disagree on case, underscores and
    /// abbreviations for the same columns.
    fn resolve_columns(headers: &StringRecord) -> Result<ColumnMap> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();

        let find = |aliases: &[&str]| -> Option<usize> {
            normalized
                .iter()
                .position(|h| aliases.contains(&h.as_str()))
        };

        let require = |aliases: &[&str], name: &str| -> Result<usize> {
            find(aliases).ok_or_else(|| PollenError::MissingColumn(name.to_string()))
        };

        Ok(ColumnMap {
            site: require(&["site", "sitename"], "site")?,
            latitude: require(&["lat", "latitude"], "lat")?,
            longitude: require(&["long", "lon", "lng", "longitude"], "long")?,
            age: require(&["age", "agebp"], "age")?,
            age_type: find(&["ageboundtype", "agetype"]),
            taxon: require(&["taxon", "taxa", "varname"], "taxon")?,
            percentage: require(&["pct", "percent", "percentage"], "pct")?,
        })
    }

    /// Coerce one row, or None when a required value is missing or unparseable
    fn parse_row(row: &StringRecord, columns: &ColumnMap) -> Option<PollenRecord> {
        let site_name = non_empty_field(row, columns.site)?.to_string();
        let latitude = parse_decimal_degrees(non_empty_field(row, columns.latitude)?).ok()?;
        let longitude = parse_decimal_degrees(non_empty_field(row, columns.longitude)?).ok()?;
        let age = non_empty_field(row, columns.age)?.parse::<f64>().ok()?;
        let taxon = non_empty_field(row, columns.taxon)?.to_string();
        let percentage = non_empty_field(row, columns.percentage)?.parse::<f32>().ok()?;

        if !age.is_finite() {
            return None;
        }

        let age_type = columns
            .age_type
            .and_then(|index| row.get(index))
            .map(AgeType::parse_label)
            .unwrap_or_else(|| AgeType::Other("unknown".to_string()));

        Some(PollenRecord::new(
            site_name, latitude, longitude, age, age_type, taxon, percentage,
        ))
    }
}

impl Default for DatasetReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode file bytes as UTF-8, falling back to Windows-1252 for the Latin-1
/// site names that older exports carry.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

/// Pick a delimiter from the file extension, falling back to counting
/// candidates in the header line.
fn infer_delimiter(path: &Path, text: &str) -> u8 {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("tsv") | Some("tab") => b'\t',
        Some("csv") => b',',
        _ => {
            let header = text.lines().next().unwrap_or("");
            let tabs = header.matches('\t').count();
            let commas = header.matches(',').count();
            if tabs >= commas {
                b'\t'
            } else {
                b','
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const HEADER: &str = "site\tlat\tlong\tage\tageboundtype\ttaxon\tpct";

    fn write_tsv(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".tsv").tempfile().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    #[test]
    fn test_read_tsv_dataset() {
        let file = write_tsv(&[
            "Devils Lake\t43.42\t-89.73\t100\tCalendar years BP\tPinus\t20.5",
            "Devils Lake\t43.42\t-89.73\t600\tCalendar years BP\tQuercus\t35.0",
            "Wolsfeld Lake\t45.0\t-93.5\t1200\tRadiocarbon years BP\tPinus\t5.0",
        ]);

        let reader = DatasetReader::new();
        let (dataset, report) = reader.read_dataset(file.path()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(report.parsed, 3);
        assert_eq!(report.dropped, 0);

        let first = &dataset.records()[0];
        assert_eq!(first.site_name, "Devils Lake");
        assert_eq!(first.age_type, AgeType::CalendarYearsBp);
        assert!((first.percentage - 20.5).abs() < 0.001);
    }

    #[test]
    fn test_malformed_rows_dropped_silently() {
        let file = write_tsv(&[
            "Devils Lake\t43.42\t-89.73\t100\tCalendar years BP\tPinus\t20.5",
            "Broken Site\tnot-a-number\t-89.73\t100\tCalendar years BP\tPinus\t20.5",
            "Missing Pct\t43.42\t-89.73\t100\tCalendar years BP\tPinus\t",
            "",
            "Wolsfeld Lake\t45.0\t-93.5\t1200\tRadiocarbon years BP\tPinus\t5.0",
        ]);

        let reader = DatasetReader::new();
        let (dataset, report) = reader.read_dataset(file.path()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(report.parsed, 2);
        assert_eq!(report.dropped, 2); // blank line is skipped, not counted
    }

    #[test]
    fn test_csv_extension_uses_comma() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "site,lat,long,age,ageboundtype,taxon,pct").unwrap();
        writeln!(file, "Devils Lake,43.42,-89.73,100,Calendar years BP,Pinus,20.5").unwrap();

        let reader = DatasetReader::new();
        let (dataset, _) = reader.read_dataset(file.path()).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].site_name, "Devils Lake");
    }

    #[test]
    fn test_header_aliases() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Site_Name,Latitude,Longitude,Age,Age_Type,Taxa,Percentage").unwrap();
        writeln!(file, "Devils Lake,43.42,-89.73,100,Varve years BP,Pinus,20.5").unwrap();

        let reader = DatasetReader::new();
        let (dataset, _) = reader.read_dataset(file.path()).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].age_type, AgeType::VarveYearsBp);
    }

    #[test]
    fn test_missing_required_column() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "site,lat,long,age,taxon").unwrap();
        writeln!(file, "Devils Lake,43.42,-89.73,100,Pinus").unwrap();

        let reader = DatasetReader::new();
        let result = reader.read_dataset(file.path());

        assert!(matches!(result, Err(PollenError::MissingColumn(ref c)) if c == "pct"));
    }

    #[test]
    fn test_missing_age_type_column_is_tolerated() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "site,lat,long,age,taxon,pct").unwrap();
        writeln!(file, "Devils Lake,43.42,-89.73,100,Pinus,20.5").unwrap();

        let reader = DatasetReader::new();
        let (dataset, _) = reader.read_dataset(file.path()).unwrap();

        assert_eq!(
            dataset.records()[0].age_type,
            AgeType::Other("unknown".to_string())
        );
    }

    #[test]
    fn test_windows_1252_fallback() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"site,lat,long,age,ageboundtype,taxon,pct\n").unwrap();
        // "Lac \xE9tag\xE9" is Windows-1252 for a French site name
        file.write_all(b"Lac \xE9tag\xE9,46.0,-74.0,800,Calendar years BP,Picea,10.0\n")
            .unwrap();
        file.flush().unwrap();

        let reader = DatasetReader::new();
        let (dataset, _) = reader.read_dataset(file.path()).unwrap();

        assert_eq!(dataset.records()[0].site_name, "Lac étagé");
    }

    #[test]
    fn test_mmap_read_matches_buffered() {
        let file = write_tsv(&[
            "Devils Lake\t43.42\t-89.73\t100\tCalendar years BP\tPinus\t20.5",
        ]);

        let (buffered, _) = DatasetReader::new().read_dataset(file.path()).unwrap();
        let (mapped, _) = DatasetReader::with_mmap(true)
            .read_dataset(file.path())
            .unwrap();

        assert_eq!(buffered.records(), mapped.records());
    }
}

fn non_empty_field(row: &StringRecord, index: usize) -> Option<&str> {
    match row.get(index) {
        Some(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

/// Normalize a header cell for alias matching
fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}
