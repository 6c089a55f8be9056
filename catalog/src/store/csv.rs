//! Flat-file dataset store.
//!
//! The table is a CSV file with one row per history entry (not per id):
//! canonical fields, status, ingestion timestamp and the raw-payload blob.
//! Rows are re-sorted by id and capture time on every save so the output is
//! diff-stable regardless of merge order. Cell parsing on load is tolerant:
//! a numeric or timestamp cell that fails to parse degrades to null instead
//! of failing the load, which fails toward re-ingestion.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::conversions::{numeric, text, timestamp};
use crate::dataset::Dataset;
use crate::error::CatalogResult;
use crate::types::{EntryStatus, HistoryEntry, ListingFields, Transmission};

/// Column order of the persisted table.
const COLUMNS: [&str; 18] = [
    "id",
    "brand",
    "model",
    "year",
    "price",
    "mileage",
    "city",
    "transmission",
    "displacement",
    "fuel",
    "steering",
    "upholstery",
    "payment",
    "description",
    "url",
    "status",
    "ingested_at",
    "raw",
];

/// Dataset store backed by a single CSV file.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> CsvStore {
        CsvStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl super::DatasetStore for CsvStore {
    async fn load(&self) -> CatalogResult<Dataset> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Dataset::new());
            }
            Err(error) => return Err(error.into()),
        };

        let mut rows = parse_rows(&contents);
        if rows.first().is_some_and(|row| row.first().map(String::as_str) == Some("id")) {
            rows.remove(0);
        }

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match decode_entry(&row) {
                Some(entry) => entries.push(entry),
                None => warn!(path = %self.path.display(), "skipping row without an id"),
            }
        }

        Ok(Dataset::from_rows(entries))
    }

    async fn save(&self, dataset: &Dataset) -> CatalogResult<()> {
        let mut out = String::new();
        write_row(&mut out, &COLUMNS);
        for entry in dataset.ordered_rows() {
            write_row(&mut out, &encode_entry(entry));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, out).await?;
        Ok(())
    }
}

fn encode_entry(entry: &HistoryEntry) -> Vec<String> {
    let fields = &entry.fields;
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();
    vec![
        entry.id.clone(),
        opt(&fields.brand),
        opt(&fields.model),
        fields.year.map(|v| v.to_string()).unwrap_or_default(),
        fields.price.map(|v| v.to_string()).unwrap_or_default(),
        fields.mileage.map(|v| v.to_string()).unwrap_or_default(),
        opt(&fields.city),
        fields
            .transmission
            .map(|v| v.as_str().to_string())
            .unwrap_or_default(),
        fields.displacement.map(|v| v.to_string()).unwrap_or_default(),
        opt(&fields.fuel),
        opt(&fields.steering),
        opt(&fields.upholstery),
        opt(&fields.payment),
        opt(&fields.description),
        opt(&fields.url),
        entry.status.as_str().to_string(),
        entry
            .ingested_at
            .map(|v| v.to_rfc3339())
            .unwrap_or_default(),
        entry.raw.clone().unwrap_or_default(),
    ]
}

fn decode_entry(row: &[String]) -> Option<HistoryEntry> {
    let cell = |index: usize| row.get(index).map(String::as_str).unwrap_or("");
    let id = cell(0).trim();
    if id.is_empty() {
        return None;
    }

    let fields = ListingFields {
        brand: text::clean_text(cell(1)),
        model: text::clean_text(cell(2)),
        year: numeric::parse_year(cell(3)),
        price: cell(4).trim().parse::<f64>().ok(),
        mileage: cell(5).trim().parse::<i64>().ok(),
        city: text::clean_text(cell(6)),
        transmission: Transmission::from_cell(cell(7)),
        displacement: cell(8).trim().parse::<f64>().ok(),
        fuel: text::clean_text(cell(9)),
        steering: text::clean_text(cell(10)),
        upholstery: text::clean_text(cell(11)),
        payment: text::clean_text(cell(12)),
        description: text::clean_text(cell(13)),
        url: text::clean_text(cell(14)),
    };

    Some(HistoryEntry {
        id: id.to_string(),
        status: EntryStatus::from_cell(cell(15)),
        ingested_at: timestamp::parse_utc(cell(16)),
        fields,
        raw: text::clean_text(cell(17)),
    })
}

/// Writes one CSV row, quoting cells that need it.
fn write_row<S: AsRef<str>>(out: &mut String, cells: &[S]) {
    for (index, cell) in cells.iter().enumerate() {
        let cell = cell.as_ref();
        if index > 0 {
            out.push(',');
        }
        if cell.contains([',', '"', '\n', '\r']) {
            out.push('"');
            let _ = write!(out, "{}", cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

/// Minimal CSV parser: quoted cells, doubled-quote escapes, CRLF tolerant.
fn parse_rows(contents: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = contents.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        cell.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => row.push(std::mem::take(&mut cell)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut cell));
                if row.len() > 1 || !row[0].is_empty() {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => cell.push(ch),
        }
    }

    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DatasetStore;
    use chrono::{TimeZone, Utc};

    fn entry(id: &str, price: Option<f64>, status: EntryStatus) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            status,
            ingested_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
            fields: ListingFields {
                brand: Some("Kia".to_string()),
                price,
                description: Some("full equipo, único dueño".to_string()),
                ..Default::default()
            },
            raw: Some(r#"{"id":"1"}"#.to_string()),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("catalog-csv-{name}-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn codec_round_trips_quoted_cells() {
        let mut out = String::new();
        write_row(
            &mut out,
            &[
                "a".to_string(),
                "with, comma".to_string(),
                "with \"quotes\"".to_string(),
            ],
        );
        let rows = parse_rows(&out);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "with, comma");
        assert_eq!(rows[0][2], "with \"quotes\"");
    }

    #[test]
    fn entry_encoding_round_trips() {
        let original = entry("1042", Some(15_000.0), EntryStatus::Active);
        let decoded = decode_entry(&encode_entry(&original)).unwrap();
        assert_eq!(decoded.id, original.id);
        assert_eq!(decoded.status, original.status);
        assert_eq!(decoded.ingested_at, original.ingested_at);
        assert_eq!(decoded.fields, original.fields);
        assert_eq!(decoded.raw, original.raw);
    }

    #[test]
    fn unparseable_cells_degrade_to_null() {
        let mut row = encode_entry(&entry("1", Some(15_000.0), EntryStatus::Active));
        row[4] = "not-a-price".to_string();
        row[16] = "not-a-timestamp".to_string();
        let decoded = decode_entry(&row).unwrap();
        assert_eq!(decoded.fields.price, None);
        assert_eq!(decoded.ingested_at, None);
    }

    #[tokio::test]
    async fn load_of_missing_file_is_an_empty_dataset() {
        let store = CsvStore::new(temp_path("missing"));
        let dataset = store.load().await.unwrap();
        assert!(dataset.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let path = temp_path("roundtrip");
        let store = CsvStore::new(&path);
        let dataset = Dataset::from_rows(vec![
            entry("b", Some(12_000.0), EntryStatus::Active),
            entry("a", Some(9_500.0), EntryStatus::Inactive),
        ]);

        store.save(&dataset).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.active_entry("b").unwrap().fields.price, Some(12_000.0));
        assert!(loaded.active_entry("a").is_none());
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn saved_output_is_deterministic() {
        let path_a = temp_path("det-a");
        let path_b = temp_path("det-b");
        let dataset = Dataset::from_rows(vec![
            entry("z", Some(1_000.0), EntryStatus::Active),
            entry("a", Some(2_000.0), EntryStatus::Active),
        ]);
        // Same rows in a different insertion order.
        let reordered = Dataset::from_rows(vec![
            entry("a", Some(2_000.0), EntryStatus::Active),
            entry("z", Some(1_000.0), EntryStatus::Active),
        ]);

        CsvStore::new(&path_a).save(&dataset).await.unwrap();
        CsvStore::new(&path_b).save(&reordered).await.unwrap();

        let a = tokio::fs::read_to_string(&path_a).await.unwrap();
        let b = tokio::fs::read_to_string(&path_b).await.unwrap();
        assert_eq!(a, b);
        let _ = tokio::fs::remove_file(&path_a).await;
        let _ = tokio::fs::remove_file(&path_b).await;
    }
}
