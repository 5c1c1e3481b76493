//! Catalog sources
//!
//! A source fetches untyped rows from wherever the listings live. Sources do
//! no validation of their own; every row goes through
//! [`Catalog::from_rows`](crate::Catalog::from_rows) afterwards.

use crate::{Error, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One untyped catalog row, column name to value
pub type RawRow = Map<String, Value>;

/// Something that can hand over the raw listing table
pub trait CatalogSource {
    /// Human readable origin, used in logs
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<Vec<RawRow>>;
}

/// Pick a source from a file extension: `.csv`, `.json`, `.jsonl` or `.ndjson`
pub fn source_for_path<P: AsRef<Path>>(path: P) -> Result<Box<dyn CatalogSource>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => Ok(Box::new(CsvSource::new(path))),
        "json" | "jsonl" | "ndjson" => Ok(Box::new(JsonSource::new(path))),
        _ => Err(Error::Config(format!(
            "unsupported catalog format for {:?} (expected .csv, .json, .jsonl)",
            path
        ))),
    }
}

fn ensure_reachable(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(Error::Config(format!("catalog source not found: {:?}", path)));
    }
    Ok(())
}

/// CSV file with a header row. Empty cells become nulls.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    limit: Option<usize>,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            limit: None,
        }
    }

    /// Read at most `limit` data rows
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl CatalogSource for CsvSource {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn fetch(&self) -> Result<Vec<RawRow>> {
        ensure_reachable(&self.path)?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_path(&self.path)?;
        let headers = reader.headers()?.clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            if self.limit.is_some_and(|limit| rows.len() >= limit) {
                break;
            }
            let record = record?;
            let mut row = RawRow::new();
            for (name, cell) in headers.iter().zip(record.iter()) {
                let value = if cell.trim().is_empty() {
                    Value::Null
                } else {
                    Value::String(cell.to_string())
                };
                row.insert(name.to_string(), value);
            }
            rows.push(row);
        }

        info!("Loaded {} rows from {}", rows.len(), self.describe());
        Ok(rows)
    }
}

/// JSON array of objects, or one object per line (JSON Lines)
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CatalogSource for JsonSource {
    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }

    fn fetch(&self) -> Result<Vec<RawRow>> {
        ensure_reachable(&self.path)?;

        let data = std::fs::read_to_string(&self.path)?;
        let rows = match serde_json::from_str::<Value>(&data) {
            Ok(Value::Array(items)) => collect_objects(items),
            Ok(Value::Object(obj)) => vec![obj],
            Ok(_) => {
                return Err(Error::Catalog(format!(
                    "{} does not contain JSON objects",
                    self.describe()
                )))
            }
            Err(_) => {
                let reader = BufReader::new(File::open(&self.path)?);
                let mut items = Vec::new();
                for line in reader.lines() {
                    let line = line?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    items.push(serde_json::from_str::<Value>(&line)?);
                }
                collect_objects(items)
            }
        };

        info!("Loaded {} rows from {}", rows.len(), self.describe());
        Ok(rows)
    }
}

fn collect_objects(items: Vec<Value>) -> Vec<RawRow> {
    let total = items.len();
    let rows: Vec<RawRow> = items
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(obj) => Some(obj),
            _ => None,
        })
        .collect();
    if rows.len() < total {
        warn!("Skipped {} non-object catalog entries", total - rows.len());
    }
    rows
}

/// Rows that were already fetched by the caller
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<RawRow>,
}

impl MemorySource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }
}

impl CatalogSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory:{} rows", self.rows.len())
    }

    fn fetch(&self) -> Result<Vec<RawRow>> {
        Ok(self.rows.clone())
    }
}
