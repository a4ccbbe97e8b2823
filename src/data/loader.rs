use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::{DataType, Schema};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::RawRecord;

/// Schema problems that make a file unusable as an emissions table.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Columns the dashboard reads. Anything else in the file is ignored.
const COUNTRY: &str = "country";
const YEAR: &str = "year";
const NUMERIC_COLUMNS: [&str; 7] = [
    "population",
    "gdp",
    "co2",
    "co2_per_capita",
    "coal_co2",
    "gas_co2",
    "oil_co2",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load raw emission rows from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the OWID `owid-co2-data.csv` layout (header row)
/// * `.json`    – `[{ "country": ..., "year": ..., "co2": ... }, ...]`
/// * `.parquet` – flat columns with the same names as the CSV
///
/// Cells that are empty or not numbers load as `None`; only a missing
/// `country` or `year` column is an error.
pub fn load_file(path: &Path) -> Result<Vec<RawRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            read_csv(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            read_json_str(&text)
        }
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    }
}

/// Assign a numeric column by name.
fn set_numeric(rec: &mut RawRecord, column: &str, value: Option<f64>) {
    let slot = match column {
        "population" => &mut rec.population,
        "gdp" => &mut rec.gdp,
        "co2" => &mut rec.co2,
        "co2_per_capita" => &mut rec.co2_per_capita,
        "coal_co2" => &mut rec.coal_co2,
        "gas_co2" => &mut rec.gas_co2,
        "oil_co2" => &mut rec.oil_co2,
        _ => return,
    };
    *slot = value;
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Years occasionally arrive as `1850.0`.
fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    s.parse::<i32>()
        .ok()
        .or_else(|| parse_number(s).and_then(year_from_f64))
}

/// Whole numbers inside the `i32` range; anything else is not a year.
fn year_from_f64(v: f64) -> Option<i32> {
    if v.fract() != 0.0 || !(f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&v) {
        return None;
    }
    i32::try_from(v as i64).ok()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV from any reader. Columns are located by header name.
pub fn read_csv<R: Read>(input: R) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let index_of = |name: &str| headers.iter().position(|h| h == name);
    let country_idx = index_of(COUNTRY).ok_or(LoadError::MissingColumn(COUNTRY))?;
    let year_idx = index_of(YEAR).ok_or(LoadError::MissingColumn(YEAR))?;
    let numeric: Vec<(usize, &str)> = NUMERIC_COLUMNS
        .iter()
        .filter_map(|&col| index_of(col).map(|i| (i, col)))
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut rec = RawRecord {
            country: record
                .get(country_idx)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            year: record.get(year_idx).and_then(parse_year),
            ..Default::default()
        };
        for &(idx, col) in &numeric {
            set_numeric(&mut rec, col, record.get(idx).and_then(parse_number));
        }
        rows.push(rec);
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "country": "World", "year": 1850, "co2": 196.9, "gdp": null },
///   ...
/// ]
/// ```
pub fn read_json_str(text: &str) -> Result<Vec<RawRecord>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(json_to_record(obj))
        })
        .collect()
}

fn json_to_record(obj: &Map<String, JsonValue>) -> RawRecord {
    let mut rec = RawRecord {
        country: obj.get(COUNTRY).and_then(|v| v.as_str()).map(str::to_string),
        year: obj.get(YEAR).and_then(json_to_year),
        ..Default::default()
    };
    for col in NUMERIC_COLUMNS {
        set_numeric(&mut rec, col, obj.get(col).and_then(json_to_f64));
    }
    rec
}

fn json_to_f64(val: &JsonValue) -> Option<f64> {
    match val {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => parse_number(s),
        _ => None,
    }
}

fn json_to_year(val: &JsonValue) -> Option<i32> {
    match val {
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .or_else(|| n.as_f64().and_then(year_from_f64)),
        JsonValue::String(s) => parse_year(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns named like the CSV.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let columns = ColumnIndex::resolve(&schema)?;

        let country_col = batch.column(columns.country);
        let year_col = batch.column(columns.year);

        for row in 0..batch.num_rows() {
            let mut rec = RawRecord {
                country: extract_string(country_col, row),
                year: extract_f64(year_col, row).and_then(year_from_f64),
                ..Default::default()
            };
            for (col, idx) in &columns.numeric {
                set_numeric(&mut rec, col, extract_f64(batch.column(*idx), row));
            }
            rows.push(rec);
        }
    }

    Ok(rows)
}

struct ColumnIndex {
    country: usize,
    year: usize,
    numeric: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    fn resolve(schema: &Schema) -> Result<Self, LoadError> {
        let country = schema
            .index_of(COUNTRY)
            .map_err(|_| LoadError::MissingColumn(COUNTRY))?;
        let year = schema
            .index_of(YEAR)
            .map_err(|_| LoadError::MissingColumn(YEAR))?;
        let numeric = NUMERIC_COLUMNS
            .iter()
            .filter_map(|&col| schema.index_of(col).ok().map(|i| (col, i)))
            .collect();
        Ok(ColumnIndex {
            country,
            year,
            numeric,
        })
    }
}

// -- Arrow helpers --

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        _ => None,
    }
}

/// Numeric cell as `f64`. Nulls and non-numeric types read as `None`.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Int32 => any.downcast_ref::<Int32Array>()?.value(row) as f64,
        DataType::Int64 => any.downcast_ref::<Int64Array>()?.value(row) as f64,
        DataType::Float32 => any.downcast_ref::<Float32Array>()?.value(row) as f64,
        DataType::Float64 => any.downcast_ref::<Float64Array>()?.value(row),
        _ => return None,
    };
    Some(value).filter(|v| !v.is_nan())
}
