use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array,
    Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use flate2::read::GzDecoder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use zip::ZipArchive;

use super::model::{CellValue, Column, Table};
use crate::error::DataError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a metadata table from a file.  Dispatch by file name.
///
/// Supported formats:
/// * `.csv`              – header row + records
/// * `.zip`, `.csv.zip`  – zip archive, first `.csv` entry is read
/// * `.gz`, `.csv.gz`    – gzip-compressed CSV
/// * `.parquet`, `.pq`   – flat Parquet file
/// * `.json`             – `[{ "title": ..., "journal": ... }, ...]`
pub fn load_file(path: &Path) -> Result<Table> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let ext = name.rsplit('.').next().unwrap_or("");

    let table = match ext {
        "csv" => {
            let file = File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            read_csv(BufReader::new(file))
        }
        "zip" => load_zip(path),
        "gz" => {
            let file = File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            read_csv(GzDecoder::new(BufReader::new(file)))
        }
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        _ => Err(DataError::UnsupportedFormat(name.clone()).into()),
    };
    table.with_context(|| format!("loading {}", path.display()))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Cell texts read as missing, in addition to the empty string. Same set as
/// `pandas.read_csv`'s default `na_values`.
pub const NA_VALUES: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_na(field: &str) -> bool {
    field.is_empty() || NA_VALUES.contains(&field)
}

/// Read CSV from any byte source. Empty cells and [`NA_VALUES`] become
/// `Null` and each column gets one inferred type (see [`infer_column`]).
pub fn read_csv<R: Read>(source: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            return Err(DataError::RaggedRow {
                row: row_no,
                expected: headers.len(),
                found: record.len(),
            }
            .into());
        }
        for (col, field) in raw.iter_mut().zip(record.iter()) {
            col.push(if is_na(field) {
                None
            } else {
                Some(field.to_string())
            });
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_column(cells)))
        .collect();
    Ok(Table::from_columns(columns)?)
}

/// Pick one type for a whole column: integers, then floats, then booleans,
/// falling back to strings. Missing cells stay `Null` whatever the type.
fn infer_column(cells: Vec<Option<String>>) -> Vec<CellValue> {
    let present = || cells.iter().flatten();

    if present().all(|s| s.parse::<i64>().is_ok()) {
        return cells
            .iter()
            .map(|c| match c {
                Some(s) => s.parse().map(CellValue::Integer).unwrap_or(CellValue::Null),
                None => CellValue::Null,
            })
            .collect();
    }
    if present().all(|s| s.parse::<f64>().is_ok()) {
        return cells
            .iter()
            .map(|c| match c {
                Some(s) => s.parse().map(CellValue::Float).unwrap_or(CellValue::Null),
                None => CellValue::Null,
            })
            .collect();
    }
    if present().all(|s| parse_bool(s).is_some()) {
        return cells
            .iter()
            .map(|c| c.as_deref().and_then(parse_bool).map(CellValue::Bool).unwrap_or(CellValue::Null))
            .collect();
    }
    cells
        .into_iter()
        .map(|c| c.map(CellValue::String).unwrap_or(CellValue::Null))
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Zip loader
// ---------------------------------------------------------------------------

/// Read the first `.csv` entry of a zip archive (the CORD-19 distribution
/// ships `metadata.csv` this way).
fn load_zip(path: &Path) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).context("reading zip archive")?;

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if entry.is_file() && entry.name().to_ascii_lowercase().ends_with(".csv") {
            log::debug!("Reading archive entry {}", entry.name());
            return read_csv(entry);
        }
    }
    Err(DataError::EmptyArchive(path.to_path_buf()).into())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "cord_uid": "ug7v899j", "title": "...", "publish_time": "2020-03-01" },
///   ...
/// ]
/// ```
///
/// Keys missing from a record become `Null`; column order follows first
/// appearance.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(Table::from_rows(headers, rows)?)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if s.is_empty() => CellValue::Null,
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file, e.g. metadata re-saved with `df.to_parquet()`.
///
/// String, integer, float, boolean and date columns are supported; any other
/// Arrow type is rendered to its debug text.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, values) in columns.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            values.extend((0..batch.num_rows()).map(|row| extract_cell(array, row)));
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Ok(Table::from_columns(columns)?)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => match col.as_any().downcast_ref::<StringArray>() {
            Some(s) => CellValue::String(s.value(row).to_string()),
            None => CellValue::Null,
        },
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64))
            .unwrap_or(CellValue::Null),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64))
            .unwrap_or(CellValue::Null),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Date32 => col
            .as_any()
            .downcast_ref::<Date32Array>()
            .and_then(|a| a.value_as_date(row))
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        other => CellValue::String(format!("{other:?}")),
    }
}

/// Reject a path early when it does not exist, so the error names the
/// input rather than an inner reader.
pub fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("input file {} does not exist", path.display());
    }
    Ok(())
}
