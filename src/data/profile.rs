use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use serde::Serialize;

use super::model::{CellValue, DType, Table};

/// Columns whose null counts are reported during profiling.
pub const IMPORTANT_COLUMNS: [&str; 5] = ["cord_uid", "title", "abstract", "publish_time", "journal"];

const MAX_CELL_CHARS: usize = 40;

// ---------------------------------------------------------------------------
// Column summaries
// ---------------------------------------------------------------------------

/// One row of `describe(include='all')`, transposed.
///
/// Non-numeric columns fill `unique`/`top`/`freq`, numeric columns fill the
/// moment and quantile fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub dtype: String,
    pub count: usize,
    pub unique: Option<usize>,
    pub top: Option<String>,
    pub freq: Option<usize>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Null count for one requested column; `None` when the column is absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NullCount {
    pub column: String,
    pub nulls: Option<usize>,
}

pub fn dtypes(table: &Table) -> Vec<(String, DType)> {
    table
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.dtype()))
        .collect()
}

pub fn null_counts(table: &Table, columns: &[&str]) -> Vec<NullCount> {
    columns
        .iter()
        .map(|name| NullCount {
            column: name.to_string(),
            nulls: table.column(name).map(|c| c.null_count()),
        })
        .collect()
}

pub fn describe(table: &Table) -> Vec<ColumnSummary> {
    table
        .columns()
        .iter()
        .map(|col| {
            let dtype = col.dtype();
            let mut summary = ColumnSummary {
                column: col.name.clone(),
                dtype: dtype.to_string(),
                count: col.non_null_count(),
                ..Default::default()
            };

            if dtype.is_numeric() {
                let mut values: Vec<f64> = col
                    .values
                    .iter()
                    .filter(|v| !v.is_null())
                    .filter_map(CellValue::as_f64)
                    .collect();
                if !values.is_empty() {
                    values.sort_by(f64::total_cmp);
                    let n = values.len() as f64;
                    let mean = values.iter().sum::<f64>() / n;
                    summary.mean = Some(mean);
                    summary.std = (values.len() > 1).then(|| {
                        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
                    });
                    summary.min = values.first().copied();
                    summary.q25 = Some(quantile(&values, 0.25));
                    summary.q50 = Some(quantile(&values, 0.5));
                    summary.q75 = Some(quantile(&values, 0.75));
                    summary.max = values.last().copied();
                }
            } else {
                let mut freq: BTreeMap<&CellValue, usize> = BTreeMap::new();
                for v in col.values.iter().filter(|v| !v.is_null()) {
                    *freq.entry(v).or_default() += 1;
                }
                summary.unique = Some(freq.len());
                // BTreeMap iterates in value order, so the first maximum wins ties.
                if let Some((value, count)) = freq
                    .iter()
                    .fold(None::<(&CellValue, usize)>, |best, (v, c)| match best {
                        Some((_, bc)) if bc >= *c => best,
                        _ => Some((v, *c)),
                    })
                {
                    summary.top = Some(value.to_string());
                    summary.freq = Some(count);
                }
            }
            summary
        })
        .collect()
}

/// Linear-interpolation quantile over sorted values (Pandas' default).
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

// ---------------------------------------------------------------------------
// Console rendering (Arrow pretty tables)
// ---------------------------------------------------------------------------

/// Render string columns as an Arrow pretty table. `None` cells print empty.
fn grid(headers: &[&str], columns: Vec<Vec<Option<String>>>) -> Result<String> {
    let schema = Arc::new(Schema::new(
        headers
            .iter()
            .map(|h| Field::new(*h, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = columns
        .into_iter()
        .map(|c| Arc::new(StringArray::from(c)) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema, arrays)?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}

fn truncate(s: String) -> String {
    if s.chars().count() <= MAX_CELL_CHARS {
        return s;
    }
    let mut out: String = s.chars().take(MAX_CELL_CHARS - 3).collect();
    out.push_str("...");
    out
}

fn fmt_num(v: Option<f64>) -> Option<String> {
    v.map(|v| format!("{v:.4}"))
}

/// The first `n` rows, long cells truncated.
pub fn head_table(table: &Table, n: usize) -> Result<String> {
    let head = table.head(n);
    let names = head.column_names();
    let headers: Vec<&str> = names.iter().map(String::as_str).collect();
    let columns = head
        .columns()
        .iter()
        .map(|c| {
            c.values
                .iter()
                .map(|v| (!v.is_null()).then(|| truncate(v.to_string())))
                .collect()
        })
        .collect();
    grid(&headers, columns)
}

pub fn render_dtypes(dtypes: &[(String, DType)]) -> Result<String> {
    grid(
        &["column", "dtype"],
        vec![
            dtypes.iter().map(|(n, _)| Some(n.clone())).collect(),
            dtypes.iter().map(|(_, d)| Some(d.to_string())).collect(),
        ],
    )
}

pub fn render_null_counts(counts: &[NullCount]) -> Result<String> {
    grid(
        &["column", "missing"],
        vec![
            counts.iter().map(|c| Some(c.column.clone())).collect(),
            counts
                .iter()
                .map(|c| Some(c.nulls.map_or_else(|| "(absent)".to_string(), |n| n.to_string())))
                .collect(),
        ],
    )
}

pub fn render_describe(summaries: &[ColumnSummary]) -> Result<String> {
    let col = |f: &dyn Fn(&ColumnSummary) -> Option<String>| -> Vec<Option<String>> {
        summaries.iter().map(f).collect()
    };
    grid(
        &[
            "column", "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%",
            "max",
        ],
        vec![
            col(&|s| Some(s.column.clone())),
            col(&|s| Some(s.count.to_string())),
            col(&|s| s.unique.map(|u| u.to_string())),
            col(&|s| s.top.clone().map(truncate)),
            col(&|s| s.freq.map(|f| f.to_string())),
            col(&|s| fmt_num(s.mean)),
            col(&|s| fmt_num(s.std)),
            col(&|s| fmt_num(s.min)),
            col(&|s| fmt_num(s.q25)),
            col(&|s| fmt_num(s.q50)),
            col(&|s| fmt_num(s.q75)),
            col(&|s| fmt_num(s.max)),
        ],
    )
}

/// Equivalent of `DataFrame.info()`.
pub fn info(table: &Table) -> Result<String> {
    let (rows, cols) = table.shape();
    let columns = table.columns();
    let body = grid(
        &["#", "column", "non-null count", "dtype"],
        vec![
            (0..cols).map(|i| Some(i.to_string())).collect(),
            columns.iter().map(|c| Some(c.name.clone())).collect(),
            columns
                .iter()
                .map(|c| Some(format!("{} non-null", c.non_null_count())))
                .collect(),
            columns.iter().map(|c| Some(c.dtype().to_string())).collect(),
        ],
    )?;
    Ok(format!("{rows} entries, {cols} columns\n{body}"))
}
