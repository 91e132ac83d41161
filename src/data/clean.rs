use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::model::{CellValue, Column, Table};
use crate::error::DataError;

/// Rows missing any of these are dropped.
pub const REQUIRED_COLUMNS: [&str; 2] = ["title", "publish_time"];

pub const PUBLISH_TIME: &str = "publish_time";
pub const PUBLISH_DATE: &str = "publish_date";
pub const PUB_YEAR: &str = "pub_year";
pub const ABSTRACT: &str = "abstract";
pub const ABSTRACT_WORD_COUNT: &str = "abstract_word_count";

/// What [`clean`] removed or could not interpret.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanReport {
    pub dropped_columns: Vec<String>,
    pub dropped_rows: usize,
    pub unparsed_dates: usize,
}

// ---------------------------------------------------------------------------
// Sparse columns / incomplete rows
// ---------------------------------------------------------------------------

/// Columns whose missing ratio is strictly above `threshold`.
pub fn sparse_columns(table: &Table, threshold: f64) -> Vec<String> {
    table
        .columns()
        .iter()
        .filter(|c| c.missing_ratio() > threshold)
        .map(|c| c.name.clone())
        .collect()
}

pub fn drop_sparse_columns(table: &mut Table, threshold: f64) -> Vec<String> {
    let dropped = sparse_columns(table, threshold);
    table.drop_columns(&dropped);
    dropped
}

/// Drop rows with a null in any `required` column; returns the number removed.
pub fn drop_rows_missing(table: &mut Table, required: &[&str]) -> Result<usize, DataError> {
    let mut keep = vec![true; table.n_rows()];
    for name in required {
        let col = table
            .column(name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;
        for (flag, value) in keep.iter_mut().zip(&col.values) {
            if value.is_null() {
                *flag = false;
            }
        }
    }
    let removed = keep.iter().filter(|k| !**k).count();
    table.retain_rows(&keep);
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m/%d/%y", "%Y %b %d", "%d %b %Y",
];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Four-digit years only; chrono's `%Y` also accepts `20` or `5`.
const YEARS: std::ops::RangeInclusive<i32> = 1000..=9999;

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    YEARS.contains(&date.year()).then_some(date)
}

/// Coerce a `publish_time` value into a date. Anything unrecognised is `None`.
///
/// Partial dates resolve to the first day of the period: `2020` is
/// 2020-01-01 and `2020-03` or `2020 Mar` is 2020-03-01. Dates outside
/// years 1000..=9999 are rejected.
pub fn parse_publish_time(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let full = DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .chain(
            DATETIME_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date()),
        )
        .chain(DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()));
    // Year-month forms: chrono needs a day, so supply one.
    let partial = [("%Y-%m-%d", "-"), ("%Y %b %d", " ")]
        .into_iter()
        .filter_map(|(fmt, sep)| NaiveDate::parse_from_str(&format!("{text}{sep}01"), fmt).ok());
    let year_only = (text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()))
        .then(|| text.parse().ok())
        .flatten()
        .and_then(|year: i32| NaiveDate::from_ymd_opt(year, 1, 1));

    full.chain(partial).chain(year_only).find_map(plausible)
}

fn cell_to_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::String(s) => parse_publish_time(s),
        // A bare year read as an integer column.
        CellValue::Integer(y) => i32::try_from(*y)
            .ok()
            .filter(|y| YEARS.contains(y))
            .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)),
        _ => None,
    }
}

/// Add `publish_date` and `pub_year` derived from `publish_time`.
///
/// `publish_time` itself is left as loaded. Returns the number of non-null
/// values that could not be parsed.
pub fn derive_dates(table: &mut Table) -> Result<usize, DataError> {
    let source = table
        .column(PUBLISH_TIME)
        .ok_or_else(|| DataError::MissingColumn(PUBLISH_TIME.to_string()))?;

    let mut unparsed = 0;
    let dates: Vec<CellValue> = source
        .values
        .iter()
        .map(|v| match cell_to_date(v) {
            Some(d) => CellValue::Date(d),
            None => {
                if !v.is_null() {
                    unparsed += 1;
                }
                CellValue::Null
            }
        })
        .collect();
    let years = dates
        .iter()
        .map(|d| match d {
            CellValue::Date(d) => CellValue::Integer(d.year() as i64),
            _ => CellValue::Null,
        })
        .collect();

    table.set_column(Column::new(PUBLISH_DATE, dates))?;
    table.set_column(Column::new(PUB_YEAR, years))?;
    Ok(unparsed)
}

// ---------------------------------------------------------------------------
// Abstract word count
// ---------------------------------------------------------------------------

/// Whitespace-token count; 0 for a missing abstract.
pub fn abstract_word_count(value: &CellValue) -> usize {
    match value {
        CellValue::Null => 0,
        CellValue::String(s) => s.split_whitespace().count(),
        other => other.to_string().split_whitespace().count(),
    }
}

/// Add `abstract_word_count`; all zeros when there is no `abstract` column
/// (e.g. after it was dropped as sparse).
pub fn derive_abstract_word_count(table: &mut Table) -> Result<(), DataError> {
    let counts = match table.column(ABSTRACT) {
        Some(col) => col
            .values
            .iter()
            .map(|v| CellValue::Integer(abstract_word_count(v) as i64))
            .collect(),
        None => vec![CellValue::Integer(0); table.n_rows()],
    };
    table.set_column(Column::new(ABSTRACT_WORD_COUNT, counts))
}

// ---------------------------------------------------------------------------
// Full cleaning pass
// ---------------------------------------------------------------------------

pub fn clean(table: &mut Table, threshold: f64) -> Result<CleanReport> {
    let dropped_columns = drop_sparse_columns(table, threshold);
    log::info!("Dropping columns with >{:.0}% missing values: {dropped_columns:?}", threshold * 100.0);

    let dropped_rows = drop_rows_missing(table, &REQUIRED_COLUMNS)?;
    log::info!("Dropped {dropped_rows} rows missing {REQUIRED_COLUMNS:?}");

    let unparsed_dates = derive_dates(table)?;
    if unparsed_dates > 0 {
        log::warn!("{unparsed_dates} publish_time values could not be parsed as dates");
    }
    derive_abstract_word_count(table)?;

    Ok(CleanReport {
        dropped_columns,
        dropped_rows,
        unparsed_dates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn metadata() -> Table {
        Table::from_columns(vec![
            Column::new("cord_uid", vec![s("a"), s("b"), s("c"), s("d"), s("e")]),
            Column::new(
                "title",
                vec![s("Covid one"), CellValue::Null, s("Three"), s("Four"), s("Five")],
            ),
            Column::new(
                "abstract",
                vec![s("two  words"), s("x"), CellValue::Null, s(" a b\tc\n"), s("one")],
            ),
            Column::new(
                "publish_time",
                vec![s("2020-03-15"), s("2019"), s("2021"), CellValue::Null, s("not a date")],
            ),
            Column::new(
                "mag_id",
                vec![CellValue::Null, CellValue::Null, CellValue::Null, s("m"), CellValue::Null],
            ),
            Column::new(
                "pmcid",
                vec![s("p1"), s("p2"), CellValue::Null, CellValue::Null, CellValue::Null],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_publish_time_formats() {
        assert_eq!(parse_publish_time("2020-03-15"), Some(ymd(2020, 3, 15)));
        assert_eq!(parse_publish_time("2020"), Some(ymd(2020, 1, 1)));
        assert_eq!(parse_publish_time("2020-03"), Some(ymd(2020, 3, 1)));
        assert_eq!(parse_publish_time("2020 Mar 5"), Some(ymd(2020, 3, 5)));
        assert_eq!(parse_publish_time("2020 Mar"), Some(ymd(2020, 3, 1)));
        assert_eq!(parse_publish_time("03/15/2020"), Some(ymd(2020, 3, 15)));
        assert_eq!(parse_publish_time("2020-03-15T10:00:00Z"), Some(ymd(2020, 3, 15)));
        assert_eq!(parse_publish_time("2020-03-15 10:00:00"), Some(ymd(2020, 3, 15)));
        assert_eq!(parse_publish_time("3/15/20"), Some(ymd(2020, 3, 15)));
        assert_eq!(parse_publish_time("5-6"), None);
        assert_eq!(parse_publish_time("20-03-15"), None);
        assert_eq!(parse_publish_time("0020-03-15"), None);
        assert_eq!(parse_publish_time("spring 2020"), None);
        assert_eq!(parse_publish_time("2020-13-01"), None);
        assert_eq!(parse_publish_time(""), None);
    }

    #[test]
    fn test_sparse_columns_strictly_above_threshold() {
        let table = metadata();
        // pmcid is exactly 60% missing, mag_id 80%; title only 20%.
        assert_eq!(sparse_columns(&table, 0.5), vec!["mag_id", "pmcid"]);
        assert_eq!(sparse_columns(&table, 0.6), vec!["mag_id"]);
    }

    #[test]
    fn test_clean_invariants() {
        let mut table = metadata();
        let before = sparse_columns(&table, 0.5);
        let report = clean(&mut table, 0.5).unwrap();

        assert_eq!(report.dropped_columns, before);
        for name in &before {
            assert!(!table.has_column(name));
        }
        assert_eq!(report.dropped_rows, 2);
        assert_eq!(report.unparsed_dates, 1);

        for name in REQUIRED_COLUMNS {
            assert_eq!(table.column(name).unwrap().null_count(), 0);
        }

        let times = &table.column(PUBLISH_TIME).unwrap().values;
        let years = &table.column(PUB_YEAR).unwrap().values;
        for (t, y) in times.iter().zip(years) {
            match parse_publish_time(t.as_str().unwrap()) {
                Some(d) => assert_eq!(*y, CellValue::Integer(d.year() as i64)),
                None => assert!(y.is_null()),
            }
        }
        assert_eq!(
            *years,
            vec![CellValue::Integer(2020), CellValue::Integer(2021), CellValue::Null]
        );

        let counts = &table.column(ABSTRACT_WORD_COUNT).unwrap().values;
        assert_eq!(
            *counts,
            vec![CellValue::Integer(2), CellValue::Integer(0), CellValue::Integer(1)]
        );
    }

    #[test]
    fn test_na_token_column_is_dropped() {
        let csv = "title,publish_time,j\nA,2020,NA\nB,2020,null\nC,2020,None\nD,2020,Cell\n";
        let mut table = crate::data::loader::read_csv(csv.as_bytes()).unwrap();
        let report = clean(&mut table, 0.5).unwrap();
        assert_eq!(report.dropped_columns, vec!["j"]);
        assert!(!table.has_column("j"));
    }

    #[test]
    fn test_word_count_without_abstract_column() {
        let mut table =
            Table::from_columns(vec![Column::new("title", vec![s("a"), s("b")])]).unwrap();
        derive_abstract_word_count(&mut table).unwrap();
        assert_eq!(
            table.column(ABSTRACT_WORD_COUNT).unwrap().values,
            vec![CellValue::Integer(0); 2]
        );
    }

    #[test]
    fn test_whitespace_word_count() {
        assert_eq!(abstract_word_count(&s(" a b\tc\n")), 3);
        assert_eq!(abstract_word_count(&CellValue::Null), 0);
        assert_eq!(abstract_word_count(&s("")), 0);
    }

    #[test]
    fn test_missing_required_column_is_error() {
        let mut table = Table::from_columns(vec![Column::new("title", vec![s("a")])]).unwrap();
        let err = drop_rows_missing(&mut table, &REQUIRED_COLUMNS).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == "publish_time"));
    }

    #[test]
    fn test_integer_years_parse() {
        let mut table = Table::from_columns(vec![Column::new(
            PUBLISH_TIME,
            vec![CellValue::Integer(2018), CellValue::Integer(7)],
        )])
        .unwrap();
        assert_eq!(derive_dates(&mut table).unwrap(), 1);
        assert_eq!(
            table.column(PUB_YEAR).unwrap().values,
            vec![CellValue::Integer(2018), CellValue::Null]
        );
    }
}
