use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use crate::error::DataError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the metadata table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common Pandas dtypes.
/// Used as a key in `BTreeMap` / `BTreeSet` downstream, so it must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// `Null`, or a float NaN (Pandas counts both as missing).
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Try to interpret the value as an `f64` for numeric statistics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// DType – pandas-style column type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum DType {
    Object,
    Int64,
    Float64,
    Bool,
    DateTime,
}

impl DType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DType::Int64 | DType::Float64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Object => "object",
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Bool => "bool",
            DType::DateTime => "datetime64[ns]",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column – one labelled column of cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Derive the dtype from the non-null cells.
    ///
    /// An all-null column is `float64`, which is what Pandas infers for an
    /// empty CSV column.
    pub fn dtype(&self) -> DType {
        let mut kinds = BTreeSet::new();
        for v in &self.values {
            let kind = match v {
                CellValue::Null => continue,
                CellValue::Integer(_) => DType::Int64 as u8,
                CellValue::Float(_) => DType::Float64 as u8,
                CellValue::Bool(_) => DType::Bool as u8,
                CellValue::Date(_) => DType::DateTime as u8,
                CellValue::String(_) => return DType::Object,
            };
            kinds.insert(kind);
        }
        let has = |d: DType| kinds.contains(&(d as u8));
        match kinds.len() {
            0 => DType::Float64,
            1 if has(DType::Int64) => DType::Int64,
            1 if has(DType::Float64) => DType::Float64,
            1 if has(DType::Bool) => DType::Bool,
            1 if has(DType::DateTime) => DType::DateTime,
            2 if has(DType::Int64) && has(DType::Float64) => DType::Float64,
            _ => DType::Object,
        }
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    pub fn non_null_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Fraction of null cells; 0 for an empty column.
    pub fn missing_ratio(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.null_count() as f64 / self.values.len() as f64
    }
}

// ---------------------------------------------------------------------------
// Table – the loaded dataframe
// ---------------------------------------------------------------------------

/// Column-oriented in-memory table. All columns have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that every column has the same length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DataError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            for col in &columns {
                if col.len() != expected {
                    return Err(DataError::LengthMismatch {
                        name: col.name.clone(),
                        expected,
                        found: col.len(),
                    });
                }
            }
        }
        Ok(Table { columns })
    }

    /// Build a table from row-major cells. Every row must have one cell per
    /// header.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, DataError> {
        let n_cols = headers.len();
        let mut columns: Vec<Vec<CellValue>> = (0..n_cols)
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();
        for (row_no, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(DataError::RaggedRow {
                    row: row_no,
                    expected: n_cols,
                    found: row.len(),
                });
            }
            for (col, value) in columns.iter_mut().zip(row) {
                col.push(value);
            }
        }
        Ok(Table {
            columns: headers
                .into_iter()
                .zip(columns)
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`, as Pandas reports it.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Remove the named columns; unknown names are ignored.
    pub fn drop_columns(&mut self, names: &[String]) {
        self.columns.retain(|c| !names.contains(&c.name));
    }

    /// Keep only rows where `keep[row]` is true.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        for col in &mut self.columns {
            let mut flags = keep.iter();
            col.values.retain(|_| *flags.next().unwrap_or(&true));
        }
    }

    /// A copy of the first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values.iter().take(n).cloned().collect()))
                .collect(),
        }
    }

    /// Replace the column with the same name, or append it.
    pub fn set_column(&mut self, column: Column) -> Result<(), DataError> {
        let found = column.len();
        if !self.columns.is_empty() && found != self.n_rows() {
            return Err(DataError::LengthMismatch {
                name: column.name,
                expected: self.n_rows(),
                found,
            });
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }
}
