use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use super::model::{CellValue, Column, Table};

/// Source column names, preferred first.
const SOURCE_COLUMNS: [&str; 2] = ["source_x", "source"];

/// Counts of non-null values, most frequent first, ties by label.
pub fn value_counts(column: &Column) -> Vec<(String, usize)> {
    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    for value in column.values.iter().filter(|v| !v.is_null()) {
        *counts.entry(value.to_string()).or_default() += 1;
    }
    sort_counts(counts.into_iter().collect())
}

/// Sort `(label, count)` pairs by count descending, then label ascending.
pub fn sort_counts(mut counts: Vec<(String, usize)>) -> Vec<(String, usize)> {
    counts.sort_by(|(la, ca), (lb, cb)| cb.cmp(ca).then_with(|| la.cmp(lb)));
    counts
}

pub fn top_n(counts: &[(String, usize)], n: usize) -> Vec<(String, usize)> {
    counts.iter().take(n).cloned().collect()
}

/// Counts per integer year, ascending by year. Nulls are not counted.
pub fn counts_by_year(column: &Column) -> Vec<(i64, usize)> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for value in &column.values {
        if let CellValue::Integer(year) = value {
            *counts.entry(*year).or_default() += 1;
        }
    }
    counts.into_iter().collect()
}

/// The column holding the paper source, if the table has one.
pub fn source_column(table: &Table) -> Option<&Column> {
    SOURCE_COLUMNS.iter().find_map(|name| table.column(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn test_value_counts_order() {
        let col = Column::new(
            "journal",
            vec![s("Cell"), s("BMJ"), CellValue::Null, s("Lancet"), s("BMJ"), s("Cell"), s("BMJ")],
        );
        assert_eq!(
            value_counts(&col),
            vec![
                ("BMJ".to_string(), 3),
                ("Cell".to_string(), 2),
                ("Lancet".to_string(), 1)
            ]
        );
        assert_eq!(top_n(&value_counts(&col), 2).len(), 2);
    }

    #[test]
    fn test_counts_by_year_sorted_and_skips_nulls() {
        let col = Column::new(
            "pub_year",
            vec![
                CellValue::Integer(2021),
                CellValue::Null,
                CellValue::Integer(2019),
                CellValue::Integer(2021),
            ],
        );
        assert_eq!(counts_by_year(&col), vec![(2019, 1), (2021, 2)]);
    }

    #[test]
    fn test_source_column_preference() {
        let both = Table::from_columns(vec![
            Column::new("source", vec![s("a")]),
            Column::new("source_x", vec![s("b")]),
        ])
        .unwrap();
        assert_eq!(source_column(&both).unwrap().name, "source_x");

        let none = Table::from_columns(vec![Column::new("title", vec![s("a")])]).unwrap();
        assert!(source_column(&none).is_none());
    }
}
