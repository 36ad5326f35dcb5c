use serde::Serialize;

use crate::table::{Column, DataType, Table, Value};

/// Statistical summary of a table. Only numeric columns carry statistics;
/// every column still counts toward `column_count`.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub row_count: usize,
    pub column_count: usize,
    pub stats: Vec<ColumnStats>,
}

/// Per-column statistics over non-missing values. `std` is the sample
/// standard deviation (n - 1) and needs at least two values.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// (rows, columns) of the table.
pub fn shape(table: &Table) -> (usize, usize) {
    (table.n_rows(), table.n_cols())
}

/// Column names with their inferred types, in column order.
pub fn dtypes(table: &Table) -> Vec<(String, DataType)> {
    table.dtypes()
}

pub fn describe(table: &Table) -> SummaryReport {
    let stats = table
        .columns()
        .iter()
        .filter(|c| c.dtype().is_numeric())
        .map(column_stats)
        .collect();
    SummaryReport {
        row_count: table.n_rows(),
        column_count: table.n_cols(),
        stats,
    }
}

/// First `n` rows, `n` clamped to `[1, row count]`.
pub fn head(table: &Table, n: usize) -> Table {
    let rows = table.n_rows();
    let n = if rows == 0 { 0 } else { n.clamp(1, rows) };
    table.slice_rows(0, n)
}

/// Last `n` rows, `n` clamped to `[1, row count]`.
pub fn tail(table: &Table, n: usize) -> Table {
    let rows = table.n_rows();
    let n = if rows == 0 { 0 } else { n.clamp(1, rows) };
    table.slice_rows(rows - n, rows)
}

fn column_stats(col: &Column) -> ColumnStats {
    let mut xs: Vec<f64> = col.values().iter().filter_map(Value::as_f64).collect();
    let count = xs.len();
    if count == 0 {
        return ColumnStats {
            name: col.name().to_string(),
            count: 0,
            mean: None,
            std: None,
            min: None,
            q25: None,
            median: None,
            q75: None,
            max: None,
        };
    }

    let mean = xs.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let variance =
            xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count as f64 - 1.0);
        Some(variance.sqrt())
    } else {
        None
    };

    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    ColumnStats {
        name: col.name().to_string(),
        count,
        mean: Some(mean),
        std,
        min: Some(xs[0]),
        q25: Some(percentile(&xs, 0.25)),
        median: Some(percentile(&xs, 0.50)),
        q75: Some(percentile(&xs, 0.75)),
        max: Some(xs[count - 1]),
    }
}

/// Linear-interpolation percentile over sorted data.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }

    let rank = p * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = rank - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}
