use std::collections::HashMap;
use std::fmt;

use log::debug;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::table::{Column, DataType, Table, Value};

/// Reduction applied to the target column within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggOp {
    Sum,
    Mean,
    Min,
    Max,
    Count,
}

impl AggOp {
    pub fn name(self) -> &'static str {
        match self {
            AggOp::Sum => "sum",
            AggOp::Mean => "mean",
            AggOp::Min => "min",
            AggOp::Max => "max",
            AggOp::Count => "count",
        }
    }

    /// Count works on any column; the rest need a numeric target.
    pub fn requires_numeric(self) -> bool {
        !matches!(self, AggOp::Count)
    }
}

impl fmt::Display for AggOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A group-by request: non-empty key columns, one target column, and the
/// reductions to apply. Ops are applied in the order given, duplicates once.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationSpec {
    pub keys: Vec<String>,
    pub target: String,
    pub ops: Vec<AggOp>,
}

/// Partition rows by the tuple of key-column values and reduce the target
/// column within each partition. Groups come back in first-seen key order,
/// never re-sorted; missing key values form their own group. The result
/// columns are the keys followed by one `{target}_{op}` column per op.
pub fn aggregate(table: &Table, spec: &AggregationSpec) -> Result<Table> {
    if spec.keys.is_empty() {
        return Err(Error::EmptyGroupKey);
    }

    let key_cols: Vec<&Column> = spec
        .keys
        .iter()
        .map(|name| table.column_or_err(name))
        .collect::<Result<_>>()?;
    let target = table.column_or_err(&spec.target)?;

    let mut ops: Vec<AggOp> = Vec::new();
    for op in &spec.ops {
        if !ops.contains(op) {
            ops.push(*op);
        }
    }
    for op in &ops {
        if op.requires_numeric() && !target.dtype().is_numeric() {
            return Err(Error::InvalidOperation(format!(
                "'{}' requires a numeric target column; '{}' is {}",
                op,
                spec.target,
                target.dtype()
            )));
        }
    }

    // Partition in first-seen order.
    let mut index: HashMap<_, usize> = HashMap::new();
    let mut group_keys: Vec<Vec<Value>> = Vec::new();
    let mut group_rows: Vec<Vec<usize>> = Vec::new();
    for row in 0..table.n_rows() {
        let key: Vec<_> = key_cols
            .iter()
            .map(|c| c.values()[row].group_key())
            .collect();
        match index.get(&key) {
            Some(&slot) => group_rows[slot].push(row),
            None => {
                index.insert(key, group_keys.len());
                group_keys.push(key_cols.iter().map(|c| c.values()[row].clone()).collect());
                group_rows.push(vec![row]);
            }
        }
    }
    debug!(
        "aggregate: {} rows into {} groups by {:?}",
        table.n_rows(),
        group_keys.len(),
        spec.keys
    );

    let mut columns = Vec::with_capacity(key_cols.len() + ops.len());
    for (i, key_col) in key_cols.iter().enumerate() {
        let values = group_keys.iter().map(|k| k[i].clone()).collect();
        columns.push(Column::new(key_col.name(), key_col.dtype(), values));
    }
    for op in &ops {
        let values = group_rows
            .iter()
            .map(|rows| reduce(*op, rows, target))
            .collect();
        let dtype = match op {
            AggOp::Count => DataType::Int,
            AggOp::Mean => DataType::Float,
            _ => target.dtype(),
        };
        columns.push(Column::new(
            format!("{}_{}", spec.target, op.name()),
            dtype,
            values,
        ));
    }

    Table::new(columns)
}

/// Reduce the target values at `rows`. Count counts every row; the numeric
/// ops skip missing values, so an all-missing group sums to zero and has no
/// mean/min/max.
fn reduce(op: AggOp, rows: &[usize], target: &Column) -> Value {
    if op == AggOp::Count {
        return Value::Int(rows.len() as i64);
    }

    if op == AggOp::Mean {
        let xs: Vec<f64> = rows
            .iter()
            .filter_map(|&r| target.values()[r].as_f64())
            .collect();
        if xs.is_empty() {
            return Value::Missing;
        }
        return Value::Float(xs.iter().sum::<f64>() / xs.len() as f64);
    }

    match target.dtype() {
        DataType::Int => {
            let xs: Vec<i64> = rows
                .iter()
                .filter_map(|&r| match target.values()[r] {
                    Value::Int(i) => Some(i),
                    _ => None,
                })
                .collect();
            match op {
                AggOp::Sum => Value::Int(xs.iter().sum()),
                AggOp::Min => xs.iter().min().map(|&m| Value::Int(m)).unwrap_or(Value::Missing),
                AggOp::Max => xs.iter().max().map(|&m| Value::Int(m)).unwrap_or(Value::Missing),
                _ => Value::Missing,
            }
        }
        _ => {
            let xs: Vec<f64> = rows
                .iter()
                .filter_map(|&r| target.values()[r].as_f64())
                .collect();
            match op {
                AggOp::Sum => Value::Float(xs.iter().sum()),
                AggOp::Min if xs.is_empty() => Value::Missing,
                AggOp::Min => Value::Float(xs.iter().cloned().fold(f64::INFINITY, f64::min)),
                AggOp::Max if xs.is_empty() => Value::Missing,
                AggOp::Max => Value::Float(xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max)),
                _ => Value::Missing,
            }
        }
    }
}
