use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{Error, Result};

/// A single cell. Missing is explicit and never coerced to zero or "".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    DateTime(NaiveDateTime),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn dtype(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Float(_) => DataType::Float,
            Value::Str(_) => DataType::Str,
            Value::Bool(_) => DataType::Bool,
            Value::DateTime(_) => DataType::DateTime,
            Value::Missing => DataType::Null,
        }
    }

    /// Canonical text rendering used when writing a table back out as CSV.
    pub(crate) fn to_csv_field(&self) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Missing => String::new(),
        }
    }

    /// Hashable identity used for grouping and counting. Floats compare by
    /// bit pattern; NaN never occurs in a loaded table (it is a missing
    /// marker), so this matches value equality.
    pub(crate) fn group_key(&self) -> GroupKey {
        match self {
            Value::Int(i) => GroupKey::Int(*i),
            Value::Float(f) => GroupKey::Float(f.to_bits()),
            Value::Str(s) => GroupKey::Str(s.clone()),
            Value::Bool(b) => GroupKey::Bool(*b),
            Value::DateTime(dt) => GroupKey::DateTime(*dt),
            Value::Missing => GroupKey::Missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum GroupKey {
    Int(i64),
    Float(u64),
    Str(String),
    Bool(bool),
    DateTime(NaiveDateTime),
    Missing,
}

/// Semantic type of a column, inferred once at load time.
/// `Null` marks a column with no non-missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Float,
    Str,
    Bool,
    DateTime,
    Null,
}

impl DataType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Int | DataType::Float)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int => "int64",
            DataType::Float => "float64",
            DataType::Str => "str",
            DataType::Bool => "bool",
            DataType::DateTime => "datetime",
            DataType::Null => "null",
        };
        write!(f, "{}", name)
    }
}

/// A named, homogeneously typed sequence of values.
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    name: String,
    dtype: DataType,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DataType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An immutable in-memory table: ordered columns of equal length with unique
/// names. Every transformation in the pipeline produces a fresh Table.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            for col in &columns {
                if col.len() != expected {
                    return Err(Error::Parse(format!(
                        "column '{}' has {} rows, expected {}",
                        col.name(),
                        col.len(),
                        expected
                    )));
                }
            }
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name() == col.name()) {
                return Err(Error::Parse(format!(
                    "duplicate column name '{}'",
                    col.name()
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub(crate) fn column_or_err(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    pub fn dtypes(&self) -> Vec<(String, DataType)> {
        self.columns
            .iter()
            .map(|c| (c.name().to_string(), c.dtype()))
            .collect()
    }

    /// Sub-table of rows `[start, end)`, bounds clamped to the row count.
    pub fn slice_rows(&self, start: usize, end: usize) -> Table {
        let n = self.n_rows();
        let start = start.min(n);
        let end = end.clamp(start, n);
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name(), c.dtype(), c.values()[start..end].to_vec()))
            .collect();
        Table { columns }
    }

    /// Canonical delimited-text rendering: reloading the output reproduces
    /// the same column names, types, and cell values.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.columns.iter().map(Column::name))?;
        for row in 0..self.n_rows() {
            writer.write_record(self.columns.iter().map(|c| c.values()[row].to_csv_field()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Parse(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| Error::Parse(e.to_string()))
    }
}
