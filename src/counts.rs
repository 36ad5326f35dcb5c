use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;
use crate::table::{Column, DataType, Table, Value};

/// Frequency table for one column: (value, count) pairs in descending count
/// order, ties kept in first-seen order, truncated to the requested top-N.
#[derive(Debug, Clone, Serialize)]
pub struct CountResult {
    pub column: String,
    pub entries: Vec<(Value, u64)>,
}

impl CountResult {
    /// Reshape into a two-column table (value column named after the source,
    /// plus a count column) so the result can feed the chart builder.
    pub fn to_table(&self) -> Result<Table> {
        let dtype = self
            .entries
            .iter()
            .map(|(v, _)| v.dtype())
            .find(|d| *d != DataType::Null)
            .unwrap_or(DataType::Null);
        let count_name = if self.column == "count" {
            format!("{}_count", self.column)
        } else {
            "count".to_string()
        };

        let values = self.entries.iter().map(|(v, _)| v.clone()).collect();
        let counts = self
            .entries
            .iter()
            .map(|(_, n)| Value::Int(*n as i64))
            .collect();
        Table::new(vec![
            Column::new(self.column.clone(), dtype, values),
            Column::new(count_name, DataType::Int, counts),
        ])
    }
}

/// Count occurrences of every value in `column` (missing is a category of its
/// own) and keep the `top` most frequent.
pub fn value_counts(table: &Table, column: &str, top: usize) -> Result<CountResult> {
    let col = table.column_or_err(column)?;

    let mut index: HashMap<_, usize> = HashMap::new();
    let mut entries: Vec<(Value, u64)> = Vec::new();
    for value in col.values() {
        let key = value.group_key();
        match index.get(&key) {
            Some(&slot) => entries[slot].1 += 1,
            None => {
                index.insert(key, entries.len());
                entries.push((value.clone(), 1));
            }
        }
    }

    // Stable sort: equal counts keep first-seen order.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(top);

    Ok(CountResult {
        column: column.to_string(),
        entries,
    })
}
