use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;

use crate::error::{Error, Result};
use crate::table::{Column, DataType, Table, Value};

/// Cell text treated as an explicit missing value rather than data.
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "null", "NULL", "NaN", "nan"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Declared format of an uploaded byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Csv,
    Xlsx,
}

impl FormatHint {
    /// Derive the hint from an uploaded file's name.
    pub fn from_filename(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Ok(FormatHint::Csv)
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Ok(FormatHint::Xlsx)
        } else {
            Err(Error::UnsupportedFormat(name.to_string()))
        }
    }
}

/// Parse an uploaded byte stream into a typed Table. The stream is read fully
/// once and not retained. Spreadsheets load their first sheet.
pub fn load(bytes: &[u8], hint: FormatHint) -> Result<Table> {
    match hint {
        FormatHint::Csv => load_csv(bytes),
        FormatHint::Xlsx => load_xlsx(bytes, None),
    }
}

/// Parse a named sheet of a spreadsheet byte stream (first sheet if None).
pub fn load_sheet(bytes: &[u8], sheet: Option<&str>) -> Result<Table> {
    load_xlsx(bytes, sheet)
}

/// A cell as read from the source, before column type inference.
/// Spreadsheet cells arrive already typed; CSV cells are text.
enum RawCell {
    Text(String),
    Typed(Value),
}

fn load_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut cells: Vec<Vec<RawCell>> = headers.iter().map(|_| Vec::new()).collect();
    for record in reader.records() {
        let record = record?;
        for (i, field) in record.iter().enumerate() {
            cells[i].push(RawCell::Text(field.to_string()));
        }
    }

    build_table(headers, cells)
}

fn load_xlsx(bytes: &[u8], sheet: Option<&str>) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| Error::Parse("workbook has no sheets".to_string()))?,
    };
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Ok(Table::empty()),
    };

    let mut cells: Vec<Vec<RawCell>> = headers.iter().map(|_| Vec::new()).collect();
    for row in rows {
        for (i, slot) in cells.iter_mut().enumerate() {
            slot.push(raw_cell(row.get(i).unwrap_or(&Data::Empty)));
        }
    }

    build_table(headers, cells)
}

fn raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Typed(Value::Missing),
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Int(i) => RawCell::Typed(Value::Int(*i)),
        Data::Float(f) => RawCell::Typed(Value::Float(*f)),
        Data::Bool(b) => RawCell::Typed(Value::Bool(*b)),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => RawCell::Typed(Value::DateTime(ndt)),
            None => RawCell::Typed(Value::Missing),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
    }
}

fn build_table(headers: Vec<String>, cells: Vec<Vec<RawCell>>) -> Result<Table> {
    let columns: Vec<Column> = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw))
        .collect();
    let table = Table::new(columns)?;
    debug!(
        "loaded table: {} rows, {} columns",
        table.n_rows(),
        table.n_cols()
    );
    Ok(table)
}

/// Infer a column's type over its non-missing cells, then coerce every cell.
/// Tiers, in order: Int, Float, DateTime, Bool, Str. A column with no
/// non-missing cells is Null.
fn infer_column(name: String, raw: Vec<RawCell>) -> Column {
    let dtype = infer_dtype(&raw);
    let values = raw.into_iter().map(|cell| coerce(cell, dtype)).collect();
    Column::new(name, dtype, values)
}

fn infer_dtype(raw: &[RawCell]) -> DataType {
    let present: Vec<&RawCell> = raw.iter().filter(|c| !cell_is_missing(c)).collect();
    if present.is_empty() {
        DataType::Null
    } else if present.iter().all(|c| as_int(c).is_some()) {
        DataType::Int
    } else if present.iter().all(|c| as_float(c).is_some()) {
        DataType::Float
    } else if present.iter().all(|c| as_datetime(c).is_some()) {
        DataType::DateTime
    } else if present.iter().all(|c| as_bool(c).is_some()) {
        DataType::Bool
    } else {
        DataType::Str
    }
}

fn cell_is_missing(cell: &RawCell) -> bool {
    match cell {
        RawCell::Text(t) => MISSING_MARKERS.contains(&t.trim()),
        RawCell::Typed(v) => v.is_missing(),
    }
}

fn as_int(cell: &RawCell) -> Option<i64> {
    match cell {
        RawCell::Text(t) => t.trim().parse::<i64>().ok(),
        RawCell::Typed(Value::Int(i)) => Some(*i),
        // Spreadsheets store every number as a float; a column of whole
        // floats reads back as an integer column.
        RawCell::Typed(Value::Float(f)) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
        RawCell::Typed(_) => None,
    }
}

fn as_float(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Text(t) => t.trim().parse::<f64>().ok(),
        RawCell::Typed(Value::Int(i)) => Some(*i as f64),
        RawCell::Typed(Value::Float(f)) => Some(*f),
        RawCell::Typed(_) => None,
    }
}

fn as_datetime(cell: &RawCell) -> Option<NaiveDateTime> {
    match cell {
        RawCell::Text(t) => parse_datetime(t.trim()),
        RawCell::Typed(Value::DateTime(dt)) => Some(*dt),
        RawCell::Typed(_) => None,
    }
}

fn as_bool(cell: &RawCell) -> Option<bool> {
    match cell {
        RawCell::Text(t) => {
            let t = t.trim();
            if t.eq_ignore_ascii_case("true") {
                Some(true)
            } else if t.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        RawCell::Typed(Value::Bool(b)) => Some(*b),
        RawCell::Typed(_) => None,
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

fn coerce(cell: RawCell, dtype: DataType) -> Value {
    if cell_is_missing(&cell) {
        return Value::Missing;
    }
    match dtype {
        DataType::Null => Value::Missing,
        DataType::Int => as_int(&cell).map(Value::Int).unwrap_or(Value::Missing),
        DataType::Float => as_float(&cell).map(Value::Float).unwrap_or(Value::Missing),
        DataType::DateTime => as_datetime(&cell)
            .map(Value::DateTime)
            .unwrap_or(Value::Missing),
        DataType::Bool => as_bool(&cell).map(Value::Bool).unwrap_or(Value::Missing),
        DataType::Str => match cell {
            RawCell::Text(t) => Value::Str(t),
            RawCell::Typed(v) => Value::Str(v.to_csv_field()),
        },
    }
}
