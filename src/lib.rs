// Library exports for datalens

pub mod aggregate;
pub mod chart;
pub mod counts;
pub mod error;
pub mod loader;
pub mod summary;
pub mod table;

pub use aggregate::{aggregate, AggOp, AggregationSpec};
pub use chart::{build_chart, ChartKind, ChartSpec, RoleMap};
pub use counts::{value_counts, CountResult};
pub use error::{Error, Result};
pub use loader::{load, load_sheet, FormatHint};
pub use summary::{describe, dtypes, head, shape, tail, ColumnStats, SummaryReport};
pub use table::{Column, DataType, Table, Value};
