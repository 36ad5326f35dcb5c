use thiserror::Error;

/// Errors surfaced to the UI host. Every error is terminal for the single
/// interaction that triggered it; no pipeline state survives a failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported format: '{0}'")]
    UnsupportedFormat(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("column not found: '{0}'")]
    ColumnNotFound(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("group-by requires at least one key column")]
    EmptyGroupKey,

    #[error("{kind} chart requires role '{role}'")]
    MissingRole {
        kind: &'static str,
        role: &'static str,
    },
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<calamine::XlsxError> for Error {
    fn from(err: calamine::XlsxError) -> Self {
        Error::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
