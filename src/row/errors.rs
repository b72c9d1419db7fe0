//! Row operation errors

use thiserror::Error;

use crate::types::{ConvertError, ElementType};

/// Result type for row operations
pub type RowResult<T> = Result<T, RowError>;

/// Row errors
#[derive(Debug, Error)]
pub enum RowError {
    #[error("can't convert field '{field}' value to {target}: {source}")]
    FieldConversion {
        field: String,
        target: ElementType,
        source: ConvertError,
    },

    #[error("can't convert json field {field} to {target}: {source}")]
    JsonFieldConversion {
        field: String,
        target: ElementType,
        source: ConvertError,
    },

    #[error("no such field: {model}.{field}")]
    UnknownField { model: String, field: String },

    #[error("source must be a struct")]
    SourceNotAStruct,

    #[error("struct bridge: {0}")]
    Bridge(#[from] serde_json::Error),
}

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Column-scan errors; source failures surface unchanged.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan source: {0}")]
    Source(String),

    #[error("scan column '{column}': {source}")]
    Column {
        column: String,
        source: ConvertError,
    },
}
