//! Table operation errors

use thiserror::Error;

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Table errors; the table is unchanged when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("row schema is not the table's schema")]
    SchemaMismatch,

    #[error("row id field is not set")]
    IdMissing,

    #[error("row id value is not sortable")]
    IdNotSortable,
}
