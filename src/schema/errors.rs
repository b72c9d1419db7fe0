//! Schema construction and lookup errors

use thiserror::Error;

use crate::types::ElementType;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema errors, all fatal to the schema under construction.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    #[error("column name not unique: '{0}'")]
    DuplicateColumn(String),

    #[error("{model}: no 'ID' field")]
    MissingIdField { model: String },

    #[error("{model}: id column element type {element} is not sortable")]
    IdNotSortable { model: String, element: ElementType },

    #[error("no such field: {model}.{field}")]
    MissingField { model: String, field: String },

    #[error("field type ({model}.{fk_field}) mismatch: {found}/{expected}")]
    ForeignKeyTypeMismatch {
        model: String,
        fk_field: String,
        expected: ElementType,
        found: ElementType,
    },

    #[error("{model}.{field}: many-to-many relation declares no join table")]
    MissingJoinTable { model: String, field: String },
}
