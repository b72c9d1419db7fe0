//! Schema descriptors
//!
//! A schema is the immutable description of a row type: an ordered column
//! vector with name lookups, designated special columns, and relation
//! metadata. Construction is an explicit one-shot through [`SchemaBuilder`];
//! the tag grammar (`db`, `store`, `json`, `validate`) is kept bit-exact with
//! the store this format migrated from.

mod builder;
mod errors;
mod relation;
mod types;

pub use builder::{SchemaBuilder, Tags};
pub use errors::{SchemaError, SchemaResult};
pub use relation::{Relation, RelationKind};
pub use types::{ColumnDef, Schema};

/// Reserved field name of the primary key column.
pub const ID_FIELD: &str = "ID";
/// Reserved field name of the creation timestamp column.
pub const CREATED_AT_FIELD: &str = "CreatedAt";
/// Reserved field name of the update timestamp column.
pub const UPDATED_AT_FIELD: &str = "UpdatedAt";
/// Reserved field name of the soft-delete timestamp column.
pub const DELETED_AT_FIELD: &str = "DeletedAt";
