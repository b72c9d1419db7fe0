//! Column and schema descriptors

use std::collections::HashMap;

use crate::schema::relation::{Relation, RelationKind};
use crate::types::ElementType;

/// Describes one column of a row type.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Position in the schema's column vector
    pub idx: usize,
    /// Declared (record) field name, e.g. `ID`
    pub field_name: String,
    /// Store column name, e.g. `id`
    pub name: String,
    /// JSON object key; empty when the field is excluded from JSON
    pub json_name: String,
    /// Omit zero values when serializing
    pub json_omit_empty: bool,
    /// Element type; `None` only for relation columns
    pub element: Option<ElementType>,
    /// Accepts the explicit null sentinel
    pub nullable: bool,
    /// Excluded from storage by the `store:"-"` tag
    pub skip: bool,
    /// This column holds another model's key
    pub is_foreign_key: bool,
    /// Position of the related column, when part of a relation pair
    pub related: Option<usize>,
    /// Relation metadata
    pub relation: Relation,
    /// Opaque validation predicate string
    pub validate: String,
}

impl ColumnDef {
    /// True when this column participates in storage and indexing.
    pub fn is_stored(&self) -> bool {
        !self.skip && self.relation.kind == RelationKind::None
    }

    /// The element type of a stored column.
    ///
    /// # Panics
    ///
    /// Panics on relation columns, which carry no element type.
    pub fn element_type(&self) -> ElementType {
        self.element
            .unwrap_or_else(|| panic!("column '{}' is a relation and has no element type", self.field_name))
    }
}

/// Immutable description of a row type.
#[derive(Debug)]
pub struct Schema {
    pub(crate) name: String,
    pub(crate) store_name: String,
    pub(crate) columns: Vec<ColumnDef>,
    pub(crate) by_name: HashMap<String, usize>,
    pub(crate) by_field_name: HashMap<String, usize>,
    pub(crate) by_json_name: HashMap<String, usize>,
    pub(crate) id: usize,
    pub(crate) created_at: Option<usize>,
    pub(crate) updated_at: Option<usize>,
    pub(crate) deleted_at: Option<usize>,
}

impl Schema {
    /// Starts building a schema for the named model and store.
    pub fn builder(
        name: impl Into<String>,
        store_name: impl Into<String>,
    ) -> crate::schema::SchemaBuilder {
        crate::schema::SchemaBuilder::new(name, store_name)
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing store name.
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// The ordered column vector.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// The column at position `idx`.
    pub fn column(&self, idx: usize) -> &ColumnDef {
        &self.columns[idx]
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the schema declares no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Looks a column up by store name.
    pub fn column_by_name(&self, name: &str) -> Option<&ColumnDef> {
        self.by_name.get(name).map(|&i| &self.columns[i])
    }

    /// Looks a column up by declared field name.
    pub fn column_by_field_name(&self, field_name: &str) -> Option<&ColumnDef> {
        self.by_field_name.get(field_name).map(|&i| &self.columns[i])
    }

    /// Looks a column up by JSON key (falling back to the field name for
    /// fields without a `json` tag).
    pub fn column_by_json_name(&self, json_name: &str) -> Option<&ColumnDef> {
        self.by_json_name.get(json_name).map(|&i| &self.columns[i])
    }

    /// The primary key column.
    pub fn id_column(&self) -> &ColumnDef {
        &self.columns[self.id]
    }

    /// The creation timestamp column, when declared.
    pub fn created_at_column(&self) -> Option<&ColumnDef> {
        self.created_at.map(|i| &self.columns[i])
    }

    /// The update timestamp column, when declared.
    pub fn updated_at_column(&self) -> Option<&ColumnDef> {
        self.updated_at.map(|i| &self.columns[i])
    }

    /// The soft-delete timestamp column, when declared.
    pub fn deleted_at_column(&self) -> Option<&ColumnDef> {
        self.deleted_at.map(|i| &self.columns[i])
    }

    /// True when `idx` designates a reserved timestamp column.
    pub fn is_timestamp_column(&self, idx: usize) -> bool {
        self.created_at == Some(idx) || self.updated_at == Some(idx) || self.deleted_at == Some(idx)
    }

    /// Store names of the stored columns, in column order.
    pub fn stored_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_stored())
            .map(|c| c.name.as_str())
            .collect()
    }
}
