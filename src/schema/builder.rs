//! Schema builder
//!
//! Schemas are built explicitly, one call per field, in declaration order.
//! Tag strings keep the grammar of the store this format migrated from:
//!
//! - `db`: store column name, `-` excludes the field entirely
//! - `store`: `-` skips storage, `cascade`, `foreignKey:<name>`,
//!   `many2many:<table>`
//! - `json`: JSON key and the `omitempty` flag, `-` excludes from JSON
//! - `validate`: per-field predicate string, opaque here

use std::collections::HashMap;
use std::rc::Rc;

use crate::schema::errors::{SchemaError, SchemaResult};
use crate::schema::relation::{Relation, RelationKind};
use crate::schema::types::{ColumnDef, Schema};
use crate::schema::{CREATED_AT_FIELD, DELETED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use crate::types::ElementType;

/// Per-field tag strings, bit-exact with the migrated format.
#[derive(Debug, Clone, Default)]
pub struct Tags {
    db: Option<String>,
    store: Option<String>,
    json: Option<String>,
    validate: Option<String>,
}

impl Tags {
    /// No tags.
    pub fn new() -> Self {
        Tags::default()
    }

    /// Sets the `db` tag (store column name, `-` excludes).
    pub fn db(mut self, v: impl Into<String>) -> Self {
        self.db = Some(v.into());
        self
    }

    /// Sets the `store` tag.
    pub fn store(mut self, v: impl Into<String>) -> Self {
        self.store = Some(v.into());
        self
    }

    /// Sets the `json` tag (key name, optional `omitempty`).
    pub fn json(mut self, v: impl Into<String>) -> Self {
        self.json = Some(v.into());
        self
    }

    /// Sets the `validate` tag.
    pub fn validate(mut self, v: impl Into<String>) -> Self {
        self.validate = Some(v.into());
        self
    }
}

/// JSON key a field serializes under: the tag name, the field name when the
/// tag is absent, or empty when the tag opts out.
fn json_field_name(field_name: &str, tags: &Tags) -> String {
    match &tags.json {
        None => field_name.to_string(),
        Some(tag) => {
            let name = tag.split(',').next().unwrap_or("");
            if name == "-" {
                String::new()
            } else if name.is_empty() {
                field_name.to_string()
            } else {
                name.to_string()
            }
        }
    }
}

struct FieldSpec {
    field_name: String,
    element: Option<ElementType>,
    nullable: bool,
    kind: RelationKind,
    related_element: Option<ElementType>,
    tags: Tags,
}

/// Builds an immutable [`Schema`], one field per call, in declaration order.
pub struct SchemaBuilder {
    name: String,
    store_name: String,
    fields: Vec<FieldSpec>,
}

impl SchemaBuilder {
    /// Starts a schema for the named model and backing store.
    pub fn new(name: impl Into<String>, store_name: impl Into<String>) -> Self {
        SchemaBuilder {
            name: name.into(),
            store_name: store_name.into(),
            fields: Vec::new(),
        }
    }

    /// Declares a data field.
    pub fn field(mut self, field_name: impl Into<String>, element: ElementType, tags: Tags) -> Self {
        self.fields.push(FieldSpec {
            field_name: field_name.into(),
            element: Some(element),
            nullable: false,
            kind: RelationKind::None,
            related_element: None,
            tags,
        });
        self
    }

    /// Declares a nullable data field: it accepts the explicit null sentinel.
    pub fn optional(
        mut self,
        field_name: impl Into<String>,
        element: ElementType,
        tags: Tags,
    ) -> Self {
        self.fields.push(FieldSpec {
            field_name: field_name.into(),
            element: Some(element),
            nullable: true,
            kind: RelationKind::None,
            related_element: None,
            tags,
        });
        self
    }

    /// Declares a relation field.
    ///
    /// `related_element` is the element type on the far side of the linkage:
    /// for belongs-to, the target model's id type (checked against the local
    /// `<Field>ID` foreign-key column); for has-one/has-many, the target's
    /// foreign-key type (checked against this model's id).
    pub fn relation(
        mut self,
        field_name: impl Into<String>,
        kind: RelationKind,
        related_element: ElementType,
        tags: Tags,
    ) -> Self {
        assert!(
            kind != RelationKind::None,
            "use field() for plain data columns"
        );
        self.fields.push(FieldSpec {
            field_name: field_name.into(),
            element: None,
            nullable: false,
            kind,
            related_element: Some(related_element),
            tags,
        });
        self
    }

    /// Finishes construction.
    pub fn build(self) -> SchemaResult<Rc<Schema>> {
        let mut columns: Vec<ColumnDef> = Vec::with_capacity(self.fields.len());
        let mut by_name = HashMap::new();
        let mut by_field_name = HashMap::new();
        let mut by_json_name = HashMap::new();
        let mut relations: Vec<(usize, RelationKind, ElementType)> = Vec::new();

        for spec in &self.fields {
            let db_tag = spec.tags.db.as_deref();
            if db_tag == Some("-") {
                continue;
            }
            let name = db_tag
                .map(str::to_string)
                .unwrap_or_else(|| spec.field_name.to_lowercase());

            let mut relation = Relation {
                kind: spec.kind,
                ..Relation::default()
            };
            let mut skip = false;
            if let Some(store_tag) = spec.tags.store.as_deref() {
                skip = store_tag == "-";
                if !relation.parse_tag(store_tag) {
                    // an ignored relation degrades to an unstored data column
                    relation = Relation::none();
                }
            }

            let idx = columns.len();
            let column = ColumnDef {
                idx,
                field_name: spec.field_name.clone(),
                name,
                json_name: json_field_name(&spec.field_name, &spec.tags),
                json_omit_empty: spec
                    .tags
                    .json
                    .as_deref()
                    .is_some_and(|t| t.contains("omitempty")),
                element: spec.element,
                nullable: spec.nullable,
                skip,
                is_foreign_key: false,
                related: None,
                relation,
                validate: spec.tags.validate.clone().unwrap_or_default(),
            };

            if by_name.contains_key(&column.name) {
                return Err(SchemaError::DuplicateColumn(column.name));
            }
            by_name.insert(column.name.clone(), idx);
            by_field_name.insert(column.field_name.clone(), idx);
            if column.json_name.is_empty() {
                by_json_name.insert(column.field_name.clone(), idx);
            } else {
                by_json_name.insert(column.json_name.clone(), idx);
            }

            if column.relation.kind != RelationKind::None {
                let related = spec
                    .related_element
                    .expect("relation fields declare a related element type");
                relations.push((idx, column.relation.kind, related));
            }
            columns.push(column);
        }

        let id = *by_field_name
            .get(ID_FIELD)
            .ok_or_else(|| SchemaError::MissingIdField {
                model: self.name.clone(),
            })?;
        let id_element = columns[id].element_type();
        if !id_element.is_sortable() {
            return Err(SchemaError::IdNotSortable {
                model: self.name.clone(),
                element: id_element,
            });
        }

        for (idx, kind, related_element) in relations {
            match kind {
                RelationKind::BelongsTo => {
                    // the owning side carries a `<Field>ID` foreign-key column
                    let fk_field = format!("{}{ID_FIELD}", columns[idx].field_name);
                    let fk_idx =
                        *by_field_name
                            .get(&fk_field)
                            .ok_or_else(|| SchemaError::MissingField {
                                model: self.name.clone(),
                                field: fk_field.clone(),
                            })?;
                    let fk_element = columns[fk_idx].element_type();
                    if fk_element != related_element {
                        return Err(SchemaError::ForeignKeyTypeMismatch {
                            model: self.name.clone(),
                            fk_field,
                            expected: related_element,
                            found: fk_element,
                        });
                    }
                    columns[fk_idx].is_foreign_key = true;
                    columns[fk_idx].related = Some(idx);
                    columns[idx].related = Some(fk_idx);
                }
                RelationKind::HasOne | RelationKind::HasMany => {
                    if columns[idx].relation.foreign_key.is_empty() {
                        columns[idx].relation.foreign_key = format!("{}{ID_FIELD}", self.name);
                    }
                    if related_element != id_element {
                        return Err(SchemaError::ForeignKeyTypeMismatch {
                            model: self.name.clone(),
                            fk_field: columns[idx].relation.foreign_key.clone(),
                            expected: id_element,
                            found: related_element,
                        });
                    }
                }
                RelationKind::ManyToMany => {
                    if columns[idx].relation.join_table.is_none() {
                        return Err(SchemaError::MissingJoinTable {
                            model: self.name.clone(),
                            field: columns[idx].field_name.clone(),
                        });
                    }
                }
                RelationKind::None => unreachable!(),
            }
        }

        let special = |field: &str| by_field_name.get(field).copied();

        Ok(Rc::new(Schema {
            name: self.name,
            store_name: self.store_name,
            id,
            created_at: special(CREATED_AT_FIELD),
            updated_at: special(UPDATED_AT_FIELD),
            deleted_at: special(DELETED_AT_FIELD),
            columns,
            by_name,
            by_field_name,
            by_json_name,
        }))
    }
}
