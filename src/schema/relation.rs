//! Relation metadata
//!
//! Relations are discovered from the schema and carried for outside
//! consumers; the iterator core never reads them. The `store` tag grammar is
//! kept bit-exact: `-` ignores the field, `cascade` marks cascading writes,
//! `foreignKey:<name>` and `many2many:<table>` name the linkage.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of relation a column describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    /// Plain data column
    #[default]
    None,
    /// One related row holding this model's foreign key
    HasOne,
    /// Many related rows holding this model's foreign key
    HasMany,
    /// This model holds the related row's foreign key
    BelongsTo,
    /// Linked through a join table
    ManyToMany,
}

/// Relation metadata attached to a column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation kind; `None` for plain data columns
    pub kind: RelationKind,
    /// Foreign-key field name on the owning side
    pub foreign_key: String,
    /// Join table for many-to-many relations
    pub join_table: Option<String>,
    /// Load the related rows together with the owner
    pub preload: bool,
    /// Writes cascade to the related rows
    pub cascade: bool,
}

impl Relation {
    /// A plain data column's (non-)relation.
    pub fn none() -> Self {
        Relation::default()
    }

    /// Parses the `store` tag options into this relation.
    ///
    /// Returns false when the tag says to ignore the field (`-`).
    pub fn parse_tag(&mut self, tag: &str) -> bool {
        for option in tag.split(',') {
            let option = option.trim();
            match option {
                "-" => return false,
                "cascade" => self.cascade = true,
                _ => {
                    let Some((k, v)) = option.split_once(':') else {
                        continue;
                    };
                    match k.trim() {
                        "foreignKey" => self.foreign_key = v.trim().to_string(),
                        "many2many" => self.join_table = Some(v.trim().to_string()),
                        _ => {}
                    }
                }
            }
        }
        true
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preload = if self.preload { " preload" } else { "" };
        match self.kind {
            RelationKind::None => write!(f, "-"),
            RelationKind::HasOne => write!(f, "HasOne (FK: {}){}", self.foreign_key, preload),
            RelationKind::HasMany => write!(f, "HasMany (FK: {}){}", self.foreign_key, preload),
            RelationKind::BelongsTo => write!(f, "BelongsTo{preload}"),
            RelationKind::ManyToMany => write!(
                f,
                "Many2Many (FK: {}){}",
                self.join_table.as_deref().unwrap_or(""),
                preload
            ),
        }
    }
}
