//! Tables
//!
//! A table owns rows sorted ascending by id plus one optional sorted index
//! per column. Upsert keeps every maintained index in sync: replacing a row
//! deletes the old (key, id) pairs before the slot is overwritten and inserts
//! the new pairs after. The table itself is a sorted column over its primary
//! key, so it plugs into the iterator layer directly.

mod errors;

pub use errors::{TableError, TableResult};

use std::rc::Rc;

use crate::index::{Kv, SortedIndex};
use crate::iter::IterColumn;
use crate::row::Row;
use crate::schema::{ColumnDef, Schema};
use crate::sortable::{Key, Sortable};

/// Rows sorted by id with per-column secondary indexes.
pub struct Table {
    schema: Rc<Schema>,
    rows: Vec<Row>,
    indexes: Vec<Option<SortedIndex>>,
}

/// The sortable key a stored row holds in column `idx`.
///
/// Panics when the slot is absent or not sortable; maintaining an index over
/// such a column is a schema bug.
fn column_key(row: &Row, idx: usize) -> Key {
    row.slot(idx)
        .and_then(crate::types::Value::as_key)
        .unwrap_or_else(|| {
            panic!(
                "indexed column {} must hold a sortable value",
                row.schema().column(idx).field_name
            )
        })
}

impl Table {
    /// Creates an empty table for `schema` with room for `capacity` rows.
    pub fn new(schema: &Rc<Schema>, capacity: usize) -> Self {
        Table {
            schema: Rc::clone(schema),
            rows: Vec::with_capacity(capacity),
            indexes: vec![None; schema.len()],
        }
    }

    /// The table's schema.
    pub fn schema(&self) -> &Rc<Schema> {
        &self.schema
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows, ascending by id.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// First position whose row id is not less than `id`.
    fn search(&self, id: &Key) -> usize {
        let mut i = 0;
        let mut j = self.rows.len();
        while i < j {
            let h = (i + j) >> 1;
            let key = self.rows[h].id_key().expect("stored rows have sortable ids");
            if key.sort_less(id) {
                i = h + 1;
            } else {
                j = h;
            }
        }
        i
    }

    /// Inserts the row, or replaces the row with the same id.
    ///
    /// Every maintained index stays in sync: a replacement deletes the old
    /// row's (key, id) pairs before the slot is overwritten, and the new
    /// pairs are inserted after.
    pub fn upsert(&mut self, row: Row) -> TableResult<()> {
        if !Rc::ptr_eq(row.schema(), &self.schema) {
            return Err(TableError::SchemaMismatch);
        }
        let id = match row.id() {
            None => return Err(TableError::IdMissing),
            Some(v) => v.as_key().ok_or(TableError::IdNotSortable)?,
        };

        let at = self.search(&id);
        let replacing = at < self.rows.len()
            && id.sort_equal(&self.rows[at].id_key().expect("stored rows have sortable ids"));

        if replacing {
            for (idx, slot) in self.indexes.iter_mut().enumerate() {
                let Some(index) = slot else { continue };
                index.delete(&Kv {
                    k: column_key(&self.rows[at], idx),
                    v: id.clone(),
                });
            }
            self.rows[at] = row;
        } else {
            self.rows.insert(at, row);
        }

        for (idx, slot) in self.indexes.iter_mut().enumerate() {
            let Some(index) = slot else { continue };
            index.insert(Kv {
                k: column_key(&self.rows[at], idx),
                v: id.clone(),
            });
        }
        Ok(())
    }

    /// The row stored under `id`.
    pub fn get(&self, id: &Key) -> Option<&Row> {
        let at = self.search(id);
        let row = self.rows.get(at)?;
        let key = row.id_key().expect("stored rows have sortable ids");
        key.sort_equal(id).then_some(row)
    }

    /// Builds (or rebuilds) the sorted index over `col` from the current
    /// rows and starts maintaining it.
    pub fn create_index(&mut self, col: &ColumnDef) -> &SortedIndex {
        let mut index = SortedIndex::with_capacity(self.rows.capacity());
        for row in &self.rows {
            index.insert(Kv {
                k: column_key(row, col.idx),
                v: row.id_key().expect("stored rows have sortable ids"),
            });
        }
        self.indexes[col.idx] = Some(index);
        self.indexes[col.idx].as_ref().expect("index just created")
    }

    /// Stops maintaining the index over `col` and drops it.
    pub fn delete_index(&mut self, col: &ColumnDef) {
        self.indexes[col.idx] = None;
    }

    /// True when an index over `col` is maintained.
    pub fn has_index(&self, col: &ColumnDef) -> bool {
        self.indexes[col.idx].is_some()
    }

    /// The maintained index over `col`, when present.
    pub fn index(&self, col: &ColumnDef) -> Option<&SortedIndex> {
        self.indexes[col.idx].as_ref()
    }
}

impl IterColumn for Table {
    fn key(&self, i: usize) -> Key {
        self.rows[i].id_key().expect("stored rows have sortable ids")
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}
