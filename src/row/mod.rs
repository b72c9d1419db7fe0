//! Dynamic rows
//!
//! A row is a heterogeneous tuple bound to a schema: one slot per column,
//! each slot absent, explicitly null, or holding a typed value. Slot storage
//! is pooled; dropping (or closing) a row recycles it.

mod errors;
mod json;
pub mod pool;
mod scan;

pub use errors::{RowError, RowResult, ScanError, ScanResult};
pub use scan::{RowSource, TypedHole};

use std::rc::Rc;

use crate::schema::{ColumnDef, Schema};
use crate::sortable::Key;
use crate::types::{convert_to, Value};

pub(crate) use scan::ScanBinding;

/// A heterogeneous tuple bound to a schema.
pub struct Row {
    schema: Rc<Schema>,
    slots: Vec<Option<Value>>,
    scan: Option<ScanBinding>,
}

impl Row {
    /// Creates a row with every slot absent; storage comes from the pool.
    pub fn new(schema: &Rc<Schema>) -> Self {
        Row {
            schema: Rc::clone(schema),
            slots: pool::acquire_slots(schema.len()),
            scan: None,
        }
    }

    /// Creates a row that inherits another row's scan binding, for reuse
    /// across the iterations of one result-set loop.
    pub fn new_with_binding(schema: &Rc<Schema>, from: &Row) -> Self {
        let mut row = Row::new(schema);
        row.scan = from.scan.clone();
        row
    }

    /// The schema this row is bound to.
    pub fn schema(&self) -> &Rc<Schema> {
        &self.schema
    }

    /// Sets a field, converting the value to the column's element type when
    /// the runtime shapes differ. Unstored columns accept any value as-is.
    pub fn set_field(&mut self, col: &ColumnDef, v: Value) -> RowResult<()> {
        if !col.is_stored() {
            self.slots[col.idx] = Some(v);
            return Ok(());
        }
        let target = col.element_type();
        if v.element_type() == Some(target) {
            self.slots[col.idx] = Some(v);
            return Ok(());
        }
        let converted =
            convert_to(Some(v), target, col.nullable).map_err(|source| RowError::FieldConversion {
                field: col.field_name.clone(),
                target,
                source,
            })?;
        self.slots[col.idx] = Some(converted);
        Ok(())
    }

    /// Sets a field addressed by its declared field name.
    pub fn set(&mut self, field_name: &str, v: Value) -> RowResult<()> {
        let schema = Rc::clone(&self.schema);
        let col = schema
            .column_by_field_name(field_name)
            .ok_or_else(|| RowError::UnknownField {
                model: schema.name().to_string(),
                field: field_name.to_string(),
            })?;
        self.set_field(col, v)
    }

    /// The value in a column's slot; `None` when absent.
    pub fn field(&self, col: &ColumnDef) -> Option<&Value> {
        self.slots[col.idx].as_ref()
    }

    /// The value addressed by declared field name; `None` when absent or
    /// unknown.
    pub fn get(&self, field_name: &str) -> Option<&Value> {
        let col = self.schema.column_by_field_name(field_name)?;
        self.slots[col.idx].as_ref()
    }

    /// Clears one slot back to absent.
    pub fn delete(&mut self, col: &ColumnDef) {
        self.slots[col.idx] = None;
    }

    /// Sets the id slot, converting to the id column's type when needed.
    pub fn set_id(&mut self, v: Value) -> RowResult<()> {
        let schema = Rc::clone(&self.schema);
        self.set_field(schema.id_column(), v)
    }

    /// The id slot value; `None` when absent.
    pub fn id(&self) -> Option<&Value> {
        self.slots[self.schema.id_column().idx].as_ref()
    }

    /// The id slot as a sortable key, when it holds one.
    pub fn id_key(&self) -> Option<Key> {
        self.id().and_then(Value::as_key)
    }

    /// Number of non-absent slots.
    pub fn field_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Parallel (column name, value) vectors over stored, non-absent columns.
    pub fn db_data(&self) -> (Vec<&str>, Vec<&Value>) {
        let n = self.field_count();
        let mut cols = Vec::with_capacity(n);
        let mut vals = Vec::with_capacity(n);
        for (slot, col) in self.slots.iter().zip(self.schema.columns()) {
            let Some(v) = slot else { continue };
            if !col.is_stored() {
                continue;
            }
            cols.push(col.name.as_str());
            vals.push(v);
        }
        (cols, vals)
    }

    /// Invokes `f` for each non-absent slot in column order.
    pub fn walk(&self, mut f: impl FnMut(&ColumnDef, &Value)) {
        for (slot, col) in self.slots.iter().zip(self.schema.columns()) {
            if let Some(v) = slot {
                f(col, v);
            }
        }
    }

    /// Copies every slot into `dest`.
    ///
    /// # Panics
    ///
    /// Panics when `dest` is bound to a different schema.
    pub fn copy_to(&self, dest: &mut Row) {
        assert!(
            Rc::ptr_eq(&self.schema, &dest.schema),
            "copy_to requires rows of the same schema"
        );
        dest.slots.clone_from(&self.slots);
    }

    /// Marks every slot absent, keeping the storage for reuse.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Releases the row's storage back to the pool.
    ///
    /// Dropping the row does the same; `close` only makes the point in code.
    pub fn close(self) {}

    pub(crate) fn slot(&self, idx: usize) -> Option<&Value> {
        self.slots[idx].as_ref()
    }

    pub(crate) fn set_slot(&mut self, idx: usize, v: Option<Value>) {
        self.slots[idx] = v;
    }

    pub(crate) fn scan_binding(&mut self) -> &mut Option<ScanBinding> {
        &mut self.scan
    }
}

impl Drop for Row {
    fn drop(&mut self) {
        pool::release_slots(std::mem::take(&mut self.slots));
    }
}

impl Clone for Row {
    fn clone(&self) -> Self {
        let mut slots = pool::acquire_slots(self.slots.len());
        slots.clone_from(&self.slots);
        Row {
            schema: Rc::clone(&self.schema),
            slots,
            scan: self.scan.clone(),
        }
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.schema, &other.schema) && self.slots == other.slots
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        self.walk(|col, v| {
            map.entry(&col.field_name, v);
        });
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Tags;
    use crate::types::{ElementType, Identifier};

    fn schema() -> Rc<Schema> {
        Schema::builder("User", "users")
            .field("ID", ElementType::Id, Tags::new().json("id"))
            .field("Name", ElementType::Str, Tags::new().json("name"))
            .field("Age", ElementType::Int, Tags::new().json("age"))
            .optional("Note", ElementType::Str, Tags::new().json("note"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_set_and_get() {
        let schema = schema();
        let mut row = Row::new(&schema);

        row.set("Name", Value::from("alice")).unwrap();
        assert_eq!(row.get("Name"), Some(&Value::from("alice")));
        assert_eq!(row.get("Age"), None);
        assert_eq!(row.field_count(), 1);
    }

    #[test]
    fn test_set_converts() {
        let schema = schema();
        let mut row = Row::new(&schema);

        let id = Identifier::new();
        row.set_id(Value::Str(id.to_string())).unwrap();
        assert_eq!(row.id(), Some(&Value::Id(id)));
        assert_eq!(row.id_key(), Some(Key::Id(id)));
    }

    #[test]
    fn test_set_conversion_failure() {
        let schema = schema();
        let mut row = Row::new(&schema);

        let err = row.set("Age", Value::from("old")).unwrap_err();
        assert!(err.to_string().contains("Age"));
        assert_eq!(row.get("Age"), None);
    }

    #[test]
    fn test_unknown_field() {
        let schema = schema();
        let mut row = Row::new(&schema);
        let err = row.set("Nope", Value::Int(1)).unwrap_err();
        assert!(matches!(err, RowError::UnknownField { .. }));
    }

    #[test]
    fn test_null_on_nullable_column() {
        let schema = schema();
        let mut row = Row::new(&schema);

        row.set("Note", Value::Null).unwrap();
        assert_eq!(row.get("Note"), Some(&Value::Null));

        let err = row.set("Name", Value::Null).unwrap_err();
        assert!(matches!(err, RowError::FieldConversion { .. }));
    }

    #[test]
    fn test_delete_and_clear() {
        let schema = schema();
        let mut row = Row::new(&schema);
        row.set("Name", Value::from("x")).unwrap();
        row.set("Age", Value::Int(3)).unwrap();

        let name_col = schema.column_by_field_name("Name").unwrap();
        row.delete(name_col);
        assert_eq!(row.get("Name"), None);
        assert_eq!(row.field_count(), 1);

        row.clear();
        assert_eq!(row.field_count(), 0);
    }

    #[test]
    fn test_db_data_covers_stored_set_columns() {
        let schema = schema();
        let mut row = Row::new(&schema);
        let id = Identifier::new();
        row.set_id(Value::Id(id)).unwrap();
        row.set("Age", Value::Int(40)).unwrap();

        let (cols, vals) = row.db_data();
        assert_eq!(cols, vec!["id", "age"]);
        assert_eq!(vals, vec![&Value::Id(id), &Value::Int(40)]);
    }

    #[test]
    fn test_walk_in_column_order() {
        let schema = schema();
        let mut row = Row::new(&schema);
        row.set("Age", Value::Int(7)).unwrap();
        row.set("Name", Value::from("n")).unwrap();

        let mut seen = Vec::new();
        row.walk(|col, _| seen.push(col.field_name.clone()));
        assert_eq!(seen, vec!["Name", "Age"]);
    }

    #[test]
    fn test_copy_to() {
        let schema = schema();
        let mut row = Row::new(&schema);
        row.set("Name", Value::from("a")).unwrap();

        let mut dest = Row::new(&schema);
        dest.set("Age", Value::Int(1)).unwrap();
        row.copy_to(&mut dest);

        assert_eq!(dest.get("Name"), Some(&Value::from("a")));
        // copy is slot-wise: the unset source slot clears the destination
        assert_eq!(dest.get("Age"), None);
        assert_eq!(row, dest);
    }

    #[test]
    #[should_panic(expected = "same schema")]
    fn test_copy_to_foreign_schema_panics() {
        let a = schema();
        let b = schema();
        let row = Row::new(&a);
        let mut dest = Row::new(&b);
        row.copy_to(&mut dest);
    }
}
