//! Column-scan shim
//!
//! Hydrates a row from a tabular result set. Each result column binds to a
//! schema column by store name (an optional `alias.` prefix is stripped) or
//! to a drop-hole; a typed hole records the target element type and whether
//! the source value was non-null. A null id means no-match: the row is
//! cleared, which is not an error.

use std::rc::Rc;

use crate::row::errors::{ScanError, ScanResult};
use crate::row::Row;
use crate::schema::{RelationKind, Schema};
use crate::types::{convert_to, ElementType, Value};

/// A source of tabular rows, one `read` per result row.
pub trait RowSource {
    /// Result column names, in result order.
    fn columns(&self) -> ScanResult<Vec<String>>;

    /// Fills one result row into the holes, one hole per result column.
    fn read(&mut self, holes: &mut [TypedHole]) -> ScanResult<()>;
}

/// One result column's landing slot during a scan.
#[derive(Debug, Default)]
pub struct TypedHole {
    /// Target element type; `None` makes this a drop-hole.
    target: Option<ElementType>,
    /// The bound column accepts the null sentinel.
    nullable: bool,
    value: Option<Value>,
    valid: bool,
}

impl TypedHole {
    fn drop_hole() -> Self {
        TypedHole::default()
    }

    fn for_column(target: ElementType, nullable: bool) -> Self {
        TypedHole {
            target: Some(target),
            nullable,
            value: None,
            valid: false,
        }
    }

    /// The element type this hole converts into, `None` for drop-holes.
    pub fn target(&self) -> Option<ElementType> {
        self.target
    }

    /// Stores one raw source value, converting it to the target type.
    /// `None` is a source NULL.
    pub fn fill(&mut self, raw: Option<Value>) -> Result<(), crate::types::ConvertError> {
        let Some(target) = self.target else {
            self.value = None;
            self.valid = false;
            return Ok(());
        };
        self.valid = raw.is_some();
        if raw.is_none() && self.nullable {
            self.value = None;
            return Ok(());
        }
        self.value = Some(convert_to(raw, target, false)?);
        Ok(())
    }
}

/// Memoized binding of a result-column list onto schema columns.
#[derive(Debug, Clone)]
pub(crate) struct ScanBinding {
    cols: Vec<String>,
    binds: Vec<Option<usize>>,
    alias: Option<String>,
}

fn bind_columns(schema: &Schema, cols: &[String], alias: Option<&str>) -> Vec<Option<usize>> {
    let prefix = alias.map(|a| format!("{a}."));
    cols.iter()
        .map(|column| {
            let name = match &prefix {
                Some(p) => column.strip_prefix(p.as_str())?,
                None => match column.split_once('.') {
                    Some((_, rest)) => rest,
                    None => column.as_str(),
                },
            };
            let col = schema.column_by_name(name)?;
            // relation columns have no element type to land in
            if col.relation.kind != RelationKind::None {
                return None;
            }
            Some(col.idx)
        })
        .collect()
}

impl Row {
    /// Scans one result row from `source` into this row.
    ///
    /// Result columns that match no schema column are dropped. A null value
    /// in the id column clears the row and stops: the source row is a
    /// no-match. Explicit nulls land as the null sentinel on nullable
    /// columns and as the element zero otherwise.
    ///
    /// The column binding is memoized against the source's column list and
    /// the alias, so reusing one row across a result loop binds once.
    pub fn scan_from(&mut self, source: &mut dyn RowSource, alias: Option<&str>) -> ScanResult<()> {
        let schema = Rc::clone(self.schema());
        let cols = source.columns()?;

        let stale = match self.scan_binding() {
            None => true,
            Some(b) => b.cols != cols || b.alias.as_deref() != alias,
        };
        if stale {
            let binds = bind_columns(&schema, &cols, alias);
            *self.scan_binding() = Some(ScanBinding {
                cols,
                binds,
                alias: alias.map(str::to_string),
            });
        }
        let binding = self.scan_binding().clone().expect("binding just ensured");

        let mut holes: Vec<TypedHole> = binding
            .binds
            .iter()
            .map(|bind| match bind {
                None => TypedHole::drop_hole(),
                Some(idx) => {
                    let col = schema.column(*idx);
                    TypedHole::for_column(col.element_type(), col.nullable)
                }
            })
            .collect();

        source.read(&mut holes)?;

        let id_idx = schema.id_column().idx;
        for (hole, bind) in holes.into_iter().zip(&binding.binds) {
            let Some(idx) = bind else { continue };
            if !hole.valid && *idx == id_idx {
                self.clear();
                break;
            }
            self.set_slot(*idx, Some(hole.value.unwrap_or(Value::Null)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Tags;
    use crate::types::Identifier;

    fn schema() -> Rc<Schema> {
        Schema::builder("User", "users")
            .field("ID", ElementType::Id, Tags::new())
            .field("Name", ElementType::Str, Tags::new())
            .optional("Note", ElementType::Str, Tags::new())
            .field("Age", ElementType::Int, Tags::new())
            .build()
            .unwrap()
    }

    /// A canned result set: one column list, rows of raw values.
    struct FakeSource {
        cols: Vec<String>,
        rows: Vec<Vec<Option<Value>>>,
        at: usize,
    }

    impl FakeSource {
        fn new(cols: &[&str], rows: Vec<Vec<Option<Value>>>) -> Self {
            FakeSource {
                cols: cols.iter().map(|c| c.to_string()).collect(),
                rows,
                at: 0,
            }
        }
    }

    impl RowSource for FakeSource {
        fn columns(&self) -> ScanResult<Vec<String>> {
            Ok(self.cols.clone())
        }

        fn read(&mut self, holes: &mut [TypedHole]) -> ScanResult<()> {
            let row = self
                .rows
                .get(self.at)
                .ok_or_else(|| ScanError::Source("past end of result set".into()))?;
            self.at += 1;
            for (hole, raw) in holes.iter_mut().zip(row.iter()) {
                hole.fill(raw.clone())
                    .map_err(|source| ScanError::Column {
                        column: "?".into(),
                        source,
                    })?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_scan_binds_by_name() {
        let schema = schema();
        let mut row = Row::new(&schema);
        let id = Identifier::new();

        let mut source = FakeSource::new(
            &["id", "name", "age"],
            vec![vec![
                Some(Value::Str(id.to_string())),
                Some(Value::from("alice")),
                Some(Value::Int(30)),
            ]],
        );
        row.scan_from(&mut source, None).unwrap();

        assert_eq!(row.id(), Some(&Value::Id(id)));
        assert_eq!(row.get("Name"), Some(&Value::from("alice")));
        assert_eq!(row.get("Age"), Some(&Value::Int(30)));
    }

    #[test]
    fn test_scan_accepts_binary_identifier() {
        let schema = schema();
        let mut row = Row::new(&schema);
        let id = Identifier::new();

        let mut source = FakeSource::new(
            &["id"],
            vec![vec![Some(Value::Bytes(id.as_bytes().to_vec()))]],
        );
        row.scan_from(&mut source, None).unwrap();
        assert_eq!(row.id(), Some(&Value::Id(id)));
    }

    #[test]
    fn test_unbound_columns_are_dropped() {
        let schema = schema();
        let mut row = Row::new(&schema);
        let id = Identifier::new();

        let mut source = FakeSource::new(
            &["id", "mystery"],
            vec![vec![Some(Value::Id(id)), Some(Value::Int(1))]],
        );
        row.scan_from(&mut source, None).unwrap();
        assert_eq!(row.field_count(), 1);
    }

    #[test]
    fn test_null_id_clears_row() {
        let schema = schema();
        let mut row = Row::new(&schema);
        row.set("Name", Value::from("stale")).unwrap();

        let mut source = FakeSource::new(
            &["id", "name"],
            vec![vec![None, Some(Value::from("fresh"))]],
        );
        row.scan_from(&mut source, None).unwrap();
        assert_eq!(row.field_count(), 0);
    }

    #[test]
    fn test_null_lands_as_sentinel_or_zero() {
        let schema = schema();
        let mut row = Row::new(&schema);
        let id = Identifier::new();

        let mut source = FakeSource::new(
            &["id", "note", "age"],
            vec![vec![Some(Value::Id(id)), None, None]],
        );
        row.scan_from(&mut source, None).unwrap();

        assert_eq!(row.get("Note"), Some(&Value::Null));
        assert_eq!(row.get("Age"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_alias_prefix_binding() {
        let schema = schema();
        let mut row = Row::new(&schema);
        let id = Identifier::new();

        let mut source = FakeSource::new(
            &["u.id", "u.name", "g.name"],
            vec![vec![
                Some(Value::Id(id)),
                Some(Value::from("mine")),
                Some(Value::from("other")),
            ]],
        );
        row.scan_from(&mut source, Some("u")).unwrap();

        assert_eq!(row.get("Name"), Some(&Value::from("mine")));
    }

    #[test]
    fn test_dotted_names_bind_without_alias() {
        let schema = schema();
        let mut row = Row::new(&schema);
        let id = Identifier::new();

        let mut source = FakeSource::new(
            &["t.id", "t.name"],
            vec![vec![Some(Value::Id(id)), Some(Value::from("n"))]],
        );
        row.scan_from(&mut source, None).unwrap();
        assert_eq!(row.get("Name"), Some(&Value::from("n")));
    }

    #[test]
    fn test_binding_is_reused_across_reads() {
        let schema = schema();
        let mut row = Row::new(&schema);
        let a = Identifier::new();
        let b = Identifier::new();

        let mut source = FakeSource::new(
            &["id", "name"],
            vec![
                vec![Some(Value::Id(a)), Some(Value::from("one"))],
                vec![Some(Value::Id(b)), Some(Value::from("two"))],
            ],
        );
        row.scan_from(&mut source, None).unwrap();
        assert_eq!(row.id(), Some(&Value::Id(a)));

        let mut next = Row::new_with_binding(&schema, &row);
        next.scan_from(&mut source, None).unwrap();
        assert_eq!(next.id(), Some(&Value::Id(b)));
        assert_eq!(next.get("Name"), Some(&Value::from("two")));
    }

    #[test]
    fn test_source_error_surfaces() {
        let schema = schema();
        let mut row = Row::new(&schema);

        let mut source = FakeSource::new(&["id"], vec![]);
        let err = row.scan_from(&mut source, None).unwrap_err();
        assert!(matches!(err, ScanError::Source(_)));
    }
}
