//! Row JSON marshalling
//!
//! A row serializes as an object keyed by column json-names: absent slots are
//! omitted, omit-empty columns are omitted when null or zero, and the null
//! sentinel serializes as literal `null`. Deserialization funnels through
//! [`Row::from_map`], which skips relation columns and the reserved timestamp
//! columns. Struct bridging rides the same JSON shapes, keyed by declared
//! field name.

use std::rc::Rc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::row::pool;
use crate::row::{Row, RowError, RowResult};
use crate::schema::RelationKind;
use crate::types::{convert_to, Value};

impl Row {
    /// Renders the row as a JSON object string through a pooled buffer.
    pub fn to_json(&self) -> RowResult<String> {
        let mut buf = pool::acquire_buf(self.schema().len() * 32);
        let res = serde_json::to_writer(&mut buf, self);
        let out = String::from_utf8_lossy(&buf).into_owned();
        pool::release_buf(buf);
        res?;
        Ok(out)
    }

    /// The row as a json-name keyed map, mirroring its serialized form.
    pub fn to_map(&self) -> Map<String, JsonValue> {
        let mut map = Map::new();
        self.walk(|col, v| {
            if col.json_name.is_empty() {
                return;
            }
            if col.json_omit_empty && v.is_zero() {
                return;
            }
            map.insert(col.json_name.clone(), v.to_json());
        });
        map
    }

    /// Bulk-sets fields from a json-name keyed map.
    ///
    /// Unknown keys, relation columns, and the reserved timestamp columns are
    /// skipped. JSON `null` becomes the null sentinel on nullable columns and
    /// the element zero otherwise.
    pub fn from_map(&mut self, data: &Map<String, JsonValue>) -> RowResult<()> {
        let schema = Rc::clone(self.schema());
        for (key, raw) in data {
            let Some(col) = schema.column_by_json_name(key) else {
                continue;
            };
            if col.relation.kind != RelationKind::None {
                continue;
            }
            if schema.is_timestamp_column(col.idx) {
                // internal fields are not settable from the outside
                continue;
            }

            let target = col.element_type();
            if raw.is_null() {
                let v = if col.nullable { Value::Null } else { target.zero() };
                self.set_slot(col.idx, Some(v));
                continue;
            }

            let loose = Value::from_json(raw).ok_or_else(|| RowError::JsonFieldConversion {
                field: col.json_name.clone(),
                target,
                source: crate::types::ConvertError::Unconvertible {
                    value: raw.to_string(),
                    target,
                },
            })?;
            let converted = convert_to(Some(loose), target, col.nullable).map_err(|source| {
                RowError::JsonFieldConversion {
                    field: col.json_name.clone(),
                    target,
                    source,
                }
            })?;
            self.set_slot(col.idx, Some(converted));
        }
        Ok(())
    }

    /// Applies a JSON document to this row. A literal `null` clears the row;
    /// anything else must be an object and funnels through [`Row::from_map`].
    pub fn apply_json(&mut self, data: &str) -> RowResult<()> {
        let parsed: JsonValue = serde_json::from_str(data)?;
        match parsed {
            JsonValue::Null => {
                self.clear();
                Ok(())
            }
            JsonValue::Object(map) => self.from_map(&map),
            _ => Err(RowError::SourceNotAStruct),
        }
    }

    /// Bulk-sets every stored column from an external record, matching by
    /// declared field name. The record must carry all stored columns.
    pub fn from_struct<T: Serialize>(&mut self, src: &T) -> RowResult<()> {
        let schema = Rc::clone(self.schema());
        let json = serde_json::to_value(src)?;
        let Some(obj) = json.as_object() else {
            return Err(RowError::SourceNotAStruct);
        };

        for col in schema.columns() {
            if !col.is_stored() {
                continue;
            }
            let raw = obj
                .get(&col.field_name)
                .ok_or_else(|| RowError::UnknownField {
                    model: schema.name().to_string(),
                    field: col.field_name.clone(),
                })?;

            let target = col.element_type();
            if raw.is_null() {
                let v = if col.nullable { Value::Null } else { target.zero() };
                self.set_slot(col.idx, Some(v));
                continue;
            }
            let loose = Value::from_json(raw).ok_or_else(|| RowError::FieldConversion {
                field: col.field_name.clone(),
                target,
                source: crate::types::ConvertError::Unconvertible {
                    value: raw.to_string(),
                    target,
                },
            })?;
            let converted = convert_to(Some(loose), target, col.nullable).map_err(|source| {
                RowError::FieldConversion {
                    field: col.field_name.clone(),
                    target,
                    source,
                }
            })?;
            self.set_slot(col.idx, Some(converted));
        }
        Ok(())
    }

    /// Builds an external record from the non-absent slots, matching by
    /// declared field name. Null slots surface as JSON `null`.
    pub fn to_struct<T: DeserializeOwned>(&self) -> RowResult<T> {
        let mut obj = Map::new();
        self.walk(|col, v| {
            obj.insert(col.field_name.clone(), v.to_json());
        });
        Ok(serde_json::from_value(JsonValue::Object(obj))?)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let mut err = None;
        self.walk(|col, v| {
            if err.is_some() || col.json_name.is_empty() {
                return;
            }
            if col.json_omit_empty && v.is_zero() {
                return;
            }
            if let Err(e) = map.serialize_entry(&col.json_name, &v.to_json()) {
                err = Some(e);
            }
        });
        if let Some(e) = err {
            return Err(e);
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, Tags};
    use crate::types::{ElementType, Identifier};

    fn schema() -> Rc<crate::schema::Schema> {
        Schema::builder("User", "users")
            .field("ID", ElementType::Id, Tags::new().json("id"))
            .field("Name", ElementType::Str, Tags::new().json("name"))
            .field("Age", ElementType::Int, Tags::new().json("age,omitempty"))
            .optional("Note", ElementType::Str, Tags::new().json("note"))
            .field("Secret", ElementType::Str, Tags::new().json("-"))
            .field("CreatedAt", ElementType::Time, Tags::new().json("createdAt"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_serialize_omits_absent() {
        let schema = schema();
        let mut row = Row::new(&schema);
        row.set("Name", Value::from("alice")).unwrap();

        let json = row.to_json().unwrap();
        assert_eq!(json, r#"{"name":"alice"}"#);
    }

    #[test]
    fn test_serialize_omit_empty_zero() {
        let schema = schema();
        let mut row = Row::new(&schema);
        row.set("Name", Value::from("a")).unwrap();
        row.set("Age", Value::Int(0)).unwrap();

        assert_eq!(row.to_json().unwrap(), r#"{"name":"a"}"#);

        row.set("Age", Value::Int(9)).unwrap();
        assert_eq!(row.to_json().unwrap(), r#"{"name":"a","age":9}"#);
    }

    #[test]
    fn test_serialize_null_sentinel() {
        let schema = schema();
        let mut row = Row::new(&schema);
        row.set("Note", Value::Null).unwrap();

        assert_eq!(row.to_json().unwrap(), r#"{"note":null}"#);
    }

    #[test]
    fn test_serialize_skips_json_less_columns() {
        let schema = schema();
        let mut row = Row::new(&schema);
        row.set("Secret", Value::from("hidden")).unwrap();

        assert_eq!(row.to_json().unwrap(), "{}");
    }

    #[test]
    fn test_from_map_converts_and_skips() {
        let schema = schema();
        let mut row = Row::new(&schema);
        let id = Identifier::new();

        let map = serde_json::json!({
            "id": id.to_string(),
            "name": "bob",
            "age": 30,
            "createdAt": "2021-06-01T00:00:00Z",
            "unknown": true,
        });
        row.from_map(map.as_object().unwrap()).unwrap();

        assert_eq!(row.id(), Some(&Value::Id(id)));
        assert_eq!(row.get("Name"), Some(&Value::from("bob")));
        assert_eq!(row.get("Age"), Some(&Value::Int(30)));
        // reserved timestamp columns are not settable from the outside
        assert_eq!(row.get("CreatedAt"), None);
    }

    #[test]
    fn test_from_map_null_handling() {
        let schema = schema();
        let mut row = Row::new(&schema);

        let map = serde_json::json!({ "note": null, "name": null });
        row.from_map(map.as_object().unwrap()).unwrap();

        assert_eq!(row.get("Note"), Some(&Value::Null));
        // non-nullable columns take the element zero
        assert_eq!(row.get("Name"), Some(&Value::Str(String::new())));
    }

    #[test]
    fn test_from_map_conversion_failure() {
        let schema = schema();
        let mut row = Row::new(&schema);

        let map = serde_json::json!({ "age": "old" });
        let err = row.from_map(map.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("age"));
    }

    #[test]
    fn test_round_trip_map() {
        let schema = schema();
        let mut row = Row::new(&schema);
        row.set_id(Value::Id(Identifier::new())).unwrap();
        row.set("Name", Value::from("carol")).unwrap();
        row.set("Age", Value::Int(44)).unwrap();
        row.set("Note", Value::Null).unwrap();

        let mut back = Row::new(&schema);
        back.from_map(&row.to_map()).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_apply_json_null_clears() {
        let schema = schema();
        let mut row = Row::new(&schema);
        row.set("Name", Value::from("x")).unwrap();

        row.apply_json("null").unwrap();
        assert_eq!(row.field_count(), 0);

        row.apply_json(r#"{"name":"y"}"#).unwrap();
        assert_eq!(row.get("Name"), Some(&Value::from("y")));
    }
}
