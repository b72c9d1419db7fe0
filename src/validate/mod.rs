//! Tag-driven row validation
//!
//! Columns carry an opaque `validate` tag: comma-separated predicates, each
//! `name` or `name=param`. Validation walks the non-absent slots, evaluates
//! every predicate, and accumulates failures instead of short-circuiting;
//! the result is one aggregate error carrying the row id when it is set.
//!
//! Supported predicates: `required`, `min`, `max`, `len`, `uuid`, `oneof`.
//! An unknown predicate name is a schema bug and panics.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::row::Row;
use crate::schema::ColumnDef;
use crate::types::{Identifier, Value};

/// One per-field validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// Row id, when the id slot was set
    #[serde(rename = "modelId", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Model name
    #[serde(skip)]
    pub model: String,
    /// JSON name of the failing field
    pub field: String,
    /// `model.field` path
    pub namespace: String,
    /// Failing predicate name
    pub validator: String,
    /// Predicate parameter, empty when none
    pub param: String,
    /// Human-readable message
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = if self.message.is_empty() {
            format!("{} [{}]", self.validator, self.param)
        } else {
            self.message.clone()
        };
        match &self.id {
            Some(id) => write!(
                f,
                "{} with ID '{}': validation failed for field {}: {}",
                self.model, id, self.field, msg
            ),
            None => write!(
                f,
                "{}: validation failed for field {}: {}",
                self.model, self.field, msg
            ),
        }
    }
}

/// Aggregate of accumulated validation failures.
#[derive(Debug, Clone, Error, Serialize)]
#[error("validation errors")]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// Number of accumulated failures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Length, for predicates that measure rather than compare.
fn value_len(v: &Value) -> Option<i64> {
    match v {
        Value::Str(s) => Some(s.chars().count() as i64),
        Value::Bytes(b) => Some(b.len() as i64),
        _ => None,
    }
}

/// Numeric magnitude for min/max on numbers; falls back to length.
fn value_magnitude(v: &Value) -> Option<f64> {
    match v {
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        _ => value_len(v).map(|n| n as f64),
    }
}

fn check(v: &Value, name: &str, param: &str) -> bool {
    match name {
        "required" => !v.is_zero(),
        "min" => {
            let limit: f64 = param.parse().unwrap_or_else(|_| {
                panic!("validator 'min' needs a numeric parameter, got {param:?}")
            });
            value_magnitude(v).is_some_and(|m| m >= limit)
        }
        "max" => {
            let limit: f64 = param.parse().unwrap_or_else(|_| {
                panic!("validator 'max' needs a numeric parameter, got {param:?}")
            });
            value_magnitude(v).is_some_and(|m| m <= limit)
        }
        "len" => {
            let want: i64 = param.parse().unwrap_or_else(|_| {
                panic!("validator 'len' needs a numeric parameter, got {param:?}")
            });
            value_len(v) == Some(want)
        }
        "uuid" => match v {
            Value::Id(_) => true,
            Value::Str(s) => Identifier::parse_str(s).is_ok(),
            _ => false,
        },
        "oneof" => {
            let text = v.to_string();
            param.split_whitespace().any(|alt| alt == text)
        }
        other => panic!("unknown validator: {other:?}"),
    }
}

fn validate_slot(errors: &mut Vec<ValidationError>, model: &str, col: &ColumnDef, v: &Value) {
    if col.validate.is_empty() {
        return;
    }
    for predicate in col.validate.split(',') {
        let predicate = predicate.trim();
        if predicate.is_empty() {
            continue;
        }
        let (name, param) = match predicate.split_once('=') {
            Some((n, p)) => (n.trim(), p.trim()),
            None => (predicate, ""),
        };
        if !check(v, name, param) {
            errors.push(ValidationError {
                id: None,
                model: model.to_string(),
                field: col.json_name.clone(),
                namespace: format!("{}.{}", model, col.json_name),
                validator: name.to_string(),
                param: param.to_string(),
                message: String::new(),
            });
        }
    }
}

impl Row {
    /// Validates every non-absent slot against its column's `validate` tag.
    ///
    /// Failures accumulate across fields and surface as one aggregate; the
    /// row id is attached when the id slot is set.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        let model = self.schema().name().to_string();
        self.walk(|col, v| validate_slot(&mut errors, &model, col, v));

        if errors.is_empty() {
            return Ok(());
        }
        if let Some(id) = self.id() {
            let id = id.to_string();
            for e in &mut errors {
                e.id = Some(id.clone());
            }
        }
        Err(ValidationErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::schema::{Schema, Tags};
    use crate::types::{ElementType, Identifier};

    fn schema() -> Rc<Schema> {
        Schema::builder("User", "users")
            .field("ID", ElementType::Id, Tags::new().json("id").validate("required,uuid"))
            .field(
                "Name",
                ElementType::Str,
                Tags::new().json("name").validate("required,min=2,max=8"),
            )
            .field("Age", ElementType::Int, Tags::new().json("age").validate("min=0,max=150"))
            .field("Code", ElementType::Str, Tags::new().json("code").validate("len=4"))
            .field(
                "Role",
                ElementType::Str,
                Tags::new().json("role").validate("oneof=admin user guest"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_valid_row_passes() {
        let schema = schema();
        let mut row = Row::new(&schema);
        row.set_id(Value::Id(Identifier::new())).unwrap();
        row.set("Name", Value::from("alice")).unwrap();
        row.set("Age", Value::Int(30)).unwrap();
        row.set("Code", Value::from("ab12")).unwrap();
        row.set("Role", Value::from("admin")).unwrap();

        assert!(row.validate().is_ok());
    }

    #[test]
    fn test_absent_slots_are_not_validated() {
        let schema = schema();
        let row = Row::new(&schema);
        // everything absent, nothing to check
        assert!(row.validate().is_ok());
    }

    #[test]
    fn test_failures_accumulate() {
        let schema = schema();
        let mut row = Row::new(&schema);
        row.set("Name", Value::from("")).unwrap(); // required + min
        row.set("Age", Value::Int(200)).unwrap(); // max
        row.set("Role", Value::from("root")).unwrap(); // oneof

        let errs = row.validate().unwrap_err();
        assert_eq!(errs.len(), 4);

        let validators: Vec<&str> = errs.0.iter().map(|e| e.validator.as_str()).collect();
        assert_eq!(validators, vec!["required", "min", "max", "oneof"]);
        assert!(errs.0.iter().all(|e| e.id.is_none()));
    }

    #[test]
    fn test_id_attached_to_failures() {
        let schema = schema();
        let mut row = Row::new(&schema);
        let id = Identifier::new();
        row.set_id(Value::Id(id)).unwrap();
        row.set("Age", Value::Int(-1)).unwrap();

        let errs = row.validate().unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs.0[0].id.as_deref(), Some(id.to_string().as_str()));
        assert_eq!(errs.0[0].namespace, "User.age");
    }

    #[test]
    fn test_required_fails_on_null() {
        let schema = Schema::builder("T", "t")
            .field("ID", ElementType::Id, Tags::new())
            .optional("Name", ElementType::Str, Tags::new().json("name").validate("required"))
            .build()
            .unwrap();
        let mut row = Row::new(&schema);
        row.set("Name", Value::Null).unwrap();

        let errs = row.validate().unwrap_err();
        assert_eq!(errs.0[0].validator, "required");
    }

    #[test]
    fn test_uuid_accepts_text_form() {
        let schema = Schema::builder("T", "t")
            .field("ID", ElementType::Id, Tags::new())
            .field("Ref", ElementType::Str, Tags::new().json("ref").validate("uuid"))
            .build()
            .unwrap();
        let mut row = Row::new(&schema);
        row.set("Ref", Value::Str(Identifier::new().to_string())).unwrap();
        assert!(row.validate().is_ok());

        row.set("Ref", Value::from("nope")).unwrap();
        assert!(row.validate().is_err());
    }

    #[test]
    #[should_panic(expected = "unknown validator")]
    fn test_unknown_validator_panics() {
        let schema = Schema::builder("T", "t")
            .field("ID", ElementType::Id, Tags::new())
            .field("X", ElementType::Str, Tags::new().validate("frobnicate"))
            .build()
            .unwrap();
        let mut row = Row::new(&schema);
        row.set("X", Value::from("v")).unwrap();
        let _ = row.validate();
    }

    #[test]
    fn test_display_carries_context() {
        let schema = schema();
        let mut row = Row::new(&schema);
        let id = Identifier::new();
        row.set_id(Value::Id(id)).unwrap();
        row.set("Code", Value::from("abc")).unwrap();

        let errs = row.validate().unwrap_err();
        let text = errs.0[0].to_string();
        assert!(text.contains("User"));
        assert!(text.contains(&id.to_string()));
        assert!(text.contains("code"));
        assert!(text.contains("len"));
    }
}
