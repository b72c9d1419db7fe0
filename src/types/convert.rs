//! Value coercion
//!
//! [`convert_to`] coerces a dynamic value to a column's element type. Targets
//! that implement the [`ConvertFrom`] hook (identifiers, timestamps) are
//! consulted before structural conversion, which is how domain types override
//! the generic rules.

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use crate::types::ident::Identifier;
use crate::types::value::{ElementType, Value};

/// Result type for conversions
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Conversion errors
#[derive(Debug, Clone, Error)]
pub enum ConvertError {
    #[error("cannot convert {value} to {target}")]
    Unconvertible { value: String, target: ElementType },

    #[error("cannot parse {text:?} as {target}: {reason}")]
    Parse {
        text: String,
        target: ElementType,
        reason: String,
    },
}

impl ConvertError {
    fn unconvertible(v: &Value, target: ElementType) -> Self {
        ConvertError::Unconvertible {
            value: format!("{v:?}"),
            target,
        }
    }
}

/// Custom conversion hook for target types that accept more source shapes
/// than structural conversion allows.
pub trait ConvertFrom: Sized {
    /// Builds a value of this type from a dynamic source.
    ///
    /// An absent source yields the zero value.
    fn convert_from(v: Option<&Value>) -> ConvertResult<Self>;
}

impl ConvertFrom for Identifier {
    fn convert_from(v: Option<&Value>) -> ConvertResult<Self> {
        let Some(v) = v else {
            return Ok(Identifier::nil());
        };
        match v {
            Value::Id(id) => Ok(*id),
            // an empty string from a store means the zero identifier
            Value::Str(s) if s.is_empty() => Ok(Identifier::nil()),
            Value::Str(s) => Identifier::parse_str(s).map_err(|e| ConvertError::Parse {
                text: s.clone(),
                target: ElementType::Id,
                reason: e.to_string(),
            }),
            Value::Bytes(b) if b.is_empty() => Ok(Identifier::nil()),
            Value::Bytes(b) => {
                if b.len() == 16 {
                    let mut raw = [0u8; 16];
                    raw.copy_from_slice(b);
                    Ok(Identifier::from_bytes(raw))
                } else {
                    // not the raw form; try the text form
                    let text = std::str::from_utf8(b).map_err(|e| ConvertError::Parse {
                        text: format!("{b:?}"),
                        target: ElementType::Id,
                        reason: e.to_string(),
                    })?;
                    Identifier::parse_str(text).map_err(|e| ConvertError::Parse {
                        text: text.to_string(),
                        target: ElementType::Id,
                        reason: e.to_string(),
                    })
                }
            }
            other => Err(ConvertError::unconvertible(other, ElementType::Id)),
        }
    }
}

impl ConvertFrom for DateTime<Utc> {
    fn convert_from(v: Option<&Value>) -> ConvertResult<Self> {
        let Some(v) = v else {
            return Ok(DateTime::UNIX_EPOCH);
        };
        match v {
            Value::Time(t) => Ok(*t),
            Value::Str(s) => DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| ConvertError::Parse {
                    text: s.clone(),
                    target: ElementType::Time,
                    reason: e.to_string(),
                }),
            Value::Int(secs) => {
                Utc.timestamp_opt(*secs, 0)
                    .single()
                    .ok_or_else(|| ConvertError::Parse {
                        text: secs.to_string(),
                        target: ElementType::Time,
                        reason: "out-of-range epoch seconds".to_string(),
                    })
            }
            other => Err(ConvertError::unconvertible(other, ElementType::Time)),
        }
    }
}

/// Coerces `v` to the given element type.
///
/// Resolution order:
/// 1. `Null` survives to a nullable target; an absent value becomes `Null`
///    there too.
/// 2. Target types with a [`ConvertFrom`] hook convert through it.
/// 3. An absent value becomes the target's zero.
/// 4. A value already of the target type passes through.
/// 5. Structurally convertible values convert (int↔float, string↔bytes).
/// 6. Anything else is an error.
pub fn convert_to(v: Option<Value>, target: ElementType, nullable: bool) -> ConvertResult<Value> {
    if nullable && matches!(v, None | Some(Value::Null)) {
        return Ok(Value::Null);
    }

    match target {
        ElementType::Id => return Identifier::convert_from(v.as_ref()).map(Value::Id),
        ElementType::Time => return DateTime::<Utc>::convert_from(v.as_ref()).map(Value::Time),
        _ => {}
    }

    let Some(v) = v else {
        return Ok(target.zero());
    };

    if v.element_type() == Some(target) {
        return Ok(v);
    }

    match (&v, target) {
        (Value::Int(n), ElementType::Float) => Ok(Value::Float(*n as f64)),
        (Value::Float(f), ElementType::Int) => Ok(Value::Int(*f as i64)),
        (Value::Str(s), ElementType::Bytes) => Ok(Value::Bytes(s.as_bytes().to_vec())),
        (Value::Bytes(b), ElementType::Str) => match String::from_utf8(b.clone()) {
            Ok(s) => Ok(Value::Str(s)),
            Err(e) => Err(ConvertError::Parse {
                text: format!("{b:?}"),
                target,
                reason: e.to_string(),
            }),
        },
        (Value::Id(id), ElementType::Str) => Ok(Value::Str(id.to_string())),
        _ => Err(ConvertError::unconvertible(&v, target)),
    }
}
