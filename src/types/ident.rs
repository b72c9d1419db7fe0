//! 16-byte identifier
//!
//! The canonical sortable id type: ordered by unsigned byte-lexicographic
//! compare, rendered as hyphenated hex, carried as raw 16 bytes in binary
//! form. Scanning accepts either form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A 16-byte identifier used as the primary key type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(Uuid);

impl Identifier {
    /// Generates a fresh random (v4) identifier.
    pub fn new() -> Self {
        Identifier(Uuid::new_v4())
    }

    /// The all-zero identifier.
    pub const fn nil() -> Self {
        Identifier(Uuid::nil())
    }

    /// Builds an identifier from raw 16 bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Identifier(Uuid::from_bytes(bytes))
    }

    /// The raw 16-byte form.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// True when every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_nil()
    }

    /// Parses the canonical hyphenated text form.
    pub fn parse_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Identifier)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Identifier {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse_str(s)
    }
}
