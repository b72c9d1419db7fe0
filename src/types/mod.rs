//! Dynamic value layer: the 16-byte identifier, the per-slot `Value` type,
//! and coercion between value shapes.

pub mod convert;
pub mod ident;
pub mod value;

pub use convert::{convert_to, ConvertError, ConvertFrom};
pub use ident::Identifier;
pub use value::{ElementType, Value};
