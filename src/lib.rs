//! rowdb - an in-memory, schema-driven table store
//!
//! Tables hold rows sorted by id; secondary indexes are sorted (key, rowid)
//! columns. Queries compose from three order-preserving, seekable iterator
//! primitives: a per-index column scan, a k-way deduplicating merge (union),
//! and an n-way intersect with difference sets.

pub mod index;
pub mod iter;
pub mod row;
pub mod schema;
pub mod sortable;
pub mod table;
pub mod types;
pub mod validate;
