//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite table:
//! - fruits(id, name, price, quantity, supplier, quantity_ordered, total, picture)

pub mod schema;
pub mod sqlite;

pub use sqlite::{FruitStore, RawRows, DbStats};
