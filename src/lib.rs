//! # Fruitmarket - fruit inventory store
//!
//! Content-provider style data access for a small product catalog.
//!
//! Fruitmarket provides:
//! - A static contract describing the `fruits` table and its addresses
//! - SQLite-backed storage with schema versioning
//! - An address resolver mapping `content://` addresses to collection/item
//! - A validating CRUD gateway ([`FruitProvider`]) with an async handle
//! - A change-notification bus that invalidates previously returned cursors

pub mod contract;
pub mod uri;
pub mod values;
pub mod storage;
pub mod bus;
pub mod cursor;
pub mod provider;
pub mod inventory;
pub mod config;
pub mod watcher;
pub mod server;
pub mod ui;

// Re-exports for convenient access
pub use uri::{ContentUri, UriMatch};
pub use values::{ContentValues, Value};
pub use storage::FruitStore;
pub use bus::{ChangeBus, Subscription};
pub use cursor::Cursor;
pub use provider::{FruitProvider, ProviderHandle};
pub use inventory::{Fruit, NewFruit};

/// Result type alias for Fruitmarket operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Fruitmarket operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported address: {0}")]
    UnsupportedAddress(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Invalid sort order: {0}")]
    InvalidSortOrder(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Database schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: i64, supported: i64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Fruit not found: {0}")]
    NotFound(String),

    #[error("Out of stock: {0}")]
    OutOfStock(String),

    #[error("Concurrent update kept winning for {0}")]
    Conflict(String),
}
