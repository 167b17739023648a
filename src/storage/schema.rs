//! Database schema definitions

/// SQL to create the fruits table
///
/// `picture` is declared BLOB so both image bytes and text references are
/// stored as given.
pub const CREATE_FRUITS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS fruits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    price REAL NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 0,
    supplier TEXT DEFAULT 'UNKNOWN',
    quantity_ordered INTEGER DEFAULT 0,
    total REAL DEFAULT 0.0,
    picture BLOB NOT NULL DEFAULT 'NO IMAGE AVAILABLE'
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_fruits_name ON fruits(name)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_FRUITS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Statements that take a database at `from` to `from + 1`.
///
/// Version 1 is the first layout, so there is nothing to run yet.
pub fn upgrade_statements(_from: i64) -> &'static [&'static str] {
    &[]
}
