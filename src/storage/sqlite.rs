//! SQLite storage implementation

use std::path::Path;
use std::sync::OnceLock;
use regex::Regex;
use rusqlite::{Connection, params_from_iter};
use serde::Serialize;
use crate::contract::{DATABASE_VERSION, fruit_entry};
use crate::values::{ContentValues, Value};
use crate::{Error, Result};
use super::schema;

/// SQLite-backed storage for the fruits table
///
/// Owns the single connection, so writes are serialized by whoever owns the
/// store.
pub struct FruitStore {
    conn: Connection,
}

/// Columns and rows produced by [`FruitStore::query`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl FruitStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create the schema on a fresh file, upgrade an older one.
    fn initialize_schema(&self) -> Result<()> {
        let found = self.schema_version()?;

        if found > DATABASE_VERSION {
            return Err(Error::SchemaTooNew { found, supported: DATABASE_VERSION });
        }

        if found == 0 {
            for stmt in schema::all_schema_statements() {
                self.conn.execute(stmt, [])?;
            }
            tracing::info!("Created fruits schema (version {})", DATABASE_VERSION);
        } else {
            for version in found..DATABASE_VERSION {
                for stmt in schema::upgrade_statements(version) {
                    self.conn.execute(stmt, [])?;
                }
                tracing::info!("Upgraded fruits schema from version {} to {}", version, version + 1);
            }
        }

        self.conn.pragma_update(None, "user_version", DATABASE_VERSION)?;
        Ok(())
    }

    /// Schema version recorded in the file (0 for a new file)
    pub fn schema_version(&self) -> Result<i64> {
        let version: i64 = self.conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    // ========== Row Operations ==========

    /// Read rows.
    ///
    /// `projection` of `None` selects every column in declaration order.
    /// `selection` is a SQL predicate whose `?` placeholders are bound from
    /// `args`. `sort_order` is `column [ASC|DESC]`, comma separated.
    pub fn query(
        &self,
        projection: Option<&[&str]>,
        selection: Option<&str>,
        args: &[Value],
        sort_order: Option<&str>,
    ) -> Result<RawRows> {
        let columns: Vec<&str> = match projection {
            Some(cols) if !cols.is_empty() => {
                check_columns(cols.iter().copied())?;
                cols.to_vec()
            }
            _ => fruit_entry::ALL_COLUMNS.to_vec(),
        };

        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), fruit_entry::TABLE_NAME);
        push_where(&mut sql, selection);
        if let Some(order) = sort_order.filter(|o| !o.trim().is_empty()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(&check_sort_order(order)?);
        }

        tracing::debug!("query: {} {:?}", sql, args);
        let mut stmt = self.conn.prepare(&sql)?;
        let width = columns.len();
        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                (0..width).map(|i| row.get::<_, Value>(i)).collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(RawRows {
            columns: columns.into_iter().map(str::to_string).collect(),
            rows,
        })
    }

    /// Append a row and return its assigned id
    pub fn insert(&self, values: &ContentValues) -> Result<i64> {
        check_columns(values.keys())?;

        if values.is_empty() {
            self.conn.execute(&format!("INSERT INTO {} DEFAULT VALUES", fruit_entry::TABLE_NAME), [])?;
        } else {
            let keys: Vec<&str> = values.keys().collect();
            let placeholders = vec!["?"; keys.len()].join(", ");
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                fruit_entry::TABLE_NAME,
                keys.join(", "),
                placeholders
            );
            self.conn.execute(&sql, params_from_iter(values.iter().map(|(_, v)| v)))?;
        }

        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite the given columns on every row matching `selection`
    pub fn update(&self, values: &ContentValues, selection: Option<&str>, args: &[Value]) -> Result<usize> {
        check_columns(values.keys())?;
        if values.is_empty() {
            return Ok(0);
        }

        let assignments: Vec<String> = values.keys().map(|k| format!("{} = ?", k)).collect();
        let mut sql = format!("UPDATE {} SET {}", fruit_entry::TABLE_NAME, assignments.join(", "));
        push_where(&mut sql, selection);

        let bound = values.iter().map(|(_, v)| v).chain(args.iter());
        let changed = self.conn.execute(&sql, params_from_iter(bound))?;
        Ok(changed)
    }

    /// Remove every row matching `selection` (all rows when `None`)
    pub fn delete(&self, selection: Option<&str>, args: &[Value]) -> Result<usize> {
        let mut sql = format!("DELETE FROM {}", fruit_entry::TABLE_NAME);
        push_where(&mut sql, selection);
        let removed = self.conn.execute(&sql, params_from_iter(args.iter()))?;
        Ok(removed)
    }

    /// Count all rows
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", fruit_entry::TABLE_NAME),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get inventory statistics
    pub fn stats(&self) -> Result<DbStats> {
        let stats = self.conn.query_row(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(quantity), 0),
                   COALESCE(SUM(quantity_ordered), 0),
                   COALESCE(SUM(total), 0.0)
            FROM fruits
            "#,
            [],
            |row| {
                Ok(DbStats {
                    products: row.get::<_, i64>(0)? as usize,
                    units_in_stock: row.get(1)?,
                    units_ordered: row.get(2)?,
                    total_sales: row.get(3)?,
                })
            },
        )?;
        Ok(stats)
    }
}

fn push_where(sql: &mut String, selection: Option<&str>) {
    if let Some(selection) = selection.filter(|s| !s.trim().is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(selection);
    }
}

fn check_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> Result<()> {
    for column in columns {
        if !fruit_entry::is_column(column) {
            return Err(Error::UnknownColumn(column.to_string()));
        }
    }
    Ok(())
}

fn sort_term() -> &'static Regex {
    static TERM: OnceLock<Regex> = OnceLock::new();
    TERM.get_or_init(|| {
        Regex::new(r"(?i)^\s*([a-z_][a-z0-9_]*)(?:\s+(asc|desc))?\s*$").expect("valid sort term pattern")
    })
}

/// Normalize `col [ASC|DESC], ...`, rejecting anything else
fn check_sort_order(order: &str) -> Result<String> {
    let mut terms = Vec::new();
    for term in order.split(',') {
        let caps = sort_term()
            .captures(term)
            .ok_or_else(|| Error::InvalidSortOrder(order.to_string()))?;
        let column = &caps[1];
        if !fruit_entry::is_column(column) {
            return Err(Error::UnknownColumn(column.to_string()));
        }
        match caps.get(2) {
            Some(dir) => terms.push(format!("{} {}", column, dir.as_str().to_ascii_uppercase())),
            None => terms.push(column.to_string()),
        }
    }
    Ok(terms.join(", "))
}

/// Inventory statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbStats {
    pub products: usize,
    pub units_in_stock: i64,
    pub units_ordered: i64,
    pub total_sales: f64,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Inventory Statistics:")?;
        writeln!(f, "  Products: {}", self.products)?;
        writeln!(f, "  Units in stock: {}", self.units_in_stock)?;
        writeln!(f, "  Units ordered: {}", self.units_ordered)?;
        writeln!(f, "  Total sales: {:.2}", self.total_sales)
    }
}
