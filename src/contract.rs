//! Fruit contract - names shared by storage, addressing and callers
//!
//! Every address the provider understands is built from
//! `content://<CONTENT_AUTHORITY>/<PATH_FRUITS>`.

/// Name of the database file
pub const DATABASE_NAME: &str = "fruitmarket.db";

/// Schema version stored in `PRAGMA user_version`.
/// Bump when the table layout changes.
pub const DATABASE_VERSION: i64 = 1;

/// Scheme of every provider address
pub const CONTENT_SCHEME: &str = "content";

/// Name for the entire provider, similar to a domain name
pub const CONTENT_AUTHORITY: &str = "com.example.android.fruitmarket";

/// Path appended to the base address for fruit data
pub const PATH_FRUITS: &str = "fruits";

/// MIME prefix for a list of rows
pub const CURSOR_DIR_BASE_TYPE: &str = "vnd.android.cursor.dir";

/// MIME prefix for a single row
pub const CURSOR_ITEM_BASE_TYPE: &str = "vnd.android.cursor.item";

/// Columns and defaults of the `fruits` table
pub mod fruit_entry {
    /// Name of database table for fruits
    pub const TABLE_NAME: &str = "fruits";

    /// Unique id, assigned by the store. INTEGER
    pub const ID: &str = "id";
    /// Product name. TEXT, never empty
    pub const NAME: &str = "name";
    /// Unit price. REAL, >= 0
    pub const PRICE: &str = "price";
    /// Units in stock. INTEGER, >= 0
    pub const QUANTITY: &str = "quantity";
    /// Supplier name. TEXT
    pub const SUPPLIER: &str = "supplier";
    /// Units ordered so far. INTEGER
    pub const QUANTITY_ORDERED: &str = "quantity_ordered";
    /// price * quantity_ordered, maintained by callers. REAL
    pub const TOTAL: &str = "total";
    /// Image bytes or an image reference. BLOB
    pub const PICTURE: &str = "picture";

    /// Stored when no supplier is given
    pub const DEFAULT_SUPPLIER: &str = "UNKNOWN";
    /// Stored when no picture is given
    pub const DEFAULT_PICTURE: &str = "NO IMAGE AVAILABLE";

    /// Every column, in declaration order
    pub const ALL_COLUMNS: &[&str] = &[
        ID,
        NAME,
        PRICE,
        QUANTITY,
        SUPPLIER,
        QUANTITY_ORDERED,
        TOTAL,
        PICTURE,
    ];

    /// True if `name` is a column of the fruits table
    pub fn is_column(name: &str) -> bool {
        ALL_COLUMNS.contains(&name)
    }
}

/// Address of the whole fruit collection
pub fn content_uri() -> String {
    format!("{}://{}/{}", CONTENT_SCHEME, CONTENT_AUTHORITY, PATH_FRUITS)
}

/// MIME type for a list of fruits
pub fn content_list_type() -> String {
    format!("{}/{}/{}", CURSOR_DIR_BASE_TYPE, CONTENT_AUTHORITY, PATH_FRUITS)
}

/// MIME type for a single fruit
pub fn content_item_type() -> String {
    format!("{}/{}/{}", CURSOR_ITEM_BASE_TYPE, CONTENT_AUTHORITY, PATH_FRUITS)
}
