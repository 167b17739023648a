//! Inventory actions built on the provider
//!
//! These are the operations the catalog, detail and editor screens perform.
//! They go through [`FruitProvider`] like any other caller, so validation
//! and change notification apply to them unchanged.

use serde::Serialize;
use crate::contract::fruit_entry::*;
use crate::cursor::{Cursor, CursorRow};
use crate::provider::FruitProvider;
use crate::uri::ContentUri;
use crate::values::{ContentValues, Value};
use crate::{Error, Result};

/// Product image: raw bytes, or a reference such as a file path or URI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Picture {
    Reference(String),
    Image(Vec<u8>),
}

impl Picture {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Blob(bytes)) => Picture::Image(bytes.clone()),
            Some(other) => Picture::Reference(
                other.as_string().unwrap_or_else(|| DEFAULT_PICTURE.to_string()),
            ),
            None => Picture::Reference(DEFAULT_PICTURE.to_string()),
        }
    }

    /// True for the stored placeholder
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Picture::Reference(r) if r == DEFAULT_PICTURE)
    }
}

impl From<Picture> for Value {
    fn from(picture: Picture) -> Self {
        match picture {
            Picture::Reference(r) => Value::Text(r),
            Picture::Image(bytes) => Value::Blob(bytes),
        }
    }
}

/// One full row of the fruits table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fruit {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub supplier: Option<String>,
    pub quantity_ordered: i64,
    pub total: f64,
    pub picture: Picture,
}

impl Fruit {
    /// Build from a row queried with the full column set
    pub fn from_row(row: &CursorRow<'_>) -> Result<Self> {
        let missing = |column: &str| Error::InvalidArgument(format!("row is missing column {}", column));

        Ok(Self {
            id: row.get_i64(ID).ok_or_else(|| missing(ID))?,
            name: row.get_string(NAME).ok_or_else(|| missing(NAME))?,
            price: row.get_f64(PRICE).ok_or_else(|| missing(PRICE))?,
            quantity: row.get_i64(QUANTITY).unwrap_or(0),
            supplier: row.get_string(SUPPLIER),
            quantity_ordered: row.get_i64(QUANTITY_ORDERED).unwrap_or(0),
            total: row.get_f64(TOTAL).unwrap_or(0.0),
            picture: Picture::from_value(row.get(PICTURE)),
        })
    }

    /// Every fruit in a cursor
    pub fn all_from_cursor(cursor: &Cursor) -> Result<Vec<Self>> {
        cursor.rows().map(|row| Self::from_row(&row)).collect()
    }

    /// Address of this fruit
    pub fn uri(&self) -> ContentUri {
        ContentUri::fruit(self.id)
    }
}

/// Editor input for a new fruit
#[derive(Debug, Clone, PartialEq)]
pub struct NewFruit {
    pub name: String,
    pub price: f64,
    pub quantity: Option<i64>,
    pub supplier: Option<String>,
    pub picture: Option<Picture>,
}

impl NewFruit {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            quantity: None,
            supplier: None,
            picture: None,
        }
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn picture(mut self, picture: Picture) -> Self {
        self.picture = Some(picture);
        self
    }

    /// Payload for [`FruitProvider::insert`]. Unset optional fields are left
    /// out so the column defaults apply.
    pub fn into_values(self) -> ContentValues {
        let mut values = ContentValues::new();
        values.put(NAME, self.name).put(PRICE, self.price);
        if let Some(quantity) = self.quantity {
            values.put(QUANTITY, quantity);
        }
        if let Some(supplier) = self.supplier {
            values.put(SUPPLIER, supplier);
        }
        if let Some(picture) = self.picture {
            values.put(PICTURE, picture);
        }
        values
    }
}

/// Read one fruit; `None` if the id has no row
pub fn fetch(provider: &FruitProvider, uri: &ContentUri) -> Result<Option<Fruit>> {
    let cursor = provider.query(&uri.to_uri_string(), None, None, &[], None)?;
    cursor.row(0).map(|row| Fruit::from_row(&row)).transpose()
}

/// Read every fruit in `sort_order` (`None` for insertion order)
pub fn list(provider: &FruitProvider, sort_order: Option<&str>) -> Result<Vec<Fruit>> {
    let cursor = provider.query(&ContentUri::fruits().to_uri_string(), None, None, &[], sort_order)?;
    Fruit::all_from_cursor(&cursor)
}

/// Insert a fruit from editor input
pub fn add(provider: &FruitProvider, fruit: NewFruit) -> Result<Option<ContentUri>> {
    provider.insert(&ContentUri::fruits().to_uri_string(), &fruit.into_values())
}

/// Insert the catalog's sample row
pub fn insert_sample(provider: &FruitProvider) -> Result<Option<ContentUri>> {
    let sample = NewFruit::new("Tomato", 5.0)
        .quantity(100)
        .supplier("Juan Carlos S.L.")
        .picture(Picture::Reference("picture".to_string()));
    add(provider, sample)
}

/// Conditional writes retry this many times before giving up
const WRITE_ATTEMPTS: usize = 16;

/// Write `values` to `seen`'s row only if its stock counters still match
/// `seen`. Returns false when another writer changed them first.
fn write_if_unchanged(provider: &FruitProvider, seen: &Fruit, values: &ContentValues) -> Result<bool> {
    let selection = format!("{} = ? AND {} = ? AND {} = ?", ID, QUANTITY, QUANTITY_ORDERED);
    let args = [
        Value::Integer(seen.id),
        Value::Integer(seen.quantity),
        Value::Integer(seen.quantity_ordered),
    ];
    let changed = provider.update(&ContentUri::fruits().to_uri_string(), values, Some(&selection), &args)?;
    Ok(changed == 1)
}

/// Sell one unit: stock goes down by one, the ordered counter goes up by one
/// and `total` becomes `price * quantity_ordered`.
pub fn order_one(provider: &FruitProvider, uri: &ContentUri) -> Result<Fruit> {
    for _ in 0..WRITE_ATTEMPTS {
        let fruit = fetch(provider, uri)?.ok_or_else(|| Error::NotFound(uri.to_uri_string()))?;
        if fruit.quantity <= 0 {
            return Err(Error::OutOfStock(fruit.name));
        }

        let quantity = fruit.quantity - 1;
        let ordered = fruit.quantity_ordered + 1;
        let total = fruit.price * ordered as f64;
        let values = ContentValues::new()
            .with(QUANTITY, quantity)
            .with(QUANTITY_ORDERED, ordered)
            .with(TOTAL, total);

        if write_if_unchanged(provider, &fruit, &values)? {
            return Ok(Fruit {
                quantity,
                quantity_ordered: ordered,
                total,
                ..fruit
            });
        }
        tracing::debug!("stock of {} changed during order, retrying", uri);
    }
    Err(Error::Conflict(uri.to_uri_string()))
}

/// Add `delta` units to stock (negative to remove). Stock never drops
/// below zero. Returns the new quantity.
pub fn adjust_stock(provider: &FruitProvider, uri: &ContentUri, delta: i64) -> Result<i64> {
    for _ in 0..WRITE_ATTEMPTS {
        let fruit = fetch(provider, uri)?.ok_or_else(|| Error::NotFound(uri.to_uri_string()))?;
        let quantity = fruit.quantity.saturating_add(delta).max(0);
        if quantity == fruit.quantity {
            return Ok(quantity);
        }

        let values = ContentValues::new().with(QUANTITY, quantity);
        if write_if_unchanged(provider, &fruit, &values)? {
            return Ok(quantity);
        }
        tracing::debug!("stock of {} changed during adjustment, retrying", uri);
    }
    Err(Error::Conflict(uri.to_uri_string()))
}

/// Remove every fruit
pub fn delete_all(provider: &FruitProvider) -> Result<usize> {
    provider.delete(&ContentUri::fruits().to_uri_string(), None, &[])
}
