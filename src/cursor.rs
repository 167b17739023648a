//! Result sets returned by provider queries

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use crate::bus::Subscription;
use crate::storage::RawRows;
use crate::uri::ContentUri;
use crate::values::{ContentValues, Value};

/// Rows from one query, plus the subscription that tells the holder when
/// they are out of date.
#[derive(Debug)]
pub struct Cursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    subscription: Option<Subscription>,
}

impl Cursor {
    /// Detached cursor; never goes stale
    pub fn new(raw: RawRows) -> Self {
        Self {
            columns: raw.columns,
            rows: raw.rows,
            subscription: None,
        }
    }

    /// Cursor watching `subscription`'s address
    pub fn with_subscription(raw: RawRows, subscription: Subscription) -> Self {
        let mut cursor = Self::new(raw);
        cursor.subscription = Some(subscription);
        cursor
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at (`row`, `column`); `None` if either is out of range
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn get_i64(&self, row: usize, column: &str) -> Option<i64> {
        self.get(row, column).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, row: usize, column: &str) -> Option<f64> {
        self.get(row, column).and_then(Value::as_f64)
    }

    pub fn get_string(&self, row: usize, column: &str) -> Option<String> {
        self.get(row, column).and_then(Value::as_string)
    }

    pub fn get_blob(&self, row: usize, column: &str) -> Option<&[u8]> {
        self.get(row, column).and_then(Value::as_blob)
    }

    pub fn row(&self, index: usize) -> Option<CursorRow<'_>> {
        self.rows.get(index).map(|values| CursorRow {
            columns: &self.columns,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = CursorRow<'_>> {
        self.rows.iter().map(|values| CursorRow {
            columns: &self.columns,
            values,
        })
    }

    /// Address this cursor was queried from, if it is subscribed
    pub fn notification_uri(&self) -> Option<&ContentUri> {
        self.subscription.as_ref().map(Subscription::uri)
    }

    /// True once the data behind this cursor has changed
    pub fn is_stale(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_stale)
    }

    pub fn version(&self) -> u64 {
        self.subscription.as_ref().map_or(0, Subscription::version)
    }

    /// Resolve once the cursor is stale. A detached cursor never resolves.
    pub async fn changed(&self) {
        match &self.subscription {
            Some(subscription) => subscription.changed().await,
            None => std::future::pending::<()>().await,
        }
    }
}

/// Borrowed view of one cursor row
#[derive(Debug, Clone, Copy)]
pub struct CursorRow<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> CursorRow<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    pub fn get_string(&self, column: &str) -> Option<String> {
        self.get(column).and_then(Value::as_string)
    }

    pub fn get_blob(&self, column: &str) -> Option<&'a [u8]> {
        self.get(column).and_then(Value::as_blob)
    }

    /// Copy the row into a payload, e.g. to edit and write it back
    pub fn to_values(&self) -> ContentValues {
        self.columns
            .iter()
            .zip(self.values.iter())
            .map(|(c, v)| (c.clone(), v.clone()))
            .collect()
    }
}

impl Serialize for CursorRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.values.iter()) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl Serialize for Cursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in self.rows() {
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ChangeBus;

    fn sample() -> RawRows {
        RawRows {
            columns: vec!["id".into(), "name".into(), "price".into()],
            rows: vec![
                vec![Value::Integer(1), Value::from("Tomato"), Value::Real(5.0)],
                vec![Value::Integer(2), Value::from("Apple"), Value::Real(2.5)],
            ],
        }
    }

    #[test]
    fn test_accessors() {
        let cursor = Cursor::new(sample());
        assert_eq!(cursor.len(), 2);
        assert_eq!(cursor.column_index("price"), Some(2));
        assert_eq!(cursor.get_string(1, "name").as_deref(), Some("Apple"));
        assert_eq!(cursor.get_f64(0, "price"), Some(5.0));
        assert_eq!(cursor.get(5, "name"), None);
        assert_eq!(cursor.get(0, "missing"), None);

        let row = cursor.row(0).unwrap();
        assert_eq!(row.get_i64("id"), Some(1));
        assert_eq!(row.to_values().get_as_string("name").as_deref(), Some("Tomato"));
    }

    #[test]
    fn test_detached_cursor_never_stale() {
        let cursor = Cursor::new(sample());
        assert!(!cursor.is_stale());
        assert!(cursor.notification_uri().is_none());
    }

    #[test]
    fn test_subscribed_cursor_goes_stale() {
        let bus = ChangeBus::new();
        let cursor = Cursor::with_subscription(sample(), bus.subscribe(&ContentUri::fruits()));
        assert_eq!(cursor.notification_uri(), Some(&ContentUri::fruits()));
        bus.notify_change(&ContentUri::fruit(2));
        assert!(cursor.is_stale());
        assert_eq!(cursor.version(), 1);
    }

    #[test]
    fn test_serializes_as_objects() {
        let cursor = Cursor::new(sample());
        let json = serde_json::to_value(&cursor).unwrap();
        assert_eq!(json[0]["name"], "Tomato");
        assert_eq!(json[1]["price"], 2.5);
    }
}
