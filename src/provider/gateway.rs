//! Fruit provider - the single entry point for reads and writes
//!
//! Every call resolves its address first. `NoMatch` addresses fail with
//! [`Error::UnsupportedAddress`] before anything else happens. Writes are
//! validated before the store is touched, and a write that changes rows
//! notifies the [`ChangeBus`] with the address it was called on.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use crate::bus::ChangeBus;
use crate::contract::{self, fruit_entry};
use crate::cursor::Cursor;
use crate::storage::{DbStats, FruitStore};
use crate::uri::{ContentUri, UriMatch};
use crate::values::{ContentValues, Value};
use crate::{Error, Result};
use super::validate::{self, Mode};

/// Content provider for the fruits table.
///
/// Holds no per-call state; rows live in the store and subscriptions in
/// the bus.
pub struct FruitProvider {
    store: Mutex<FruitStore>,
    bus: ChangeBus,
}

impl FruitProvider {
    /// Provider with its own notification bus
    pub fn new(store: FruitStore) -> Self {
        Self::with_bus(store, ChangeBus::new())
    }

    /// Provider notifying on a shared bus
    pub fn with_bus(store: FruitStore, bus: ChangeBus) -> Self {
        Self {
            store: Mutex::new(store),
            bus,
        }
    }

    /// Open a provider over a database file
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(FruitStore::open(path)?))
    }

    /// Open a provider over an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(FruitStore::open_in_memory()?))
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    fn store(&self) -> MutexGuard<'_, FruitStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read rows at `uri`.
    ///
    /// For an item address the selection is replaced by the row id. The
    /// cursor is subscribed to `uri` and goes stale on a related change.
    /// An empty cursor is a normal result.
    pub fn query(
        &self,
        uri: &str,
        projection: Option<&[&str]>,
        selection: Option<&str>,
        selection_args: &[Value],
        sort_order: Option<&str>,
    ) -> Result<Cursor> {
        let (address, target) = resolve(uri, "query")?;
        let scope = Scope::new(target, selection, selection_args);
        let raw = self.store().query(projection, scope.selection(), &scope.args, sort_order)?;

        tracing::debug!("query {} -> {} row(s)", address, raw.rows.len());
        let subscription = self.bus.subscribe(&address);
        Ok(Cursor::with_subscription(raw, subscription))
    }

    /// Insert a fruit and return the new row's address.
    ///
    /// Only the collection address accepts inserts. A payload that passes
    /// validation but is refused by the store yields `Ok(None)`.
    pub fn insert(&self, uri: &str, values: &ContentValues) -> Result<Option<ContentUri>> {
        let (address, target) = resolve(uri, "insert")?;
        if target != Target::Collection {
            return Err(Error::UnsupportedAddress(format!("Insertion is not supported for {}", uri)));
        }

        if let Err(e) = validate::validate(values, Mode::Insert) {
            tracing::warn!("Rejected insert for {}: {}", address, e);
            return Err(e);
        }

        let id = match self.store().insert(values) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Failed to insert row for {}: {}", address, e);
                return Ok(None);
            }
        };

        self.bus.notify_change(&address);
        let new_uri = address.with_appended_id(id);
        tracing::debug!("insert -> {}", new_uri);
        Ok(Some(new_uri))
    }

    /// Update rows at `uri` and return how many changed.
    ///
    /// Only columns present in `values` are validated and written. An empty
    /// payload returns 0 without touching the store.
    pub fn update(
        &self,
        uri: &str,
        values: &ContentValues,
        selection: Option<&str>,
        selection_args: &[Value],
    ) -> Result<usize> {
        let (address, target) = resolve(uri, "update")?;

        if let Err(e) = validate::validate(values, Mode::Update) {
            tracing::warn!("Rejected update for {}: {}", address, e);
            return Err(e);
        }
        if values.is_empty() {
            return Ok(0);
        }

        let scope = Scope::new(target, selection, selection_args);
        let changed = self.store().update(values, scope.selection(), &scope.args)?;

        tracing::debug!("update {} -> {} row(s)", address, changed);
        if changed != 0 {
            self.bus.notify_change(&address);
        }
        Ok(changed)
    }

    /// Delete rows at `uri` and return how many were removed
    pub fn delete(&self, uri: &str, selection: Option<&str>, selection_args: &[Value]) -> Result<usize> {
        let (address, target) = resolve(uri, "delete")?;
        let scope = Scope::new(target, selection, selection_args);
        let removed = self.store().delete(scope.selection(), &scope.args)?;

        tracing::debug!("delete {} -> {} row(s)", address, removed);
        if removed != 0 {
            self.bus.notify_change(&address);
        }
        Ok(removed)
    }

    /// MIME type of the data at `uri`
    pub fn get_type(&self, uri: &str) -> Result<String> {
        let (_, target) = resolve(uri, "type")?;
        Ok(match target {
            Target::Collection => contract::content_list_type(),
            Target::Item(_) => contract::content_item_type(),
        })
    }

    /// Signal a change made outside this provider (another process, a
    /// caller that wants related cursors refreshed).
    pub fn notify_change(&self, uri: &ContentUri) -> usize {
        self.bus.notify_change(uri)
    }

    /// Inventory statistics
    pub fn stats(&self) -> Result<DbStats> {
        self.store().stats()
    }
}

/// Resolved shape of a recognized address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Collection,
    Item(i64),
}

fn resolve(uri: &str, operation: &str) -> Result<(ContentUri, Target)> {
    let unsupported = || Error::UnsupportedAddress(format!("Cannot {} unknown URI {}", operation, uri));
    let address = ContentUri::parse(uri).map_err(|_| unsupported())?;
    // Rebuilt so `fruits/007` and `fruits/7` subscribe and notify as one address
    match address.resolve() {
        UriMatch::Fruits => Ok((ContentUri::fruits(), Target::Collection)),
        UriMatch::FruitId(id) => Ok((ContentUri::fruit(id), Target::Item(id))),
        UriMatch::NoMatch => Err(unsupported()),
    }
}

/// Row filter for one call. Item addresses replace the caller's filter
/// with the row id.
struct Scope {
    selection: Option<String>,
    args: Vec<Value>,
}

impl Scope {
    fn new(target: Target, selection: Option<&str>, args: &[Value]) -> Self {
        match target {
            Target::Collection => Self {
                selection: selection.map(str::to_string),
                args: args.to_vec(),
            },
            Target::Item(id) => Self {
                selection: Some(format!("{} = ?", fruit_entry::ID)),
                args: vec![Value::Integer(id)],
            },
        }
    }

    fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::fruit_entry::*;

    fn fruits() -> String {
        ContentUri::fruits().to_uri_string()
    }

    fn tomato() -> ContentValues {
        ContentValues::new()
            .with(NAME, "Tomato")
            .with(PRICE, 5.0)
            .with(QUANTITY, 100)
            .with(SUPPLIER, "Juan Carlos S.L.")
    }

    #[test]
    fn test_insert_returns_item_address() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let uri = provider.insert(&fruits(), &tomato()).unwrap().unwrap();
        assert!(matches!(uri.resolve(), UriMatch::FruitId(_)));

        let cursor = provider.query(&uri.to_uri_string(), None, None, &[], None).unwrap();
        assert_eq!(cursor.len(), 1);
        assert_eq!(cursor.get_string(0, NAME).as_deref(), Some("Tomato"));
        assert_eq!(cursor.get_i64(0, ID), uri.parse_id());
    }

    #[test]
    fn test_defaults_filled_on_insert() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let values = ContentValues::new().with(NAME, "Kiwi").with(PRICE, "1.25");
        let uri = provider.insert(&fruits(), &values).unwrap().unwrap();

        let cursor = provider.query(&uri.to_uri_string(), None, None, &[], None).unwrap();
        assert_eq!(cursor.get_f64(0, PRICE), Some(1.25));
        assert_eq!(cursor.get_i64(0, QUANTITY), Some(0));
        assert_eq!(cursor.get_string(0, SUPPLIER).as_deref(), Some(DEFAULT_SUPPLIER));
        assert_eq!(cursor.get_i64(0, QUANTITY_ORDERED), Some(0));
        assert_eq!(cursor.get_f64(0, TOTAL), Some(0.0));
    }

    #[test]
    fn test_invalid_insert_creates_nothing_and_stays_quiet() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let list = provider.query(&fruits(), None, None, &[], None).unwrap();

        let no_name = ContentValues::new().with(PRICE, 1.0);
        assert!(matches!(provider.insert(&fruits(), &no_name), Err(Error::InvalidArgument(_))));
        let negative = ContentValues::new().with(NAME, "Kiwi").with(PRICE, -1.0);
        assert!(matches!(provider.insert(&fruits(), &negative), Err(Error::InvalidArgument(_))));

        assert!(!list.is_stale());
        assert_eq!(provider.stats().unwrap().products, 0);
    }

    #[test]
    fn test_id_in_payload_rejected() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let forced = tomato().with(ID, 4242);
        assert!(matches!(provider.insert(&fruits(), &forced), Err(Error::InvalidArgument(_))));
        assert_eq!(provider.stats().unwrap().products, 0);

        let uri = provider.insert(&fruits(), &tomato()).unwrap().unwrap();
        let renumber = ContentValues::new().with(ID, 999);
        assert!(matches!(
            provider.update(&uri.to_uri_string(), &renumber, None, &[]),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(provider.query(&uri.to_uri_string(), None, None, &[], None).unwrap().len(), 1);
        assert!(provider.query(&ContentUri::fruit(999).to_uri_string(), None, None, &[], None).unwrap().is_empty());
    }

    #[test]
    fn test_padded_id_shares_notifications() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let uri = provider.insert(&fruits(), &tomato()).unwrap().unwrap();
        let padded = format!("{}/00{}", fruits(), uri.parse_id().unwrap());

        let cursor = provider.query(&padded, None, None, &[], None).unwrap();
        assert_eq!(cursor.len(), 1);
        assert_eq!(cursor.notification_uri(), Some(&uri));

        let changed = ContentValues::new().with(QUANTITY, 7);
        assert_eq!(provider.update(&uri.to_uri_string(), &changed, None, &[]).unwrap(), 1);
        assert!(cursor.is_stale());

        let plain = provider.query(&uri.to_uri_string(), None, None, &[], None).unwrap();
        provider.delete(&padded, None, &[]).unwrap();
        assert!(plain.is_stale());
    }

    #[test]
    fn test_store_refusal_is_no_address() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let list = provider.query(&fruits(), None, None, &[], None).unwrap();
        let values = tomato().with("colour", "red");
        assert_eq!(provider.insert(&fruits(), &values).unwrap(), None);
        assert!(!list.is_stale());
    }

    #[test]
    fn test_unsupported_addresses() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let item = ContentUri::fruit(1).to_uri_string();
        let staff = "content://com.example.android.fruitmarket/staff";

        assert!(matches!(provider.insert(&item, &tomato()), Err(Error::UnsupportedAddress(_))));
        assert!(matches!(provider.insert(staff, &tomato()), Err(Error::UnsupportedAddress(_))));
        assert!(matches!(provider.query(staff, None, None, &[], None), Err(Error::UnsupportedAddress(_))));
        assert!(matches!(
            provider.update("garbage", &tomato(), None, &[]),
            Err(Error::UnsupportedAddress(_))
        ));
        assert!(matches!(provider.delete(staff, None, &[]), Err(Error::UnsupportedAddress(_))));
        assert!(matches!(provider.get_type(staff), Err(Error::UnsupportedAddress(_))));
    }

    #[test]
    fn test_item_address_overrides_selection() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let tomato_uri = provider.insert(&fruits(), &tomato()).unwrap().unwrap();
        provider
            .insert(&fruits(), &ContentValues::new().with(NAME, "Apple").with(PRICE, 2.0))
            .unwrap();

        let cursor = provider
            .query(&tomato_uri.to_uri_string(), None, Some("name = ?"), &[Value::from("Apple")], None)
            .unwrap();
        assert_eq!(cursor.len(), 1);
        assert_eq!(cursor.get_string(0, NAME).as_deref(), Some("Tomato"));
    }

    #[test]
    fn test_empty_update_touches_nothing() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let uri = provider.insert(&fruits(), &tomato()).unwrap().unwrap();
        let detail = provider.query(&uri.to_uri_string(), None, None, &[], None).unwrap();

        assert_eq!(provider.update(&uri.to_uri_string(), &ContentValues::new(), None, &[]).unwrap(), 0);
        assert!(!detail.is_stale());
    }

    #[test]
    fn test_update_notifies_and_persists() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let uri = provider.insert(&fruits(), &tomato()).unwrap().unwrap();
        let item = uri.to_uri_string();
        let list = provider.query(&fruits(), None, None, &[], None).unwrap();
        let detail = provider.query(&item, None, None, &[], None).unwrap();

        let changed = provider
            .update(&item, &ContentValues::new().with(QUANTITY, 99), None, &[])
            .unwrap();
        assert_eq!(changed, 1);
        assert!(list.is_stale());
        assert!(detail.is_stale());

        let fresh = provider.query(&item, None, None, &[], None).unwrap();
        assert_eq!(fresh.get_i64(0, QUANTITY), Some(99));
        assert!(!fresh.is_stale());
    }

    #[test]
    fn test_update_validation_fails_before_storage() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let uri = provider.insert(&fruits(), &tomato()).unwrap().unwrap();
        let item = uri.to_uri_string();

        let err = provider.update(&item, &ContentValues::new().with(NAME, ""), None, &[]);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
        let cursor = provider.query(&item, None, None, &[], None).unwrap();
        assert_eq!(cursor.get_string(0, NAME).as_deref(), Some("Tomato"));
    }

    #[test]
    fn test_bulk_update_with_selection() {
        let provider = FruitProvider::open_in_memory().unwrap();
        provider.insert(&fruits(), &tomato()).unwrap();
        provider.insert(&fruits(), &tomato().with(NAME, "Cherry")).unwrap();
        provider
            .insert(&fruits(), &tomato().with(NAME, "Plum").with(SUPPLIER, "Other"))
            .unwrap();

        let changed = provider
            .update(
                &fruits(),
                &ContentValues::new().with(PRICE, 6.0),
                Some("supplier = ?"),
                &[Value::from("Juan Carlos S.L.")],
            )
            .unwrap();
        assert_eq!(changed, 2);
    }

    #[test]
    fn test_unmatched_update_is_zero_without_notification() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let list = provider.query(&fruits(), None, None, &[], None).unwrap();
        let changed = provider
            .update(&ContentUri::fruit(42).to_uri_string(), &ContentValues::new().with(QUANTITY, 1), None, &[])
            .unwrap();
        assert_eq!(changed, 0);
        assert!(!list.is_stale());
    }

    #[test]
    fn test_update_storage_error_propagates() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let uri = provider.insert(&fruits(), &tomato()).unwrap().unwrap();
        let err = provider.update(&uri.to_uri_string(), &ContentValues::new().with("colour", "red"), None, &[]);
        assert!(matches!(err, Err(Error::UnknownColumn(_))));
    }

    #[test]
    fn test_delete_twice() {
        let provider = FruitProvider::open_in_memory().unwrap();
        let uri = provider.insert(&fruits(), &tomato()).unwrap().unwrap();
        let item = uri.to_uri_string();
        let list = provider.query(&fruits(), None, None, &[], None).unwrap();

        assert_eq!(provider.delete(&item, None, &[]).unwrap(), 1);
        assert!(list.is_stale());

        let list = provider.query(&fruits(), None, None, &[], None).unwrap();
        assert_eq!(provider.delete(&item, None, &[]).unwrap(), 0);
        assert!(!list.is_stale());
    }

    #[test]
    fn test_get_type() {
        let provider = FruitProvider::open_in_memory().unwrap();
        assert_eq!(
            provider.get_type(&fruits()).unwrap(),
            "vnd.android.cursor.dir/com.example.android.fruitmarket/fruits"
        );
        assert_eq!(
            provider.get_type(&ContentUri::fruit(3).to_uri_string()).unwrap(),
            "vnd.android.cursor.item/com.example.android.fruitmarket/fruits"
        );
    }
}
