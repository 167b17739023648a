use fruitmarket::contract::fruit_entry::*;
use fruitmarket::{ContentUri, ContentValues, FruitProvider, UriMatch, Value};

fn fruits() -> String {
    ContentUri::fruits().to_uri_string()
}

#[test]
fn test_tomato_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FruitProvider::open(&dir.path().join("fruitmarket.db")).unwrap();
    let list = provider.query(&fruits(), None, None, &[], None).unwrap();

    let picture = vec![0xFF, 0xD8, 0xFF, 0xE0];
    let values = ContentValues::new()
        .with(NAME, "Tomato")
        .with(PRICE, 5.0)
        .with(QUANTITY, 100)
        .with(SUPPLIER, "Juan Carlos S.L.")
        .with(PICTURE, Value::Blob(picture.clone()));
    let uri = provider.insert(&fruits(), &values).unwrap().expect("insert should return an address");

    let id = uri.parse_id().unwrap();
    assert_eq!(uri.resolve(), UriMatch::FruitId(id));
    assert!(list.is_stale());

    let item = uri.to_uri_string();
    let row = provider.query(&item, None, None, &[], None).unwrap();
    assert_eq!(row.len(), 1);
    assert_eq!(row.get_string(0, NAME).as_deref(), Some("Tomato"));
    assert_eq!(row.get_i64(0, QUANTITY_ORDERED), Some(0));
    assert_eq!(row.get_f64(0, TOTAL), Some(0.0));
    assert_eq!(row.get_blob(0, PICTURE), Some(&picture[..]));

    let changes = ContentValues::new()
        .with(QUANTITY, 99)
        .with(QUANTITY_ORDERED, 1)
        .with(TOTAL, 5.0);
    assert_eq!(provider.update(&item, &changes, None, &[]).unwrap(), 1);
    assert!(row.is_stale());

    let updated = provider.query(&item, None, None, &[], None).unwrap();
    assert_eq!(updated.get_i64(0, QUANTITY), Some(99));
    assert_eq!(updated.get_i64(0, QUANTITY_ORDERED), Some(1));
    assert_eq!(updated.get_f64(0, TOTAL), Some(5.0));

    assert_eq!(provider.delete(&fruits(), None, &[]).unwrap(), 1);
    assert!(updated.is_stale());
    assert!(provider.query(&fruits(), None, None, &[], None).unwrap().is_empty());
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fruitmarket.db");

    {
        let provider = FruitProvider::open(&path).unwrap();
        let values = ContentValues::new().with(NAME, "Peach").with(PRICE, 2.25);
        provider.insert(&fruits(), &values).unwrap().unwrap();
    }

    let provider = FruitProvider::open(&path).unwrap();
    let cursor = provider.query(&fruits(), None, None, &[], None).unwrap();
    assert_eq!(cursor.len(), 1);
    assert_eq!(cursor.get_string(0, SUPPLIER).as_deref(), Some(DEFAULT_SUPPLIER));
}

#[test]
fn test_rejected_writes_leave_no_trace() {
    let provider = FruitProvider::open_in_memory().unwrap();
    let list = provider.query(&fruits(), None, None, &[], None).unwrap();

    let no_name = ContentValues::new().with(PRICE, 1.0);
    assert!(provider.insert(&fruits(), &no_name).is_err());
    let negative = ContentValues::new().with(NAME, "Kiwi").with(PRICE, -1.0);
    assert!(provider.insert(&fruits(), &negative).is_err());

    assert_eq!(provider.update(&ContentUri::fruit(1).to_uri_string(), &ContentValues::new(), None, &[]).unwrap(), 0);
    assert_eq!(provider.delete(&ContentUri::fruit(77).to_uri_string(), None, &[]).unwrap(), 0);

    assert!(!list.is_stale());
    assert!(provider.query(&fruits(), None, None, &[], None).unwrap().is_empty());
}
