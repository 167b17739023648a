//! Async access to a [`FruitProvider`]
//!
//! Storage calls block on SQLite, so each call runs on tokio's blocking
//! pool and the caller resumes on its own task. Dropping the returned
//! future does not cancel the storage call; a write that was dispatched
//! still completes.

use std::sync::Arc;
use crate::cursor::Cursor;
use crate::storage::DbStats;
use crate::uri::ContentUri;
use crate::values::{ContentValues, Value};
use crate::{Error, Result};
use super::FruitProvider;

/// Query arguments in owned form
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pub projection: Option<Vec<String>>,
    pub selection: Option<String>,
    pub selection_args: Vec<Value>,
    pub sort_order: Option<String>,
}

impl QueryArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn selection(mut self, selection: impl Into<String>, args: Vec<Value>) -> Self {
        self.selection = Some(selection.into());
        self.selection_args = args;
        self
    }

    pub fn sort_order(mut self, order: impl Into<String>) -> Self {
        self.sort_order = Some(order.into());
        self
    }
}

/// Cheap, clonable async handle. All clones share one provider.
#[derive(Clone)]
pub struct ProviderHandle {
    provider: Arc<FruitProvider>,
}

impl ProviderHandle {
    pub fn new(provider: FruitProvider) -> Self {
        Self::from_arc(Arc::new(provider))
    }

    pub fn from_arc(provider: Arc<FruitProvider>) -> Self {
        Self { provider }
    }

    /// The shared provider, for synchronous callers
    pub fn provider(&self) -> &Arc<FruitProvider> {
        &self.provider
    }

    async fn run<T, F>(&self, call: F) -> Result<T>
    where
        F: FnOnce(&FruitProvider) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let provider = Arc::clone(&self.provider);
        tokio::task::spawn_blocking(move || call(&*provider))
            .await
            .map_err(|e| Error::Task(e.to_string()))?
    }

    pub async fn query(&self, uri: impl Into<String>, args: QueryArgs) -> Result<Cursor> {
        let uri = uri.into();
        self.run(move |p| {
            let projection: Option<Vec<&str>> = args
                .projection
                .as_ref()
                .map(|cols| cols.iter().map(String::as_str).collect());
            p.query(
                &uri,
                projection.as_deref(),
                args.selection.as_deref(),
                &args.selection_args,
                args.sort_order.as_deref(),
            )
        })
        .await
    }

    pub async fn insert(&self, uri: impl Into<String>, values: ContentValues) -> Result<Option<ContentUri>> {
        let uri = uri.into();
        self.run(move |p| p.insert(&uri, &values)).await
    }

    pub async fn update(
        &self,
        uri: impl Into<String>,
        values: ContentValues,
        selection: Option<String>,
        selection_args: Vec<Value>,
    ) -> Result<usize> {
        let uri = uri.into();
        self.run(move |p| p.update(&uri, &values, selection.as_deref(), &selection_args))
            .await
    }

    pub async fn delete(
        &self,
        uri: impl Into<String>,
        selection: Option<String>,
        selection_args: Vec<Value>,
    ) -> Result<usize> {
        let uri = uri.into();
        self.run(move |p| p.delete(&uri, selection.as_deref(), &selection_args))
            .await
    }

    pub async fn get_type(&self, uri: impl Into<String>) -> Result<String> {
        let uri = uri.into();
        self.run(move |p| p.get_type(&uri)).await
    }

    pub async fn stats(&self) -> Result<DbStats> {
        self.run(|p| p.stats()).await
    }

    /// Run an arbitrary synchronous provider call on the blocking pool
    pub async fn with_provider<T, F>(&self, call: F) -> Result<T>
    where
        F: FnOnce(&FruitProvider) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run(call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::fruit_entry::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_async_crud_roundtrip() {
        let handle = ProviderHandle::new(FruitProvider::open_in_memory().unwrap());
        let fruits = ContentUri::fruits().to_uri_string();

        let values = ContentValues::new().with(NAME, "Mango").with(PRICE, 3.5);
        let uri = handle.insert(fruits.clone(), values).await.unwrap().unwrap();

        let cursor = handle
            .query(uri.to_uri_string(), QueryArgs::new().projection([NAME, PRICE]))
            .await
            .unwrap();
        assert_eq!(cursor.columns(), &["name".to_string(), "price".to_string()]);
        assert_eq!(cursor.get_string(0, NAME).as_deref(), Some("Mango"));

        let updated = handle
            .update(uri.to_uri_string(), ContentValues::new().with(QUANTITY, 4), None, vec![])
            .await
            .unwrap();
        assert_eq!(updated, 1);

        assert_eq!(handle.delete(fruits, None, vec![]).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cursor_wakes_after_async_write() {
        let handle = ProviderHandle::new(FruitProvider::open_in_memory().unwrap());
        let fruits = ContentUri::fruits().to_uri_string();
        let list = handle.query(fruits.clone(), QueryArgs::new()).await.unwrap();
        assert!(list.is_empty());

        let writer = handle.clone();
        tokio::spawn(async move {
            let values = ContentValues::new().with(NAME, "Lime").with(PRICE, 0.4);
            writer.insert(fruits, values).await.unwrap();
        });

        tokio::time::timeout(Duration::from_secs(5), list.changed())
            .await
            .expect("list should be invalidated by the insert");
    }

    #[tokio::test]
    async fn test_errors_cross_the_task_boundary() {
        let handle = ProviderHandle::new(FruitProvider::open_in_memory().unwrap());
        let err = handle.get_type("content://nowhere/else").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedAddress(_)));
    }
}
