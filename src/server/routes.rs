use axum::{
    extract::{Path, Query, State},
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::cursor::Cursor;
use crate::inventory::{self, Fruit};
use crate::provider::QueryArgs;
use crate::server::AppState;
use crate::storage::DbStats;
use crate::uri::ContentUri;
use crate::values::ContentValues;
use crate::Error;

#[derive(Deserialize)]
pub struct ListParams {
    pub order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub uri: ContentUri,
}

#[derive(Debug, Serialize)]
pub struct Updated {
    pub updated: usize,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: usize,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: Error) -> ApiError {
    let status = match &e {
        Error::InvalidArgument(_) | Error::UnknownColumn(_) | Error::InvalidSortOrder(_) => StatusCode::BAD_REQUEST,
        Error::UnsupportedAddress(_) | Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::OutOfStock(_) | Error::Conflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

// Built as a raw string so malformed ids fail in the resolver, not here
fn item_uri(id: &str) -> String {
    format!("{}/{}", ContentUri::fruits(), id)
}

pub async fn list_fruits(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Cursor>, ApiError> {
    let mut args = QueryArgs::new();
    if let Some(order) = params.order {
        args = args.sort_order(order);
    }
    let cursor = state.handle.query(ContentUri::fruits().to_uri_string(), args).await.map_err(api_error)?;
    Ok(Json(cursor))
}

pub async fn get_fruit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let uri = item_uri(&id);
    let cursor = state.handle.query(uri.clone(), QueryArgs::new()).await.map_err(api_error)?;
    let row = cursor.row(0).ok_or_else(|| api_error(Error::NotFound(uri)))?;
    let body = serde_json::to_value(row)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: e.to_string() })))?;
    Ok(Json(body))
}

pub async fn create_fruit(
    State(state): State<Arc<AppState>>,
    Json(values): Json<ContentValues>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let inserted = state
        .handle
        .insert(ContentUri::fruits().to_uri_string(), values)
        .await
        .map_err(api_error)?;

    match inserted {
        Some(uri) => Ok((StatusCode::CREATED, Json(Created { uri }))),
        None => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: "Failed to insert row".to_string() }),
        )),
    }
}

pub async fn update_fruit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(values): Json<ContentValues>,
) -> Result<Json<Updated>, ApiError> {
    let updated = state
        .handle
        .update(item_uri(&id), values, None, vec![])
        .await
        .map_err(api_error)?;
    Ok(Json(Updated { updated }))
}

pub async fn delete_fruit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let deleted = state.handle.delete(item_uri(&id), None, vec![]).await.map_err(api_error)?;
    Ok(Json(Deleted { deleted }))
}

pub async fn delete_fruits(State(state): State<Arc<AppState>>) -> Result<Json<Deleted>, ApiError> {
    let deleted = state
        .handle
        .with_provider(|p| inventory::delete_all(p))
        .await
        .map_err(api_error)?;
    Ok(Json(Deleted { deleted }))
}

pub async fn order_fruit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Fruit>, ApiError> {
    let uri = ContentUri::parse(&item_uri(&id)).map_err(api_error)?;
    let fruit = state
        .handle
        .with_provider(move |p| inventory::order_one(p, &uri))
        .await
        .map_err(api_error)?;
    Ok(Json(fruit))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<DbStats>, ApiError> {
    let stats = state.handle.stats().await.map_err(api_error)?;
    Ok(Json(stats))
}
