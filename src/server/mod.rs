use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::provider::{FruitProvider, ProviderHandle};

pub mod routes;

/// Server state
pub struct AppState {
    pub handle: ProviderHandle,
}

/// Routes over an already opened provider
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/fruits",
            get(routes::list_fruits)
                .post(routes::create_fruit)
                .delete(routes::delete_fruits),
        )
        .route(
            "/fruits/{id}",
            get(routes::get_fruit)
                .patch(routes::update_fruit)
                .delete(routes::delete_fruit),
        )
        .route("/fruits/{id}/order", post(routes::order_fruit))
        .route("/stats", get(routes::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, database_path: PathBuf) -> anyhow::Result<()> {
    let provider = FruitProvider::open(&database_path)?;
    let state = Arc::new(AppState {
        handle: ProviderHandle::new(provider),
    });

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {} (database {})", addr, database_path.display());
    println!("🍎 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
