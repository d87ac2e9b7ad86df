//! unitrack storage server
//!
//! Stores progress exports as JSON files in one directory and serves the
//! built front-end.

#![warn(missing_docs)]

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use unitrack_storage::StorageFolder;

pub mod config;
pub mod handlers;

pub use config::ServerConfig;
pub use handlers::{ApiError, AppState};

/// Largest accepted request body. Unchunked exports can reach several MiB.
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Router over `folder`, falling back to `static_dir` for unknown paths.
pub fn create_router(folder: StorageFolder, static_dir: Option<&Path>) -> Router {
    let state = Arc::new(AppState { folder });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/storage-files", get(handlers::list_files))
        .route("/api/load-progress/{filename}", get(handlers::load_progress))
        .route("/api/save-progress", post(handlers::save_progress))
        .route("/api/delete-progress/{filename}", delete(handlers::delete_progress))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

/// Router for `config`.
pub fn router_for(config: &ServerConfig) -> Router {
    create_router(
        StorageFolder::new(&config.storage_dir),
        config.static_dir.as_deref(),
    )
}
