mod health_api;
mod signals;

pub use health_api::health_api;
pub use signals::get_signals;

use crate::app_state::models::AppState;
use crate::layers::{create_cors, create_trace};
use axum::{Extension, Router, routing::get};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

/// API routes plus the front-end, whose unknown paths fall back to the index document
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let server = &app_state.settings.app_config.server;
    let static_dir = Path::new(&server.static_dir);
    let index = static_dir.join(&server.index_file);

    info!("Serving static files from {}", static_dir.display());

    let frontend = ServeDir::new(static_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/api/signals", get(get_signals))
        .route("/api-health", get(health_api))
        .fallback_service(frontend)
        .layer(Extension(app_state))
        .layer(create_cors())
        .layer(create_trace())
}
