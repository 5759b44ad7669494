use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::{CorsConfig, FrontendConfig};
use crate::visit::VisitService;

use super::handlers::{platform_info, record_visit, AppState};
use super::static_files::serve_frontend;

pub fn create_api_router(
    visits: VisitService,
    platform_name: String,
    cors: &CorsConfig,
    frontend: &FrontendConfig,
) -> Router {
    let state = Arc::new(AppState {
        visits,
        platform_name,
    });

    let api_routes = Router::new()
        .route("/api", get(platform_info))
        .route("/api/", get(platform_info))
        .route("/api/visit-count", post(record_visit))
        .layer(cors_layer(cors))
        .with_state(state);

    match frontend.static_dir.as_deref() {
        Some(dir) => api_routes.fallback_service(serve_frontend(dir)),
        None => api_routes,
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}
