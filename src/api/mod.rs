//! API layer - HTTP handlers and routing
//!
//! Read-only JSON API under `/api/v1`:
//! - Catalog listing, featured widget and item detail per domain
//! - Category and level directories
//! - Health check

pub mod common;
pub mod content;
pub mod directory;
pub mod middleware;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub use middleware::{ApiError, AppState};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Catalog routes see the caller's identity
    let catalog_routes = content::router().route_layer(axum_middleware::from_fn_with_state(
        state,
        middleware::resolve_identity,
    ));

    Router::new()
        .route("/categories", get(directory::list_categories))
        .route("/levels", get(directory::list_levels))
        .route("/health", get(directory::health))
        .merge(catalog_routes)
}

fn cors_layer(cors_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE]);

    if cors_origin.trim() == "*" {
        return cors.allow_origin(Any);
    }

    match cors_origin.parse::<HeaderValue>() {
        // Cookies carry the session, so a concrete origin allows credentials
        Ok(origin) => cors
            .allow_origin(AllowOrigin::exact(origin))
            .allow_credentials(true),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {:?}, allowing any origin", cors_origin);
            cors.allow_origin(Any)
        }
    }
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origin)),
        )
        .with_state(state)
}

