//! Route definitions for the Gatehouse HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`; the
//! WebSocket upgrade lives at the root. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(arrival_routes())
        .merge(visitor_routes())
        .merge(invite_routes())
        .merge(feedback_routes())
        .merge(dashboard_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Arrival check-in.
fn arrival_routes() -> Router<AppState> {
    Router::new().route("/arrivals", post(handlers::arrival::process_arrival))
}

/// Visitor pre-registration and lookup.
fn visitor_routes() -> Router<AppState> {
    Router::new()
        .route("/visitors", post(handlers::visitor::register_visitor))
        .route("/visitors/{id}", get(handlers::visitor::get_visitor))
}

/// Invite registration.
fn invite_routes() -> Router<AppState> {
    Router::new()
        .route("/invites", post(handlers::invite::register_invite))
        .route("/invites/bulk", post(handlers::invite::register_bulk))
}

/// Feedback submission.
fn feedback_routes() -> Router<AppState> {
    Router::new().route("/feedback", post(handlers::feedback::submit_feedback))
}

/// Dashboard cards, broadcast, and activity heartbeat.
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/cards", post(handlers::dashboard::load_card))
        .route(
            "/dashboard/broadcast",
            post(handlers::dashboard::broadcast_card),
        )
        .route("/heartbeat", post(handlers::heartbeat::record_heartbeat))
}

/// Health check endpoints (no auth required).
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/detailed", get(handlers::health::detailed_health))
}

/// Build CORS layer from configuration.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    use http::Method;
    use tower_http::cors::Any;

    let cors_config = &state.config.server.cors;

    let mut cors = CorsLayer::new();

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<http::HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    if cors_config.allowed_headers.contains(&"*".to_string()) {
        cors = cors.allow_headers(Any);
    }

    cors.max_age(std::time::Duration::from_secs(
        cors_config.max_age_seconds,
    ))
}
