use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, put}, Router};
use tower_http::cors::CorsLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route(
            "/insurers",
            get(handlers::get_insurers)
                .put(handlers::replace_insurers)
                .post(handlers::replace_insurers),
        )
        .route("/insurers/invoice", put(handlers::update_invoice))
        .route("/insurers/status", get(handlers::get_statuses))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
