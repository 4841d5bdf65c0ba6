use axum::{routing::get, Router};

use scheduling_cell::router::scheduling_routes;
use scheduling_cell::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Scheduling API is running!" }))
        .nest("/appointments", scheduling_routes(state))
}
