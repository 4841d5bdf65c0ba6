// libs/scheduling-cell/src/router.rs
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::identity_middleware;

use crate::handlers;
use crate::state::AppState;

pub fn scheduling_routes(state: AppState) -> Router {
    // All scheduling operations require an authenticated caller identity
    let protected_routes = Router::new()
        .route("/slots", get(handlers::list_slots))
        .route(
            "/schedules",
            get(handlers::list_schedules).put(handlers::set_schedule),
        )
        .route("/", post(handlers::book_appointment))
        .route("/mine", get(handlers::my_appointments))
        .route("/doctors/{doctor_id}", get(handlers::doctor_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route(
            "/{appointment_id}/status",
            axum::routing::patch(handlers::update_appointment_status),
        )
        .layer(middleware::from_fn(identity_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
