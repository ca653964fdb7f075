use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/tutors/:id/times", get(handlers::tutors::get_times))
        .route(
            "/api/tutors/:id/availability",
            get(handlers::tutors::get_availability).put(handlers::tutors::put_availability),
        )
        .route("/api/matching", post(handlers::tutors::match_tutors))
}
