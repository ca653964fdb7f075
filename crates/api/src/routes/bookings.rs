use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/bookings",
            get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking),
        )
        .route("/api/bookings/:id/cancel", post(handlers::bookings::cancel_booking))
        .route(
            "/api/bookings/:id/reschedule",
            post(handlers::bookings::reschedule_booking),
        )
        .route("/api/tutor/bookings", get(handlers::bookings::list_tutor_bookings))
}
