use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/packages", get(handlers::catalog::list_packages))
        .route("/api/tutors", get(handlers::catalog::list_tutors))
}
