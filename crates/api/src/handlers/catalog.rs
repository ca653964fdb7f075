use axum::{Json, extract::State};
use std::sync::Arc;
use tutorbook_core::{
    catalog,
    models::{package::Package, tutor::Tutor},
};

use crate::ApiState;

pub async fn list_packages() -> Json<Vec<Package>> {
    Json(catalog::packages())
}

#[axum::debug_handler]
pub async fn list_tutors(State(state): State<Arc<ApiState>>) -> Json<Vec<Tutor>> {
    Json(state.directory.all().await)
}
