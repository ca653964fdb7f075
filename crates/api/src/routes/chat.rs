use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/api/chat/:peer/messages",
        get(handlers::chat::list_messages).post(handlers::chat::send_message),
    )
}
