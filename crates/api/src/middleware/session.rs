//! Request extractors that resolve the caller's session.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, error};
use tutorbook_core::{
    errors::BookingError,
    models::session::{Role, SessionUser},
};

use crate::{ApiState, middleware::error_handling::AppError};

/// Any signed-in user, resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthSession(pub SessionUser);

/// A signed-in tutor together with the catalog id of their profile.
#[derive(Debug, Clone)]
pub struct TutorSession {
    pub user: SessionUser,
    pub tutor_id: String,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        match state.sessions.verify(token).await {
            Ok(Some(user)) => {
                debug!("Request by {} ({:?})", user.id, user.role);
                Ok(AuthSession(user))
            }
            Ok(None) => Err(AppError::Unauthorized(
                "Session is invalid or expired".to_string(),
            )),
            Err(e) => {
                error!("Session verification failed: {}", e);
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for TutorSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthSession(user) = AuthSession::from_request_parts(parts, state).await?;

        if user.role != Role::Tutor {
            return Err(BookingError::Policy("Only tutors can access this resource".to_string()).into());
        }
        let tutor_id = user.tutor_id.clone().ok_or_else(|| {
            BookingError::Policy("Tutor account is not linked to a tutor profile".to_string())
        })?;

        Ok(TutorSession { user, tutor_id })
    }
}
