//! # Error Handling Middleware
//!
//! Maps domain errors onto HTTP status codes and a JSON body of the form
//! `{ "error": "<message>" }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower::BoxError;
use tracing::error;
use tutorbook_core::errors::{BookingError, ProviderError};

/// Application error returned by every handler
///
/// Wraps [`BookingError`] and the session failures, and implements
/// `IntoResponse` to turn them into a status code with a JSON body.
/// Provider errors and storage reports convert through `?`.
///
/// # Example
///
/// ```ignore
/// async fn handler(
///     State(state): State<Arc<ApiState>>,
///     AuthSession(user): AuthSession,
/// ) -> Result<Json<LoadedBookings>, AppError> {
///     let loaded = state.reconciler.load_bookings_for_user(&user.id).await?;
///     Ok(Json(loaded))
/// }
/// ```
#[derive(Debug)]
pub enum AppError {
    /// A failure of one of the booking operations.
    Domain(BookingError),
    /// No session, or the auth provider did not recognise it.
    Unauthorized(String),
    /// The feature depends on a provider that is not configured.
    Unavailable(String),
}

impl AppError {
    /// HTTP status for this error
    ///
    /// | error | status |
    /// |---|---|
    /// | `Validation` | 400 |
    /// | `Unauthorized` | 401 |
    /// | `Policy` | 403 |
    /// | `NotFound` | 404 |
    /// | `RemoteService` | 502 |
    /// | `Unavailable` | 503 |
    /// | `Storage`, `Internal` | 500 |
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Domain(err) => match err {
                BookingError::Validation(_) => StatusCode::BAD_REQUEST,
                BookingError::Policy(_) => StatusCode::FORBIDDEN,
                BookingError::NotFound(_) => StatusCode::NOT_FOUND,
                BookingError::RemoteService(_) => StatusCode::BAD_GATEWAY,
                BookingError::Storage(_) | BookingError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Converts application errors to HTTP responses
///
/// Server errors are logged before the message is returned to the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            AppError::Domain(err) => {
                if status.is_server_error() {
                    error!("Request failed: {}", err);
                }
                err.to_string()
            }
            AppError::Unauthorized(message) | AppError::Unavailable(message) => message,
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Domain(err)
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Domain(err.into())
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError::Domain(BookingError::Storage(err))
    }
}

/// Maps a BookingError to an HTTP response
///
/// # Arguments
///
/// * `err` - The domain error to convert
///
/// # Returns
///
/// * `Response` - Status code from [`AppError::status`] with `{ "error": ... }`
pub fn map_error(err: BookingError) -> Response {
    AppError::Domain(err).into_response()
}

/// Turns failures of the tower middleware stack into responses.
///
/// An elapsed request timeout becomes `408 Request Timeout`; anything else is
/// logged and reported as `500`.
pub async fn handle_middleware_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out" })),
        )
            .into_response()
    } else {
        error!("Unhandled middleware error: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error" })),
        )
            .into_response()
    }
}
