use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Policy error: {0}")]
    Policy(String),

    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type BookingResult<T> = Result<T, BookingError>;

/// Failure reported by one of the hosted providers (scheduling, chat, auth).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("provider misconfigured: {0}")]
    Misconfigured(String),
}

const NO_HOST_MARKERS: &[&str] = &[
    "no_available_users_found",
    "no available users",
    "no available host",
    "no eligible host",
    "no hosts available",
];

impl ProviderError {
    /// True when the scheduling provider refused because the event type has no
    /// host configured. Booking creation treats this as a degraded success.
    pub fn is_no_available_host(&self) -> bool {
        match self {
            ProviderError::Rejected { message, .. } => {
                let message = message.to_lowercase();
                NO_HOST_MARKERS.iter().any(|marker| message.contains(marker))
            }
            _ => false,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ProviderError::Rejected { message, .. } => message,
            ProviderError::Unreachable(message) | ProviderError::Misconfigured(message) => message,
        }
    }
}

impl From<ProviderError> for BookingError {
    fn from(err: ProviderError) -> Self {
        BookingError::RemoteService(err.message().to_string())
    }
}
