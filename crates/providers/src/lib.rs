//! HTTP clients for the hosted services behind the booking flow.
//!
//! Each client implements one of the port traits from `tutorbook-core` and
//! maps transport and status failures onto [`ProviderError`].
//!
//! [`ProviderError`]: tutorbook_core::errors::ProviderError

pub mod auth;
pub mod chat;
pub mod config;
pub mod http;
pub mod scheduling;

pub use auth::HttpSessionVerifier;
pub use chat::HttpChatClient;
pub use config::ProviderConfig;
pub use scheduling::HttpSchedulingClient;
