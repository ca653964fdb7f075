/// Error to HTTP response mapping
pub mod error_handling;
/// Session extractors backed by the auth provider
pub mod session;
