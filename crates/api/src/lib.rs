//! # Tutorbook API
//!
//! HTTP surface of the tutoring brokerage: tutor matching and bookable times,
//! the booking lifecycle of parents and tutors, weekly availability editing
//! and per-pair chat.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Adapt requests onto the core services
//! - **Middleware**: Session extraction and error mapping
//! - **Config**: Environment configuration
//!
//! The services themselves live in `tutorbook-core`; this crate only wires
//! them to axum.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Session extractors and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, Method, header},
};
use eyre::Result;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;
use tutorbook_core::{
    directory::TutorDirectory,
    ports::{ChatProvider, SessionVerifier},
    reconciler::BookingReconciler,
};

/// Shared application state that is accessible to all request handlers
///
/// Every dependency is constructed by the binary and injected here, so tests
/// can swap any provider or repository for an in-memory one.
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(ApiState {
///     reconciler: Arc::new(reconciler),
///     directory,
///     sessions: Arc::new(HttpSessionVerifier::new(client, config.providers.auth.clone())),
///     chat: None,
/// });
/// let app = build_router(state);
/// ```
pub struct ApiState {
    /// Booking lifecycle across the scheduling provider, store and cache
    pub reconciler: Arc<BookingReconciler>,
    /// Tutor profiles merged with their stored weekly availability
    pub directory: Arc<TutorDirectory>,
    /// Resolves bearer tokens to signed-in users
    pub sessions: Arc<dyn SessionVerifier>,
    /// `None` when no chat provider is configured.
    pub chat: Option<Arc<dyn ChatProvider>>,
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Fails when a global subscriber has already been set.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the router with every API route bound to `state`
///
/// The transport layers (CORS, tracing, request timeout) are added by
/// [`start_server`], so tests can drive this router directly.
///
/// # Arguments
///
/// * `state` - Shared services used by the handlers
///
/// # Returns
///
/// * `Router` - Routes for health, catalog, tutors, bookings and chat
///
/// # Example
///
/// ```ignore
/// let server = axum_test::TestServer::new(build_router(state))?;
/// let health = server.get("/health").await;
/// ```
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::catalog::routes())
        .merge(routes::tutors::routes())
        .merge(routes::bookings::routes())
        .merge(routes::chat::routes())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(origins)
        .allow_credentials(true)
}

/// Starts the API server with the provided configuration and state
///
/// Wraps [`build_router`] in CORS (when origins are configured), HTTP
/// tracing and the per-request timeout, binds the configured address and
/// serves until the listener fails.
///
/// # Arguments
///
/// * `config` - API configuration including host, port, CORS and timeout
/// * `state` - Shared services handed to every handler
///
/// # Returns
///
/// * `Result<()>` - Error when binding or serving fails
///
/// # Example
///
/// ```ignore
/// let config = ApiConfig::from_env()?;
/// init_tracing(config.log_level)?;
/// let state = build_state(&config).await?;
/// start_server(config, state).await?;
/// ```
pub async fn start_server(config: config::ApiConfig, state: Arc<ApiState>) -> Result<()> {
    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(HandleErrorLayer::new(
                middleware::error_handling::handle_middleware_error,
            ))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
