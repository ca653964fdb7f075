use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing::{info, warn};
use tutorbook_api::{ApiState, config::ApiConfig};
use tutorbook_core::{
    cache::{FileCache, MemoryCache},
    catalog,
    directory::TutorDirectory,
    ports::{ChatProvider, LocalCache},
    reconciler::{BookingReconciler, ReconcilerSettings},
    repositories::{
        CachedAvailabilityRepository, CachedBookingRepository, MirroredAvailabilityRepository,
        MirroredBookingRepository,
    },
    sync::WarningSink,
};
use tutorbook_db::{
    create_lazy_pool,
    repositories::{PgAvailabilityRepository, PgBookingRepository},
    schema::initialize_database,
};
use tutorbook_providers::{HttpChatClient, HttpSchedulingClient, HttpSessionVerifier};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    tutorbook_api::init_tracing(config.log_level)?;

    let state = build_state(&config).await?;

    // Start API server
    tutorbook_api::start_server(config, state).await?;

    Ok(())
}

async fn build_state(config: &ApiConfig) -> Result<Arc<ApiState>> {
    // The pool connects lazily so an unreachable store does not block startup
    let db_pool = create_lazy_pool(&config.database_url)?;
    if let Err(e) = initialize_database(&db_pool).await {
        warn!("Structured store unavailable at startup, serving from the local cache: {}", e);
    }

    let cache: Arc<dyn LocalCache> = match &config.cache_dir {
        Some(dir) => {
            info!("Using file cache in {}", dir.display());
            Arc::new(FileCache::open(dir).await?)
        }
        None => Arc::new(MemoryCache::new()),
    };

    let warnings = WarningSink::default();

    let bookings = Arc::new(MirroredBookingRepository::new(
        Arc::new(PgBookingRepository::new(db_pool.clone())),
        Arc::new(CachedBookingRepository::new(cache.clone())),
        warnings.clone(),
    ));
    let availability = Arc::new(MirroredAvailabilityRepository::new(
        Arc::new(PgAvailabilityRepository::new(db_pool)),
        Arc::new(CachedAvailabilityRepository::new(cache)),
        warnings.clone(),
    ));
    let directory = Arc::new(TutorDirectory::new(catalog::seed_tutors(), availability));

    let providers = &config.providers;
    let scheduling = &providers.scheduling;
    if scheduling.api_key.is_none() {
        warn!("SCHEDULING_API_KEY is not set, bookings will be refused by the scheduling client");
    }
    let scheduler = Arc::new(HttpSchedulingClient::new(scheduling, providers.timeout)?);
    let settings = ReconcilerSettings {
        event_type_id: scheduling.event_type_id,
        time_zone: scheduling.time_zone,
        locale: scheduling.locale.clone(),
    };
    let reconciler = Arc::new(BookingReconciler::new(
        scheduler,
        bookings,
        directory.clone(),
        settings,
        warnings,
    ));

    let sessions = Arc::new(HttpSessionVerifier::new(&providers.auth, providers.timeout)?);

    let chat = match &providers.chat {
        Some(chat) => Some(Arc::new(HttpChatClient::new(chat, providers.timeout)?) as Arc<dyn ChatProvider>),
        None => {
            info!("Chat provider not configured, chat routes are disabled");
            None
        }
    };

    Ok(Arc::new(ApiState {
        reconciler,
        directory,
        sessions,
        chat,
    }))
}
