#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use axum_test::TestServer;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use fake::{Fake, faker::internet::en::SafeEmail, faker::name::en::Name};
use mockall::mock;
use tutorbook_api::{ApiState, build_router};
use tutorbook_core::{
    cache::MemoryCache,
    catalog,
    directory::TutorDirectory,
    errors::ProviderError,
    models::{
        booking::{ContactDetails, CreateBookingRequest, Location},
        chat::{ChannelKey, ChatMessage},
        session::{Role, SessionUser},
    },
    ports::{
        AvailabilityRepository, BookingRepository, ChatProvider, ScheduleRequest,
        ScheduledBooking, SchedulingProvider, SessionVerifier,
    },
    reconciler::{BookingReconciler, ReconcilerSettings},
    repositories::{
        CachedAvailabilityRepository, CachedBookingRepository, MirroredAvailabilityRepository,
        MirroredBookingRepository,
    },
    sync::WarningSink,
};

pub const PARENT_TOKEN: &str = "parent-token";
pub const TUTOR_TOKEN: &str = "tutor-token";

mock! {
    pub Scheduler {}

    #[async_trait]
    impl SchedulingProvider for Scheduler {
        async fn create_booking(
            &self,
            request: &ScheduleRequest,
        ) -> std::result::Result<ScheduledBooking, ProviderError>;

        async fn cancel_booking(
            &self,
            booking_id: &str,
            reason: &str,
        ) -> std::result::Result<(), ProviderError>;

        async fn reschedule_booking(
            &self,
            booking_id: &str,
            start: DateTime<Utc>,
            time_zone: &str,
        ) -> std::result::Result<ScheduledBooking, ProviderError>;
    }
}

/// Knows two fixed tokens: a parent and Anna Schmidt's tutor account.
pub struct FixedSessions;

#[async_trait]
impl SessionVerifier for FixedSessions {
    async fn verify(&self, token: &str) -> Result<Option<SessionUser>, ProviderError> {
        Ok(match token {
            PARENT_TOKEN => Some(SessionUser {
                id: "parent-1".to_string(),
                email: "eva@example.com".to_string(),
                role: Role::Parent,
                tutor_id: None,
            }),
            TUTOR_TOKEN => Some(SessionUser {
                id: "tutor-user-1".to_string(),
                email: "anna@example.com".to_string(),
                role: Role::Tutor,
                tutor_id: Some("anna-schmidt".to_string()),
            }),
            _ => None,
        })
    }
}

/// Chat provider keeping messages in memory.
#[derive(Default)]
pub struct MemoryChat {
    pub connected: Mutex<Vec<String>>,
    pub messages: Mutex<Vec<ChatMessage>>,
}

#[async_trait]
impl ChatProvider for MemoryChat {
    async fn connect_user(&self, user_id: &str) -> Result<(), ProviderError> {
        self.connected.lock().unwrap().push(user_id.to_string());
        Ok(())
    }

    async fn disconnect_user(&self, user_id: &str) -> Result<(), ProviderError> {
        self.connected.lock().unwrap().retain(|u| u != user_id);
        Ok(())
    }

    async fn ensure_channel(&self, _key: &ChannelKey, _members: &[String]) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn send_message(
        &self,
        key: &ChannelKey,
        sender_id: &str,
        text: &str,
    ) -> Result<ChatMessage, ProviderError> {
        let mut messages = self.messages.lock().unwrap();
        let message = ChatMessage {
            id: format!("m{}", messages.len() + 1),
            channel: key.clone(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        messages.push(message.clone());
        Ok(message)
    }

    async fn fetch_messages(
        &self,
        key: &ChannelKey,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ChatMessage>, ProviderError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.channel == key && since.is_none_or(|s| m.created_at > s))
            .cloned()
            .collect())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<dyn BookingRepository>,
    pub cache: Arc<CachedBookingRepository>,
    pub chat: Option<Arc<MemoryChat>>,
}

pub struct TestAppBuilder {
    scheduler: MockScheduler,
    store: Arc<dyn BookingRepository>,
    availability: Arc<dyn AvailabilityRepository>,
    chat: bool,
}

impl TestAppBuilder {
    pub fn new(scheduler: MockScheduler) -> Self {
        Self {
            scheduler,
            store: Arc::new(CachedBookingRepository::new(Arc::new(MemoryCache::new()))),
            availability: Arc::new(CachedAvailabilityRepository::new(Arc::new(MemoryCache::new()))),
            chat: true,
        }
    }

    pub fn store(mut self, store: Arc<dyn BookingRepository>) -> Self {
        self.store = store;
        self
    }

    pub fn availability(mut self, availability: Arc<dyn AvailabilityRepository>) -> Self {
        self.availability = availability;
        self
    }

    pub fn without_chat(mut self) -> Self {
        self.chat = false;
        self
    }

    pub fn build(self) -> TestApp {
        let sink = WarningSink::default();
        let cache = Arc::new(CachedBookingRepository::new(Arc::new(MemoryCache::new())));
        let bookings = Arc::new(MirroredBookingRepository::new(
            self.store.clone(),
            cache.clone(),
            sink.clone(),
        ));
        let availability = Arc::new(MirroredAvailabilityRepository::new(
            self.availability,
            Arc::new(CachedAvailabilityRepository::new(Arc::new(MemoryCache::new()))),
            sink.clone(),
        ));
        let directory = Arc::new(TutorDirectory::new(catalog::seed_tutors(), availability));
        let reconciler = Arc::new(BookingReconciler::new(
            Arc::new(self.scheduler),
            bookings,
            directory.clone(),
            ReconcilerSettings::default(),
            sink,
        ));
        let chat = self.chat.then(|| Arc::new(MemoryChat::default()));

        let state = Arc::new(ApiState {
            reconciler,
            directory,
            sessions: Arc::new(FixedSessions),
            chat: chat.clone().map(|c| c as Arc<dyn ChatProvider>),
        });

        TestApp {
            server: TestServer::new(build_router(state)).unwrap(),
            store: self.store,
            cache,
            chat,
        }
    }
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

/// First date at least two days out that falls on `weekday`.
pub fn upcoming(weekday: chrono::Weekday) -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(2);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    date
}

/// Anna Schmidt teaches Mondays at 14:00, 15:00 and 16:00.
pub fn monday_request(package_id: &str) -> CreateBookingRequest {
    CreateBookingRequest {
        tutor_id: "anna-schmidt".to_string(),
        package_id: package_id.to_string(),
        subject: "Mathematik".to_string(),
        date: upcoming(chrono::Weekday::Mon).to_string(),
        time: "14:00".to_string(),
        location: Location::Online,
        contact: ContactDetails {
            name: Name().fake(),
            email: SafeEmail().fake(),
            phone: None,
        },
        notes: Some("Bruchrechnung".to_string()),
    }
}

pub fn scheduled(id: &str) -> ScheduledBooking {
    ScheduledBooking {
        id: id.to_string(),
        start: Utc::now(),
    }
}
