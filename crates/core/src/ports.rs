//! Contracts of the external collaborators.
//!
//! The scheduling provider, the structured store, the local cache, the chat
//! provider and the auth provider are all consumed through these traits and
//! injected into the components that need them.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::{
    errors::ProviderError,
    models::{
        booking::{Booking, BookingId, BookingStatus},
        chat::{ChannelKey, ChatMessage},
        session::SessionUser,
        slot::{SlotTime, WeeklyAvailability},
    },
};

/// Durable booking records, keyed by booking id and owned by a user.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<()>;

    async fn find(&self, owner: &str, id: &BookingId) -> Result<Option<Booking>>;

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>>;

    async fn list_for_tutor(&self, tutor_id: &str) -> Result<Vec<Booking>>;

    /// Number of bookings of any status owned by `user_id`.
    async fn count_for_user(&self, user_id: &str) -> Result<usize>;

    /// Returns false when no matching row exists.
    async fn update_status(&self, owner: &str, id: &BookingId, status: BookingStatus)
    -> Result<bool>;

    /// Moves the booking to a new slot and resets it to scheduled.
    async fn update_schedule(
        &self,
        owner: &str,
        id: &BookingId,
        date: NaiveDate,
        time: SlotTime,
    ) -> Result<bool>;
}

/// Per-tutor weekly tables, always overwritten wholesale.
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn load(&self, tutor_id: &str) -> Result<Option<WeeklyAvailability>>;

    async fn save(&self, tutor_id: &str, availability: &WeeklyAvailability) -> Result<()>;
}

/// String-keyed cache of serialized values. Writes replace the whole value.
#[async_trait]
pub trait LocalCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub event_type_id: Option<i64>,
    pub start: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub notes: String,
    pub time_zone: String,
    pub locale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledBooking {
    pub id: String,
    pub start: DateTime<Utc>,
}

#[async_trait]
pub trait SchedulingProvider: Send + Sync {
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

#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn connect_user(&self, user_id: &str) -> std::result::Result<(), ProviderError>;

    async fn disconnect_user(&self, user_id: &str) -> std::result::Result<(), ProviderError>;

    /// Creates the channel if it does not exist yet.
    async fn ensure_channel(
        &self,
        key: &ChannelKey,
        members: &[String],
    ) -> std::result::Result<(), ProviderError>;

    async fn send_message(
        &self,
        key: &ChannelKey,
        sender_id: &str,
        text: &str,
    ) -> std::result::Result<ChatMessage, ProviderError>;

    /// Messages strictly newer than `since`, oldest first.
    async fn fetch_messages(
        &self,
        key: &ChannelKey,
        since: Option<DateTime<Utc>>,
    ) -> std::result::Result<Vec<ChatMessage>, ProviderError>;
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// `Ok(None)` for a token the provider does not recognise.
    async fn verify(&self, token: &str) -> std::result::Result<Option<SessionUser>, ProviderError>;
}
