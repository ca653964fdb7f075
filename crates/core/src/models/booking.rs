use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slot::SlotTime;
use crate::errors::BookingError;

const LOCAL_ID_PREFIX: &str = "local-";

/// Identity of a booking, tagged with where it originates.
///
/// `Remote` ids were issued by the scheduling provider. `Local` ids were
/// synthesized when the provider could not host the booking; such bookings
/// exist only in the store and the cache mirror.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BookingId {
    Remote(String),
    Local(String),
}

impl BookingId {
    pub fn new_local() -> Self {
        BookingId::Local(Uuid::new_v4().to_string())
    }

    pub fn is_local(&self) -> bool {
        matches!(self, BookingId::Local(_))
    }

    /// Decodes the stored representation, where local ids carry a prefix.
    pub fn from_stored(raw: &str) -> Result<Self, BookingError> {
        let raw = raw.trim();
        match raw.strip_prefix(LOCAL_ID_PREFIX) {
            Some("") => Err(BookingError::Validation("Empty local booking id".to_string())),
            Some(local) => Ok(BookingId::Local(local.to_string())),
            None if raw.is_empty() => {
                Err(BookingError::Validation("Empty booking id".to_string()))
            }
            None => Ok(BookingId::Remote(raw.to_string())),
        }
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingId::Remote(id) => f.write_str(id),
            BookingId::Local(id) => write!(f, "{}{}", LOCAL_ID_PREFIX, id),
        }
    }
}

impl FromStr for BookingId {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingId::from_stored(s)
    }
}

impl From<BookingId> for String {
    fn from(id: BookingId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for BookingId {
    type Error = BookingError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        BookingId::from_stored(&raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(BookingStatus::Scheduled),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(BookingError::Validation(format!("Unknown booking status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Online,
    InPerson,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Online => "online",
            Location::InPerson => "in_person",
        }
    }
}

impl FromStr for Location {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Location::Online),
            "in_person" => Ok(Location::InPerson),
            other => Err(BookingError::Validation(format!("Unknown location: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: String,
    pub tutor_id: String,
    pub tutor_name: String,
    pub subject: String,
    pub package_id: String,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub location: Location,
    pub contact: ContactDetails,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_local_only(&self) -> bool {
        self.id.is_local()
    }

    /// Wall-clock start in the booking's own time zone.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time.as_naive())
    }

    /// Moves a scheduled booking whose start lies before `now` to completed.
    /// Returns true when the status changed.
    pub fn complete_if_past(&mut self, now: NaiveDateTime) -> bool {
        if self.status == BookingStatus::Scheduled && self.starts_at() < now {
            self.status = BookingStatus::Completed;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub tutor_id: String,
    pub package_id: String,
    pub subject: String,
    pub date: String,
    pub time: String,
    pub location: Location,
    pub contact: ContactDetails,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookingResponse {
    pub booking: Booking,
    pub local_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelBookingResponse {
    pub id: BookingId,
    pub status: BookingStatus,
    /// Whether the scheduling provider acknowledged the cancellation.
    /// Diagnostic only.
    pub remote_notified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleBookingRequest {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    Store,
    LocalCache,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedBookings {
    pub bookings: Vec<Booking>,
    pub source: BookingSource,
}
