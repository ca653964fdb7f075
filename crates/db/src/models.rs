use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorbook_core::models::{
    booking::{Booking, BookingId, ContactDetails},
    slot::WeeklyAvailability,
};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub scheduling_id: String,
    pub user_id: String,
    pub tutor_id: String,
    pub tutor_name: String,
    pub subject: String,
    pub package_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbBooking {
    /// Row for a new booking. Local-only bookings reuse their own id as
    /// primary key so either column finds them.
    pub fn from_booking(booking: &Booking) -> Self {
        let id = match &booking.id {
            BookingId::Local(local) => Uuid::parse_str(local).unwrap_or_else(|_| Uuid::new_v4()),
            BookingId::Remote(_) => Uuid::new_v4(),
        };
        Self {
            id,
            scheduling_id: booking.id.to_string(),
            user_id: booking.user_id.clone(),
            tutor_id: booking.tutor_id.clone(),
            tutor_name: booking.tutor_name.clone(),
            subject: booking.subject.clone(),
            package_id: booking.package_id.clone(),
            date: booking.date,
            time: booking.time.to_string(),
            location: booking.location.as_str().to_string(),
            contact_name: booking.contact.name.clone(),
            contact_email: booking.contact.email.clone(),
            contact_phone: booking.contact.phone.clone(),
            notes: booking.notes.clone(),
            status: booking.status.as_str().to_string(),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }

    pub fn into_booking(self) -> Result<Booking> {
        Ok(Booking {
            id: BookingId::from_stored(&self.scheduling_id)
                .wrap_err_with(|| format!("Bad scheduling id on row {}", self.id))?,
            user_id: self.user_id,
            tutor_id: self.tutor_id,
            tutor_name: self.tutor_name,
            subject: self.subject,
            package_id: self.package_id,
            date: self.date,
            time: self
                .time
                .parse()
                .wrap_err_with(|| format!("Bad time on row {}", self.id))?,
            location: self
                .location
                .parse()
                .wrap_err_with(|| format!("Bad location on row {}", self.id))?,
            contact: ContactDetails {
                name: self.contact_name,
                email: self.contact_email,
                phone: self.contact_phone,
            },
            notes: self.notes,
            status: self
                .status
                .parse()
                .wrap_err_with(|| format!("Bad status on row {}", self.id))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbTutorAvailability {
    pub name: String,
    pub availability: sqlx::types::Json<WeeklyAvailability>,
    pub updated_at: DateTime<Utc>,
}
