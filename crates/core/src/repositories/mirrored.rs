//! Prefer remote, mirror to local, fall back to local.
//!
//! Writes go to both tiers independently. A tier that fails produces a
//! [`SyncWarning`]; the write only fails when neither tier took it. Reads are
//! answered by the remote tier whenever it responds, even with nothing, and
//! by the local tier only when the remote call itself fails.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use tracing::debug;

use crate::{
    models::{
        booking::{Booking, BookingId, BookingSource, BookingStatus, LoadedBookings},
        slot::{SlotTime, WeeklyAvailability},
    },
    ports::{AvailabilityRepository, BookingRepository},
    sync::{SyncTier, SyncWarning, WarningSink},
};

/// Combines the outcome of a write that was sent to both tiers.
fn settle<T>(
    warnings: &WarningSink,
    operation: &str,
    subject: &str,
    remote: Result<T>,
    local: Result<T>,
) -> Result<(Option<T>, Option<T>)> {
    match (remote, local) {
        (Ok(r), Ok(l)) => Ok((Some(r), Some(l))),
        (Ok(r), Err(e)) => {
            warnings.report(SyncWarning::new(SyncTier::LocalCache, operation, subject, e));
            Ok((Some(r), None))
        }
        (Err(e), Ok(l)) => {
            warnings.report(SyncWarning::new(SyncTier::Store, operation, subject, &e));
            Ok((None, Some(l)))
        }
        (Err(remote), Err(local)) => {
            warnings.report(SyncWarning::new(SyncTier::LocalCache, operation, subject, local));
            warnings.report(SyncWarning::new(SyncTier::Store, operation, subject, &remote));
            Err(remote)
        }
    }
}

pub struct MirroredBookingRepository {
    remote: Arc<dyn BookingRepository>,
    local: Arc<dyn BookingRepository>,
    warnings: WarningSink,
}

impl MirroredBookingRepository {
    pub fn new(
        remote: Arc<dyn BookingRepository>,
        local: Arc<dyn BookingRepository>,
        warnings: WarningSink,
    ) -> Self {
        Self {
            remote,
            local,
            warnings,
        }
    }

    /// Bookings owned by `user_id`, tagged with the tier that answered.
    pub async fn load_for_user(&self, user_id: &str) -> Result<LoadedBookings> {
        match self.remote.list_for_user(user_id).await {
            Ok(bookings) => Ok(LoadedBookings {
                bookings,
                source: BookingSource::Store,
            }),
            Err(e) => {
                debug!("Store unavailable for user {}, reading cache: {}", user_id, e);
                Ok(LoadedBookings {
                    bookings: self.local.list_for_user(user_id).await?,
                    source: BookingSource::LocalCache,
                })
            }
        }
    }

    pub async fn load_for_tutor(&self, tutor_id: &str) -> Result<LoadedBookings> {
        match self.remote.list_for_tutor(tutor_id).await {
            Ok(bookings) => Ok(LoadedBookings {
                bookings,
                source: BookingSource::Store,
            }),
            Err(e) => {
                debug!("Store unavailable for tutor {}, reading cache: {}", tutor_id, e);
                Ok(LoadedBookings {
                    bookings: self.local.list_for_tutor(tutor_id).await?,
                    source: BookingSource::LocalCache,
                })
            }
        }
    }
}

#[async_trait]
impl BookingRepository for MirroredBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<()> {
        let remote = self.remote.insert(booking).await;
        let local = self.local.insert(booking).await;
        settle(&self.warnings, "insert", &booking.id.to_string(), remote, local)?;
        Ok(())
    }

    async fn find(&self, owner: &str, id: &BookingId) -> Result<Option<Booking>> {
        match self.remote.find(owner, id).await {
            Ok(Some(booking)) => Ok(Some(booking)),
            // A degraded create may have reached only the cache.
            Ok(None) => self.local.find(owner, id).await,
            Err(e) => {
                debug!("Store unavailable looking up {}, reading cache: {}", id, e);
                self.local.find(owner, id).await
            }
        }
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        Ok(self.load_for_user(user_id).await?.bookings)
    }

    async fn list_for_tutor(&self, tutor_id: &str) -> Result<Vec<Booking>> {
        Ok(self.load_for_tutor(tutor_id).await?.bookings)
    }

    /// Remote tier only: the cache is under the user's control and clearing it
    /// must not change the answer.
    async fn count_for_user(&self, user_id: &str) -> Result<usize> {
        self.remote.count_for_user(user_id).await
    }

    async fn update_status(
        &self,
        owner: &str,
        id: &BookingId,
        status: BookingStatus,
    ) -> Result<bool> {
        let remote = self.remote.update_status(owner, id, status).await;
        let local = self.local.update_status(owner, id, status).await;
        let (remote, local) = settle(&self.warnings, "update_status", &id.to_string(), remote, local)?;
        Ok(remote.unwrap_or(false) || local.unwrap_or(false))
    }

    async fn update_schedule(
        &self,
        owner: &str,
        id: &BookingId,
        date: NaiveDate,
        time: SlotTime,
    ) -> Result<bool> {
        let remote = self.remote.update_schedule(owner, id, date, time).await;
        let local = self.local.update_schedule(owner, id, date, time).await;
        let (remote, local) =
            settle(&self.warnings, "update_schedule", &id.to_string(), remote, local)?;
        Ok(remote.unwrap_or(false) || local.unwrap_or(false))
    }
}

pub struct MirroredAvailabilityRepository {
    remote: Arc<dyn AvailabilityRepository>,
    local: Arc<dyn AvailabilityRepository>,
    warnings: WarningSink,
}

impl MirroredAvailabilityRepository {
    pub fn new(
        remote: Arc<dyn AvailabilityRepository>,
        local: Arc<dyn AvailabilityRepository>,
        warnings: WarningSink,
    ) -> Self {
        Self {
            remote,
            local,
            warnings,
        }
    }
}

#[async_trait]
impl AvailabilityRepository for MirroredAvailabilityRepository {
    async fn load(&self, tutor_id: &str) -> Result<Option<WeeklyAvailability>> {
        match self.remote.load(tutor_id).await {
            Ok(table) => Ok(table),
            Err(e) => {
                debug!("Store unavailable for availability of {}, reading cache: {}", tutor_id, e);
                self.local.load(tutor_id).await
            }
        }
    }

    async fn save(&self, tutor_id: &str, availability: &WeeklyAvailability) -> Result<()> {
        let remote = self.remote.save(tutor_id, availability).await;
        let local = self.local.save(tutor_id, availability).await;
        settle(&self.warnings, "save_availability", tutor_id, remote, local)?;
        Ok(())
    }
}
