use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use eyre::{Result, WrapErr};

use crate::{
    models::{
        booking::{Booking, BookingId, BookingStatus},
        slot::{SlotTime, WeeklyAvailability},
    },
    ports::{AvailabilityRepository, BookingRepository, LocalCache},
};

fn user_key(user_id: &str) -> String {
    format!("bookings:{}", user_id)
}

fn tutor_key(tutor_id: &str) -> String {
    format!("tutor-bookings:{}", tutor_id)
}

fn availability_key(tutor_id: &str) -> String {
    format!("availability:{}", tutor_id)
}

/// Booking lists serialized under one cache key per user, plus a copy per
/// tutor for the tutor dashboard. Every write replaces a whole list.
#[derive(Clone)]
pub struct CachedBookingRepository {
    cache: Arc<dyn LocalCache>,
}

impl CachedBookingRepository {
    pub fn new(cache: Arc<dyn LocalCache>) -> Self {
        Self { cache }
    }

    async fn read_list(&self, key: &str) -> Result<Vec<Booking>> {
        match self.cache.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .wrap_err_with(|| format!("Corrupt booking list under {}", key)),
            None => Ok(Vec::new()),
        }
    }

    async fn write_list(&self, key: &str, bookings: &[Booking]) -> Result<()> {
        let raw = serde_json::to_string(bookings)?;
        self.cache.set(key, raw).await
    }

    async fn upsert_into(&self, key: &str, booking: &Booking) -> Result<()> {
        let mut list = self.read_list(key).await?;
        match list.iter_mut().find(|b| b.id == booking.id) {
            Some(existing) => *existing = booking.clone(),
            None => list.push(booking.clone()),
        }
        self.write_list(key, &list).await
    }

    /// Applies `change` to the owner's copy and the tutor's copy.
    async fn modify<F>(&self, owner: &str, id: &BookingId, change: F) -> Result<bool>
    where
        F: Fn(&mut Booking) + Send + Sync,
    {
        let key = user_key(owner);
        let mut list = self.read_list(&key).await?;
        let Some(booking) = list.iter_mut().find(|b| &b.id == id) else {
            return Ok(false);
        };
        change(booking);
        booking.updated_at = Utc::now();
        let updated = booking.clone();
        self.write_list(&key, &list).await?;
        self.upsert_into(&tutor_key(&updated.tutor_id), &updated).await?;
        Ok(true)
    }
}

#[async_trait]
impl BookingRepository for CachedBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<()> {
        self.upsert_into(&user_key(&booking.user_id), booking).await?;
        self.upsert_into(&tutor_key(&booking.tutor_id), booking).await
    }

    async fn find(&self, owner: &str, id: &BookingId) -> Result<Option<Booking>> {
        let list = self.read_list(&user_key(owner)).await?;
        Ok(list.into_iter().find(|b| &b.id == id))
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        self.read_list(&user_key(user_id)).await
    }

    async fn list_for_tutor(&self, tutor_id: &str) -> Result<Vec<Booking>> {
        self.read_list(&tutor_key(tutor_id)).await
    }

    async fn count_for_user(&self, user_id: &str) -> Result<usize> {
        Ok(self.read_list(&user_key(user_id)).await?.len())
    }

    async fn update_status(
        &self,
        owner: &str,
        id: &BookingId,
        status: BookingStatus,
    ) -> Result<bool> {
        self.modify(owner, id, |b| b.status = status).await
    }

    async fn update_schedule(
        &self,
        owner: &str,
        id: &BookingId,
        date: NaiveDate,
        time: SlotTime,
    ) -> Result<bool> {
        self.modify(owner, id, |b| {
            b.date = date;
            b.time = time;
            b.status = BookingStatus::Scheduled;
        })
        .await
    }
}

#[derive(Clone)]
pub struct CachedAvailabilityRepository {
    cache: Arc<dyn LocalCache>,
}

impl CachedAvailabilityRepository {
    pub fn new(cache: Arc<dyn LocalCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl AvailabilityRepository for CachedAvailabilityRepository {
    async fn load(&self, tutor_id: &str) -> Result<Option<WeeklyAvailability>> {
        let key = availability_key(tutor_id);
        match self.cache.get(&key).await? {
            Some(raw) => Ok(Some(
                serde_json::from_str(&raw)
                    .wrap_err_with(|| format!("Corrupt availability under {}", key))?,
            )),
            None => Ok(None),
        }
    }

    async fn save(&self, tutor_id: &str, availability: &WeeklyAvailability) -> Result<()> {
        let raw = serde_json::to_string(availability)?;
        self.cache.set(&availability_key(tutor_id), raw).await
    }
}
