use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use tutorbook_core::{
    models::{
        booking::{Booking, BookingId, BookingStatus},
        slot::SlotTime,
    },
    ports::BookingRepository,
};
use uuid::Uuid;

use crate::models::DbBooking;

const BOOKING_COLUMNS: &str = "id, scheduling_id, user_id, tutor_id, tutor_name, subject, \
    package_id, date, time, location, contact_name, contact_email, contact_phone, notes, \
    status, created_at, updated_at";

/// Re-inserting a booking updates its schedule, but only for the owner that
/// created the row; a colliding scheduling id of another user affects nothing.
pub const UPSERT_BOOKING: &str = r#"
    INSERT INTO bookings (id, scheduling_id, user_id, tutor_id, tutor_name, subject,
        package_id, date, time, location, contact_name, contact_email, contact_phone,
        notes, status, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
    ON CONFLICT (scheduling_id) DO UPDATE
    SET date = EXCLUDED.date, time = EXCLUDED.time, status = EXCLUDED.status,
        updated_at = EXCLUDED.updated_at
    WHERE bookings.user_id = EXCLUDED.user_id
"#;

/// Bookings table of the structured store.
#[derive(Clone)]
pub struct PgBookingRepository {
    pool: Pool<Postgres>,
}

impl PgBookingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Primary key of the row for `id`, looked up by scheduling id first and
    /// by primary key second. Local-only rows carry the same value in both.
    async fn resolve_row(&self, owner: &str, id: &BookingId) -> Result<Option<Uuid>> {
        let by_scheduling_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM bookings WHERE scheduling_id = $1 AND user_id = $2",
        )
        .bind(id.to_string())
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        if by_scheduling_id.is_some() {
            return Ok(by_scheduling_id);
        }

        let raw = match id {
            BookingId::Local(raw) | BookingId::Remote(raw) => raw,
        };
        let Ok(primary_key) = Uuid::parse_str(raw) else {
            return Ok(None);
        };
        tracing::debug!("No row with scheduling id {}, retrying by primary key", id);
        let by_primary_key =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM bookings WHERE id = $1 AND user_id = $2")
                .bind(primary_key)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;
        Ok(by_primary_key)
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<()> {
        let row = DbBooking::from_booking(booking);
        tracing::debug!("Inserting booking {} for user {}", row.scheduling_id, row.user_id);

        let result = sqlx::query(UPSERT_BOOKING)
            .bind(row.id)
            .bind(&row.scheduling_id)
            .bind(&row.user_id)
            .bind(&row.tutor_id)
            .bind(&row.tutor_name)
            .bind(&row.subject)
            .bind(&row.package_id)
            .bind(row.date)
            .bind(&row.time)
            .bind(&row.location)
            .bind(&row.contact_name)
            .bind(&row.contact_email)
            .bind(&row.contact_phone)
            .bind(&row.notes)
            .bind(&row.status)
            .bind(row.created_at)
            .bind(row.updated_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            eyre::bail!(
                "Scheduling id {} already belongs to another user",
                row.scheduling_id
            );
        }
        Ok(())
    }

    async fn find(&self, owner: &str, id: &BookingId) -> Result<Option<Booking>> {
        let query = format!(
            "SELECT {} FROM bookings WHERE scheduling_id = $1 AND user_id = $2",
            BOOKING_COLUMNS
        );
        let row = sqlx::query_as::<_, DbBooking>(&query)
            .bind(id.to_string())
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        row.map(DbBooking::into_booking).transpose()
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        let query = format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY date ASC, time ASC",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query_as::<_, DbBooking>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(DbBooking::into_booking).collect()
    }

    async fn list_for_tutor(&self, tutor_id: &str) -> Result<Vec<Booking>> {
        let query = format!(
            "SELECT {} FROM bookings WHERE tutor_id = $1 ORDER BY date ASC, time ASC",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query_as::<_, DbBooking>(&query)
            .bind(tutor_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(DbBooking::into_booking).collect()
    }

    async fn count_for_user(&self, user_id: &str) -> Result<usize> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(usize::try_from(count)?)
    }

    async fn update_status(
        &self,
        owner: &str,
        id: &BookingId,
        status: BookingStatus,
    ) -> Result<bool> {
        let Some(primary_key) = self.resolve_row(owner, id).await? else {
            return Ok(false);
        };

        sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(primary_key)
        .bind(status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    async fn update_schedule(
        &self,
        owner: &str,
        id: &BookingId,
        date: NaiveDate,
        time: SlotTime,
    ) -> Result<bool> {
        let Some(primary_key) = self.resolve_row(owner, id).await? else {
            return Ok(false);
        };

        sqlx::query(
            r#"
            UPDATE bookings
            SET date = $2, time = $3, status = 'scheduled', updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(primary_key)
        .bind(date)
        .bind(time.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(true)
    }
}
