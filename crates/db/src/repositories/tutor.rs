use async_trait::async_trait;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres, types::Json};
use tutorbook_core::{models::slot::WeeklyAvailability, ports::AvailabilityRepository};

use crate::models::DbTutorAvailability;

/// Tutors table of the structured store, one serialized table per tutor.
#[derive(Clone)]
pub struct PgAvailabilityRepository {
    pool: Pool<Postgres>,
}

impl PgAvailabilityRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityRepository for PgAvailabilityRepository {
    async fn load(&self, tutor_id: &str) -> Result<Option<WeeklyAvailability>> {
        let row = sqlx::query_as::<_, DbTutorAvailability>(
            r#"
            SELECT name, availability, updated_at
            FROM tutors
            WHERE name = $1
            "#,
        )
        .bind(tutor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.availability.0))
    }

    async fn save(&self, tutor_id: &str, availability: &WeeklyAvailability) -> Result<()> {
        tracing::debug!("Saving availability for tutor {}", tutor_id);

        sqlx::query(
            r#"
            INSERT INTO tutors (name, availability, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
            SET availability = EXCLUDED.availability, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(tutor_id)
        .bind(Json(availability))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
