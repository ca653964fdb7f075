use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create bookings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            scheduling_id VARCHAR(255) NOT NULL UNIQUE,
            user_id VARCHAR(255) NOT NULL,
            tutor_id VARCHAR(255) NOT NULL,
            tutor_name VARCHAR(255) NOT NULL,
            subject VARCHAR(255) NOT NULL,
            package_id VARCHAR(64) NOT NULL,
            date DATE NOT NULL,
            time VARCHAR(5) NOT NULL,
            location VARCHAR(16) NOT NULL,
            contact_name VARCHAR(255) NOT NULL,
            contact_email VARCHAR(255) NOT NULL,
            contact_phone VARCHAR(64) NULL,
            notes TEXT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'scheduled',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_status CHECK (status IN ('scheduled', 'completed', 'cancelled')),
            CONSTRAINT valid_location CHECK (location IN ('online', 'in_person'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS bookings_user_id_idx ON bookings (user_id);")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS bookings_tutor_id_idx ON bookings (tutor_id);")
        .execute(pool)
        .await?;

    // Create tutors table holding each tutor's weekly table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tutors (
            name VARCHAR(255) PRIMARY KEY,
            availability JSONB NOT NULL,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized");
    Ok(())
}
