use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use tutorbook_db::schema::initialize_database;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").wrap_err("DATABASE_URL environment variable must be set")?;

    println!("Connecting to database...");
    let db_pool = tutorbook_db::create_pool(&database_url).await?;

    println!("Creating bookings and tutors tables...");
    initialize_database(&db_pool).await?;
    println!("Database schema initialized successfully.");

    Ok(())
}
