//! Database migration command.
//!
//! Applies `crates/resolver/migrations/` to the configured database.

use order_resolver::db;
use tracing::info;

use super::database_url;

/// Run resolver database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or a
/// migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = database_url()?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running migrations...");
    sqlx::migrate!("../resolver/migrations").run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
