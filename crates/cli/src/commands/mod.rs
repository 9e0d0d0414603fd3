//! Command implementations for `bb-cli`.

pub mod admin;
pub mod migrate;
pub mod orders;
pub mod seed;
pub mod slugs;

use sqlx::PgPool;

use bloom_bouquet_admin::config::get_database_url;
use bloom_bouquet_admin::db;

/// Connect using `ADMIN_DATABASE_URL`, falling back to `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let database_url = get_database_url("ADMIN_DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
