//! Database migrations.
//!
//! The migrations live in `crates/admin/migrations/` and are embedded into the
//! admin crate; both servers share the one schema.

use bloom_bouquet_admin::db::MIGRATOR;

/// Apply every pending migration.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(&pool)
        .await?;
    tracing::info!(applied, available = MIGRATOR.iter().count(), "Migrations complete");
    Ok(())
}
