//! Slug backfill.

use bloom_bouquet_admin::db::slugs::SlugTable;
use bloom_bouquet_admin::services::slugs;

/// Backfill each table in order, stopping at the first failure.
///
/// # Errors
///
/// Returns an error if the database fails; the failing table is rolled back.
pub async fn backfill(tables: &[SlugTable]) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    for &table in tables {
        let report = slugs::backfill(&pool, table).await?;
        tracing::info!(
            table = ?table,
            missing = report.missing,
            assigned = report.assigned,
            "Slugs backfilled"
        );
    }
    Ok(())
}
