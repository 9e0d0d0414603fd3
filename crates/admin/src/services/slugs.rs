//! Slug backfill for rows created before slugs were required.

use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use bloom_bouquet_core::Slug;

use crate::db::RepositoryError;
use crate::db::slugs::{self, SlugTable};

/// Result of backfilling one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub missing: usize,
    pub assigned: usize,
}

/// Give every row of `table` with a missing or blank slug a unique one.
///
/// Runs in one transaction so each new slug sees the ones assigned before it.
///
/// # Errors
///
/// Returns `RepositoryError` if any query fails; nothing is committed then.
#[instrument(skip(pool))]
pub async fn backfill(pool: &PgPool, table: SlugTable) -> Result<BackfillReport, RepositoryError> {
    let mut tx = pool.begin().await?;
    let rows = slugs::missing(&mut *tx, table).await?;

    let mut report = BackfillReport {
        missing: rows.len(),
        assigned: 0,
    };

    for (id, name) in rows {
        let base = Slug::from_name_or(&name, table.fallback());
        let slug = slugs::allocate(&mut *tx, table, &base, Some(id)).await?;
        slugs::assign(&mut *tx, table, id, &slug).await?;
        tracing::debug!(id, slug = %slug.as_str(), "Assigned slug");
        report.assigned += 1;
    }

    tx.commit().await?;
    tracing::info!(missing = report.missing, assigned = report.assigned, "Slug backfill finished");
    Ok(report)
}
