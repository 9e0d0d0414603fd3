//! One-off runs of the unpaid-order sweeps the admin server runs on a timer.

use bloom_bouquet_admin::services::{SweepKind, run_sweep};

/// Run one sweep and report how many orders it cancelled.
///
/// # Errors
///
/// Returns an error if the due orders cannot be loaded, or if any single
/// order failed to expire.
pub async fn sweep(kind: SweepKind) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let report = run_sweep(&pool, kind).await?;

    tracing::info!(
        sweep = kind.name(),
        expired = report.expired,
        failed = report.failed,
        "Sweep complete"
    );

    if report.failed > 0 {
        return Err(format!("{} order(s) could not be expired", report.failed).into());
    }
    Ok(())
}
