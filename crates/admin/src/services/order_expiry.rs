//! Expiry sweeps for unpaid orders.
//!
//! Two sweeps share one loop: overdue payment deadlines and expired QRIS
//! codes. Each due order is expired in its own transaction so one bad row
//! never blocks the rest.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::db::RepositoryError;
use crate::db::orders::{ExpiryKind, OrderRepository};

/// Orders handled per sweep run; the rest wait for the next tick.
pub const SWEEP_BATCH: i64 = 500;

/// Which sweep to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepKind {
    /// Cancel waiting orders past their payment deadline.
    CheckExpired,
    /// Cancel QRIS orders whose code expired.
    ExpireQr,
}

impl SweepKind {
    pub const ALL: [Self; 2] = [Self::CheckExpired, Self::ExpireQr];

    const fn expiry(self) -> ExpiryKind {
        match self {
            Self::CheckExpired => ExpiryKind::PaymentDeadline,
            Self::ExpireQr => ExpiryKind::QrCode,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CheckExpired => "check_expired",
            Self::ExpireQr => "expire_qr",
        }
    }
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("failed to load due orders: {0}")]
    Repository(#[from] RepositoryError),
}

/// Outcome of one sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub kind: SweepKind,
    pub expired: u64,
    pub failed: u64,
}

/// Run one sweep now.
///
/// # Errors
///
/// Returns `SweepError` only if the due orders cannot be listed; failures on
/// individual orders are logged and counted.
#[instrument(skip(pool), fields(sweep = kind.name()))]
pub async fn run_sweep(pool: &PgPool, kind: SweepKind) -> Result<SweepReport, SweepError> {
    let orders = OrderRepository::new(pool);
    let now = Utc::now();
    let due = orders.due_for_expiry(kind.expiry(), now, SWEEP_BATCH).await?;

    let mut report = SweepReport {
        kind,
        expired: 0,
        failed: 0,
    };

    for id in due {
        match orders.expire(id, kind.expiry(), now).await {
            Ok(Some(expired)) => {
                report.expired += 1;
                tracing::info!(
                    order_id = %expired.id,
                    order_number = %expired.order_number,
                    "Expired unpaid order"
                );
            }
            Ok(None) => {
                tracing::debug!(order_id = %id, "Order no longer due; skipped");
            }
            Err(e) => {
                report.failed += 1;
                tracing::error!(order_id = %id, error = %e, "Failed to expire order");
            }
        }
    }

    if report.expired > 0 || report.failed > 0 {
        tracing::info!(
            expired = report.expired,
            failed = report.failed,
            "Sweep finished"
        );
    }

    Ok(report)
}

/// Run every sweep once, in order.
///
/// # Errors
///
/// Returns the first `SweepError`.
pub async fn run_all(pool: &PgPool) -> Result<Vec<SweepReport>, SweepError> {
    let mut reports = Vec::with_capacity(SweepKind::ALL.len());
    for kind in SweepKind::ALL {
        reports.push(run_sweep(pool, kind).await?);
    }
    Ok(reports)
}

/// Run both sweeps every `interval` until `shutdown` flips to `true`.
pub fn spawn_sweeper(
    pool: PgPool,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::info!(interval_secs = interval.as_secs(), "Order sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = run_all(&pool).await {
                        tracing::error!(error = %e, "Order sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Order sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_kinds_map_to_distinct_predicates() {
        assert_eq!(SweepKind::CheckExpired.expiry(), ExpiryKind::PaymentDeadline);
        assert_eq!(SweepKind::ExpireQr.expiry(), ExpiryKind::QrCode);
    }

    #[test]
    fn test_report_serializes_kind_snake_case() {
        let report = SweepReport {
            kind: SweepKind::ExpireQr,
            expired: 2,
            failed: 0,
        };
        let json = serde_json::to_value(report).expect("serialize");
        assert_eq!(json["kind"], "expire_qr");
        assert_eq!(json["expired"], 2);
    }
}
