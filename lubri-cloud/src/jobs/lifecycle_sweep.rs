//! Daily subscription lifecycle sweep
//!
//! Expires overdue trials, flags or deactivates subscriptions past their
//! end date, and rolls finished billing cycles forward. All writes of one
//! run commit in a single transaction.

use chrono_tz::Tz;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use super::{JobOutcome, next_daily_run};
use crate::db::repository::LubricentroRepository;

pub struct LifecycleSweepJob {
    lubricentros: LubricentroRepository,
    shutdown: CancellationToken,
    tz: Tz,
    hour: u32,
}

impl LifecycleSweepJob {
    pub fn new(db: Surreal<Db>, shutdown: CancellationToken, tz: Tz, hour: u32) -> Self {
        Self {
            lubricentros: LubricentroRepository::new(db),
            shutdown,
            tz,
            hour,
        }
    }

    pub async fn run(self) {
        tracing::info!(hour = self.hour, "Lifecycle sweep job started");

        loop {
            let sleep_duration = next_daily_run(self.hour, self.tz);
            tracing::info!(
                "Next lifecycle sweep in {} minutes",
                sleep_duration.as_secs() / 60
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Lifecycle sweep job received shutdown signal");
                    return;
                }
            }

            let now = shared::util::now_millis();
            match self.run_once(now).await {
                JobOutcome::Completed { detail } => {
                    tracing::info!(%detail, "Lifecycle sweep completed");
                }
                JobOutcome::Failed { detail } => {
                    tracing::error!(%detail, "Lifecycle sweep failed");
                }
            }
        }
    }

    /// One sweep pass at the given instant
    pub async fn run_once(&self, now: i64) -> JobOutcome {
        match self.lubricentros.run_daily_sweep(now).await {
            Ok(counts) => JobOutcome::Completed {
                detail: serde_json::json!({
                    "trials_expired": counts.trials_expired,
                    "renewals_pending": counts.renewals_pending,
                    "subscriptions_deactivated": counts.subscriptions_deactivated,
                    "cycles_rolled": counts.cycles_rolled,
                }),
            },
            Err(e) => JobOutcome::Failed {
                detail: e.to_string(),
            },
        }
    }
}
