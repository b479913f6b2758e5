//! Monthly service counter reset
//!
//! Runs at 00:00 local time on the 1st of every month and zeroes
//! `services_used_this_month` for every lubricentro in one transaction.

use chrono_tz::Tz;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use super::{JobOutcome, next_monthly_run};
use crate::db::repository::LubricentroRepository;

pub struct MonthlyResetJob {
    lubricentros: LubricentroRepository,
    shutdown: CancellationToken,
    tz: Tz,
}

impl MonthlyResetJob {
    pub fn new(db: Surreal<Db>, shutdown: CancellationToken, tz: Tz) -> Self {
        Self {
            lubricentros: LubricentroRepository::new(db),
            shutdown,
            tz,
        }
    }

    pub async fn run(self) {
        tracing::info!("Monthly reset job started");

        loop {
            let sleep_duration = next_monthly_run(self.tz);
            tracing::info!(
                "Next monthly reset in {} hours",
                sleep_duration.as_secs() / 3600
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Monthly reset job received shutdown signal");
                    return;
                }
            }

            let now = shared::util::now_millis();
            match self.run_once(now).await {
                JobOutcome::Completed { detail } => {
                    tracing::info!(%detail, "Monthly reset completed");
                }
                JobOutcome::Failed { detail } => {
                    tracing::error!(%detail, "Monthly reset failed");
                }
            }
        }
    }

    pub async fn run_once(&self, now: i64) -> JobOutcome {
        match self.lubricentros.reset_all_service_counters(now).await {
            Ok(count) => JobOutcome::Completed {
                detail: serde_json::json!({ "counters_reset": count }),
            },
            Err(e) => JobOutcome::Failed {
                detail: e.to_string(),
            },
        }
    }
}
