//! Payment reminder job
//!
//! Runs daily and writes a pending notification for every lubricentro
//! whose next payment falls inside the reminder window. Reminder records
//! carry a deterministic id per (tenant, due date), so a re-run inside the
//! same window writes nothing new.

use chrono::TimeZone;
use chrono_tz::Tz;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use super::{JobOutcome, next_daily_run};
use crate::db::repository::{LubricentroRepository, NotificationRepository, PaymentReminder};
use shared::util::MILLIS_PER_DAY;

pub struct PaymentReminderJob {
    lubricentros: LubricentroRepository,
    notifications: NotificationRepository,
    shutdown: CancellationToken,
    tz: Tz,
    hour: u32,
    window_days: i64,
}

impl PaymentReminderJob {
    pub fn new(
        db: Surreal<Db>,
        shutdown: CancellationToken,
        tz: Tz,
        hour: u32,
        window_days: i64,
    ) -> Self {
        Self {
            lubricentros: LubricentroRepository::new(db.clone()),
            notifications: NotificationRepository::new(db),
            shutdown,
            tz,
            hour,
            window_days,
        }
    }

    pub async fn run(self) {
        tracing::info!(
            hour = self.hour,
            window_days = self.window_days,
            "Payment reminder job started"
        );

        loop {
            let sleep_duration = next_daily_run(self.hour, self.tz);
            tracing::info!(
                "Next payment reminder run in {} minutes",
                sleep_duration.as_secs() / 60
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Payment reminder job received shutdown signal");
                    return;
                }
            }

            let now = shared::util::now_millis();
            match self.run_once(now).await {
                JobOutcome::Completed { detail } => {
                    tracing::info!(%detail, "Payment reminder run completed");
                }
                JobOutcome::Failed { detail } => {
                    tracing::error!(%detail, "Payment reminder run failed");
                }
            }
        }
    }

    /// One reminder pass: find payments due in (now, now + window], upsert
    /// one pending notification each
    pub async fn run_once(&self, now: i64) -> JobOutcome {
        let to = now + self.window_days * MILLIS_PER_DAY;
        let due = match self.lubricentros.find_upcoming_payments(now, to).await {
            Ok(due) => due,
            Err(e) => {
                return JobOutcome::Failed {
                    detail: e.to_string(),
                };
            }
        };

        let reminders: Vec<PaymentReminder> = due
            .iter()
            .filter_map(|t| {
                let due_date = t.next_payment_date?;
                Some(PaymentReminder {
                    lubricentro_id: t.id_string(),
                    lubricentro_name: t.fantasy_name.clone(),
                    message: self.reminder_message(&t.fantasy_name, due_date),
                    due_date,
                })
            })
            .collect();

        match self.notifications.upsert_payment_reminders(&reminders, now).await {
            Ok(created) => JobOutcome::Completed {
                detail: serde_json::json!({
                    "due_within_window": reminders.len(),
                    "reminders_created": created,
                }),
            },
            Err(e) => JobOutcome::Failed {
                detail: e.to_string(),
            },
        }
    }

    fn reminder_message(&self, name: &str, due_date: i64) -> String {
        let date = chrono::Utc
            .timestamp_millis_opt(due_date)
            .single()
            .map(|dt| dt.with_timezone(&self.tz).format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string());
        format!("{}: el próximo pago de la suscripción vence el {}", name, date)
    }
}
