//! Notification repository (payment reminders)
//!
//! Reminder records use a deterministic id derived from the tenant and the
//! payment due date, written with UPSERT. Re-running the reminder sweep
//! within the same billing window therefore cannot create duplicates.

use super::{BaseRepository, RepoResult};
use crate::db::models::{KIND_PAYMENT_REMINDER, Notification, NotificationStatus};
use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "notification";

/// Upsert payload
#[derive(Debug, Serialize)]
struct ReminderInsert {
    lubricentro_id: String,
    lubricentro_name: String,
    kind: String,
    message: String,
    status: NotificationStatus,
    due_date: i64,
    created_at: i64,
}

/// One reminder to write
#[derive(Debug, Clone)]
pub struct PaymentReminder {
    pub lubricentro_id: String,
    pub lubricentro_name: String,
    pub message: String,
    pub due_date: i64,
}

impl PaymentReminder {
    /// Deterministic record key: one reminder per tenant per due date
    fn record_key(&self) -> String {
        let tenant_key = self
            .lubricentro_id
            .rsplit(':')
            .next()
            .unwrap_or(&self.lubricentro_id)
            .replace(['⟨', '⟩'], "");
        format!("pr_{}_{}", tenant_key, self.due_date)
    }
}

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Write a batch of payment reminders in one transaction.
    ///
    /// Reminders whose deterministic id already exists are skipped entirely,
    /// never rewritten: a delivered notification keeps its status and
    /// created_at across re-runs. Returns the number of new reminders.
    pub async fn upsert_payment_reminders(
        &self,
        reminders: &[PaymentReminder],
        now: i64,
    ) -> RepoResult<usize> {
        if reminders.is_empty() {
            return Ok(0);
        }

        let existing = self.existing_reminder_ids(reminders).await?;
        let to_write: Vec<&PaymentReminder> = reminders
            .iter()
            .filter(|r| !existing.contains(&r.record_key()))
            .collect();
        if to_write.is_empty() {
            return Ok(0);
        }

        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for k in 0..to_write.len() {
            sql.push_str(&format!("UPSERT $rid{k} CONTENT $rdata{k} RETURN AFTER;\n"));
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self.base.db().query(sql);
        for (k, reminder) in to_write.iter().enumerate() {
            let rid = RecordId::from_table_key(TABLE, reminder.record_key());
            let data = ReminderInsert {
                lubricentro_id: reminder.lubricentro_id.clone(),
                lubricentro_name: reminder.lubricentro_name.clone(),
                kind: KIND_PAYMENT_REMINDER.to_string(),
                message: reminder.message.clone(),
                status: NotificationStatus::Pending,
                due_date: reminder.due_date,
                created_at: now,
            };
            query = query
                .bind((format!("rid{k}"), rid))
                .bind((format!("rdata{k}"), data));
        }

        query.await?;
        Ok(to_write.len())
    }

    /// Pending notifications, oldest first
    pub async fn find_pending(&self) -> RepoResult<Vec<Notification>> {
        let records: Vec<Notification> = self
            .base
            .db()
            .query("SELECT * FROM notification WHERE status = 'pending' ORDER BY created_at")
            .await?
            .take(0)?;
        Ok(records)
    }

    /// All notifications for one lubricentro, newest first
    pub async fn find_by_lubricentro(&self, lubricentro_id: &str) -> RepoResult<Vec<Notification>> {
        let records: Vec<Notification> = self
            .base
            .db()
            .query(
                "SELECT * FROM notification WHERE lubricentro_id = $lubricentro_id \
                 ORDER BY created_at DESC",
            )
            .bind(("lubricentro_id", lubricentro_id.to_string()))
            .await?
            .take(0)?;
        Ok(records)
    }

    /// Keys of reminders that already exist in the store
    async fn existing_reminder_ids(
        &self,
        reminders: &[PaymentReminder],
    ) -> RepoResult<std::collections::HashSet<String>> {
        let mut existing = std::collections::HashSet::new();
        for reminder in reminders {
            let key = reminder.record_key();
            let rid = RecordId::from_table_key(TABLE, key.clone());
            let found: Option<Notification> = self.base.db().select(rid).await?;
            if found.is_some() {
                existing.insert(key);
            }
        }
        Ok(existing)
    }
}
