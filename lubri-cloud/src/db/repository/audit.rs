//! Subscription audit repository
//!
//! Append-only: only `append` and query methods exist, no update/delete.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{AuditAction, AuditEntry};
use serde::{Deserialize, Serialize};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

const TABLE: &str = "subscription_audit";

/// Insert payload (no record id; SurrealDB assigns one)
#[derive(Debug, Serialize)]
struct AuditInsert {
    lubricentro_id: String,
    action: AuditAction,
    details: serde_json::Value,
    admin_id: String,
    timestamp: i64,
}

/// COUNT result row
#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

#[derive(Clone)]
pub struct AuditRepository {
    base: BaseRepository,
}

impl AuditRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Append one audit entry
    pub async fn append(
        &self,
        lubricentro_id: &str,
        action: AuditAction,
        details: serde_json::Value,
        admin_id: &str,
        timestamp: i64,
    ) -> RepoResult<AuditEntry> {
        let insert = AuditInsert {
            lubricentro_id: lubricentro_id.to_string(),
            action,
            details,
            admin_id: admin_id.to_string(),
            timestamp,
        };

        let mut result = self
            .base
            .db()
            .query("CREATE subscription_audit CONTENT $data RETURN AFTER")
            .bind(("data", insert))
            .await?;

        let created: Option<AuditEntry> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to append audit entry".to_string()))
    }

    /// Entries for one lubricentro, newest first (paginated)
    pub async fn find_by_lubricentro(
        &self,
        lubricentro_id: &str,
        limit: usize,
        offset: usize,
    ) -> RepoResult<Vec<AuditEntry>> {
        let sql = format!(
            "SELECT * FROM {TABLE} WHERE lubricentro_id = $lubricentro_id \
             ORDER BY timestamp DESC LIMIT {limit} START {offset}"
        );
        let entries: Vec<AuditEntry> = self
            .base
            .db()
            .query(sql)
            .bind(("lubricentro_id", lubricentro_id.to_string()))
            .await?
            .take(0)?;
        Ok(entries)
    }

    /// Total number of audit entries
    pub async fn count(&self) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() AS total FROM subscription_audit GROUP ALL")
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
