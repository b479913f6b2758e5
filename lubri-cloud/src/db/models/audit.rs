//! Subscription audit model
//!
//! Immutable record of an administrative action against a tenant's
//! subscription. Created only by the mutation operations; never updated
//! or deleted.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Administrative action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Activation,
    Deactivation,
    TrialExtension,
    PlanChange,
    ServicesReset,
}

/// One audit entry per administrative mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,

    /// "lubricentro:id" the action was applied to
    pub lubricentro_id: String,

    pub action: AuditAction,

    /// Free-form per-action payload (plan, days, reason, ...)
    pub details: serde_json::Value,

    /// Administrator who performed the action
    pub admin_id: String,

    /// Unix millis
    pub timestamp: i64,
}
