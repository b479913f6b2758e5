//! Lubricentro (tenant) model
//!
//! One document per shop; the unit of billing and access isolation.
//! All timestamps are Unix epoch millis.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::{BillingInterval, PaymentStatus, PlanType, SubscriptionStatus};
use surrealdb::RecordId;

pub type LubricentroId = RecordId;

/// Lubricentro entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lubricentro {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<LubricentroId>,

    /// Trade name shown on dashboards
    pub fantasy_name: String,

    /// Owner / responsible person
    pub responsable: String,

    pub email: String,

    /// Argentine tax id
    pub cuit: String,

    /// Subscription lifecycle state
    pub status: SubscriptionStatus,

    pub subscription_plan: Option<PlanType>,

    /// End of the free trial window
    pub trial_end_date: Option<i64>,

    /// Start of the current paid period
    pub current_period_start: Option<i64>,

    /// End of the current billing cycle
    pub current_period_end: Option<i64>,

    /// Hard end of the subscription contract (manual renewals)
    pub subscription_end_date: Option<i64>,

    pub next_payment_date: Option<i64>,
    pub last_payment_date: Option<i64>,

    /// Oil-change services logged in the current calendar month
    #[serde(default)]
    pub services_used_this_month: i64,

    /// Monthly ceiling derived from the plan; -1 = unlimited
    #[serde(default = "default_services_limit")]
    pub services_limit: i32,

    #[serde(default)]
    pub active_user_count: i64,

    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub auto_renewal: bool,

    pub payment_status: PaymentStatus,

    #[serde(default = "default_renewal_interval")]
    pub renewal_interval: BillingInterval,

    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

fn default_services_limit() -> i32 {
    PlanType::Basic.services_limit()
}

fn default_renewal_interval() -> BillingInterval {
    BillingInterval::Monthly
}

impl Lubricentro {
    /// "table:id" form of the record id, empty string when unsaved
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}

/// Registration payload; lifecycle fields are filled in by the repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LubricentroCreate {
    pub fantasy_name: String,
    pub responsable: String,
    pub email: String,
    pub cuit: String,
}
