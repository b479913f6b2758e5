//! Subscription mutation service
//!
//! The SuperAdmin-facing surface: every operation validates the tenant id,
//! applies one atomic store mutation, and appends exactly one audit entry.
//! The store handle is injected at construction; there is no ambient
//! database state.

use crate::db::models::{AuditAction, Lubricentro};
use crate::db::repository::{AuditRepository, LubricentroRepository, RepoError};
use crate::subscription::status;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{AttentionReason, PlanType, RenewalMode};
use shared::util;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Trial extensions outside this range are rejected at the operation layer
/// instead of being left to callers.
const TRIAL_EXTENSION_RANGE: std::ops::RangeInclusive<i64> = 1..=90;

/// Tenants expiring within this many days count as "expiring soon"
const EXPIRING_SOON_DAYS: i64 = 7;

/// One action inside an [`SubscriptionService::execute_batch`] call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BatchAction {
    Activate {
        lubricentro_id: String,
        plan: String,
        renewal: String,
    },
    Deactivate {
        lubricentro_id: String,
        reason: Option<String>,
    },
    ExtendTrial {
        lubricentro_id: String,
        additional_days: i64,
        reason: Option<String>,
    },
    ChangePlan {
        lubricentro_id: String,
        plan: String,
        renewal: String,
    },
    ResetServicesCounter {
        lubricentro_id: String,
        reason: Option<String>,
    },
}

impl BatchAction {
    pub fn lubricentro_id(&self) -> &str {
        match self {
            Self::Activate { lubricentro_id, .. }
            | Self::Deactivate { lubricentro_id, .. }
            | Self::ExtendTrial { lubricentro_id, .. }
            | Self::ChangePlan { lubricentro_id, .. }
            | Self::ResetServicesCounter { lubricentro_id, .. } => lubricentro_id,
        }
    }
}

/// One failed batch item
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub lubricentro_id: String,
    pub error: String,
}

/// Best-effort batch result; successes are never rolled back
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub successful: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

/// Aggregate numbers for the SuperAdmin dashboard
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionOverview {
    pub total: usize,
    pub trial: usize,
    pub active: usize,
    pub inactive: usize,
    /// Active or trial tenants whose period ends within 7 days
    pub expiring_soon: usize,
    /// Sum of active tenants' plan list prices
    pub estimated_monthly_revenue: Decimal,
}

/// A tenant plus the reason it needs attention
#[derive(Debug, Clone, Serialize)]
pub struct AttentionItem {
    pub lubricentro: Lubricentro,
    pub reason: AttentionReason,
}

#[derive(Clone)]
pub struct SubscriptionService {
    lubricentros: LubricentroRepository,
    audit: AuditRepository,
}

impl SubscriptionService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            lubricentros: LubricentroRepository::new(db.clone()),
            audit: AuditRepository::new(db),
        }
    }

    /// Activate a paid subscription.
    ///
    /// Sets the plan, opens a one-month billing period and records the
    /// payment date. Unknown plan keys fail with [`ErrorCode::InvalidPlan`].
    pub async fn activate(
        &self,
        lubricentro_id: &str,
        plan: &str,
        renewal: &str,
        notes: Option<String>,
        admin_id: &str,
    ) -> AppResult<Lubricentro> {
        validate_id(lubricentro_id)?;
        let plan = parse_plan(plan)?;
        let renewal = parse_renewal(renewal)?;

        let now = util::now_millis();
        let period_end = util::add_months(now, 1);
        let auto_renewal = renewal == RenewalMode::Automatic;

        let updated = self
            .lubricentros
            .apply_activation(lubricentro_id, plan, auto_renewal, period_end, now)
            .await
            .map_err(map_repo_error)?;

        tracing::info!(
            lubricentro_id,
            plan = %plan,
            auto_renewal,
            "Subscription activated"
        );

        self.append_audit(
            &updated,
            AuditAction::Activation,
            serde_json::json!({
                "plan": plan,
                "renewal": renewal,
                "period_end": period_end,
                "notes": notes,
            }),
            admin_id,
            now,
        )
        .await?;

        Ok(updated)
    }

    /// Deactivate a subscription. Idempotent: a second call leaves the same
    /// terminal state (and writes its own audit entry).
    pub async fn deactivate(
        &self,
        lubricentro_id: &str,
        reason: Option<String>,
        admin_id: &str,
    ) -> AppResult<Lubricentro> {
        validate_id(lubricentro_id)?;

        let now = util::now_millis();
        let updated = self
            .lubricentros
            .apply_deactivation(lubricentro_id, now)
            .await
            .map_err(map_repo_error)?;

        tracing::info!(lubricentro_id, "Subscription deactivated");

        self.append_audit(
            &updated,
            AuditAction::Deactivation,
            serde_json::json!({ "reason": reason }),
            admin_id,
            now,
        )
        .await?;

        Ok(updated)
    }

    /// Extend the trial window by `additional_days` (1..=90).
    ///
    /// A record without a trial_end_date extends from now; the resulting
    /// date is part of the audit details so that case stays visible.
    pub async fn extend_trial(
        &self,
        lubricentro_id: &str,
        additional_days: i64,
        reason: Option<String>,
        admin_id: &str,
    ) -> AppResult<Lubricentro> {
        validate_id(lubricentro_id)?;
        if !TRIAL_EXTENSION_RANGE.contains(&additional_days) {
            return Err(AppError::out_of_range(format!(
                "Trial extension must be between {} and {} days, got {}",
                TRIAL_EXTENSION_RANGE.start(),
                TRIAL_EXTENSION_RANGE.end(),
                additional_days
            )));
        }

        let now = util::now_millis();
        let updated = self
            .lubricentros
            .extend_trial(
                lubricentro_id,
                additional_days * util::MILLIS_PER_DAY,
                now,
            )
            .await
            .map_err(map_repo_error)?;

        tracing::info!(
            lubricentro_id,
            additional_days,
            new_trial_end = ?updated.trial_end_date,
            "Trial extended"
        );

        self.append_audit(
            &updated,
            AuditAction::TrialExtension,
            serde_json::json!({
                "additional_days": additional_days,
                "new_trial_end": updated.trial_end_date,
                "reason": reason,
            }),
            admin_id,
            now,
        )
        .await?;

        Ok(updated)
    }

    /// Change the subscription plan.
    ///
    /// Automatic renewal resets the billing cycle to one month from now;
    /// manual renewal preserves the stored period end.
    pub async fn change_plan(
        &self,
        lubricentro_id: &str,
        new_plan: &str,
        renewal: &str,
        admin_id: &str,
    ) -> AppResult<Lubricentro> {
        validate_id(lubricentro_id)?;
        let plan = parse_plan(new_plan)?;
        let renewal = parse_renewal(renewal)?;

        let now = util::now_millis();
        let auto_renewal = renewal == RenewalMode::Automatic;
        let reset_period_end = auto_renewal.then(|| util::add_months(now, 1));

        let updated = self
            .lubricentros
            .apply_plan_change(lubricentro_id, plan, auto_renewal, reset_period_end, now)
            .await
            .map_err(map_repo_error)?;

        tracing::info!(lubricentro_id, plan = %plan, "Plan changed");

        self.append_audit(
            &updated,
            AuditAction::PlanChange,
            serde_json::json!({ "plan": plan, "renewal": renewal }),
            admin_id,
            now,
        )
        .await?;

        Ok(updated)
    }

    /// Zero the tenant's monthly service counter. No side effect on plan or
    /// dates.
    pub async fn reset_services_counter(
        &self,
        lubricentro_id: &str,
        reason: Option<String>,
        admin_id: &str,
    ) -> AppResult<Lubricentro> {
        validate_id(lubricentro_id)?;

        let now = util::now_millis();
        let updated = self
            .lubricentros
            .reset_services_counter(lubricentro_id, now)
            .await
            .map_err(map_repo_error)?;

        tracing::info!(lubricentro_id, "Services counter reset");

        self.append_audit(
            &updated,
            AuditAction::ServicesReset,
            serde_json::json!({ "reason": reason }),
            admin_id,
            now,
        )
        .await?;

        Ok(updated)
    }

    /// Apply a heterogeneous list of actions sequentially, best effort.
    ///
    /// One failure never aborts the batch and successes are not rolled
    /// back; callers must inspect `failed` to know what did not apply.
    pub async fn execute_batch(&self, actions: Vec<BatchAction>, admin_id: &str) -> BatchReport {
        let mut report = BatchReport::default();

        for action in actions {
            let id = action.lubricentro_id().to_string();
            let outcome = match action {
                BatchAction::Activate {
                    ref lubricentro_id,
                    ref plan,
                    ref renewal,
                } => {
                    self.activate(lubricentro_id, plan, renewal, None, admin_id)
                        .await
                }
                BatchAction::Deactivate {
                    ref lubricentro_id,
                    ref reason,
                } => {
                    self.deactivate(lubricentro_id, reason.clone(), admin_id)
                        .await
                }
                BatchAction::ExtendTrial {
                    ref lubricentro_id,
                    additional_days,
                    ref reason,
                } => {
                    self.extend_trial(lubricentro_id, additional_days, reason.clone(), admin_id)
                        .await
                }
                BatchAction::ChangePlan {
                    ref lubricentro_id,
                    ref plan,
                    ref renewal,
                } => {
                    self.change_plan(lubricentro_id, plan, renewal, admin_id)
                        .await
                }
                BatchAction::ResetServicesCounter {
                    ref lubricentro_id,
                    ref reason,
                } => {
                    self.reset_services_counter(lubricentro_id, reason.clone(), admin_id)
                        .await
                }
            };

            match outcome {
                Ok(_) => report.successful.push(id),
                Err(e) => {
                    tracing::warn!(lubricentro_id = %id, error = %e, "Batch action failed");
                    report.failed.push(BatchFailure {
                        lubricentro_id: id,
                        error: e.message,
                    });
                }
            }
        }

        report
    }

    /// Aggregate subscription numbers for the dashboard
    pub async fn get_subscription_overview(&self) -> AppResult<SubscriptionOverview> {
        let now = util::now_millis();
        let all = self.lubricentros.find_all().await.map_err(map_repo_error)?;

        let mut overview = SubscriptionOverview {
            total: all.len(),
            trial: 0,
            active: 0,
            inactive: 0,
            expiring_soon: 0,
            estimated_monthly_revenue: Decimal::ZERO,
        };

        for t in &all {
            use shared::models::SubscriptionStatus::*;
            match t.status {
                Trial => overview.trial += 1,
                Active => overview.active += 1,
                Inactive => overview.inactive += 1,
            }
            if t.status != Inactive {
                let days = status::days_until_expiration(t, now);
                if (0..=EXPIRING_SOON_DAYS).contains(&days) {
                    overview.expiring_soon += 1;
                }
            }
            overview.estimated_monthly_revenue += status::monthly_revenue(t);
        }

        Ok(overview)
    }

    /// Tenants the resolver flags, with the reason attached
    pub async fn get_lubricentros_needing_attention(&self) -> AppResult<Vec<AttentionItem>> {
        let now = util::now_millis();
        let all = self.lubricentros.find_all().await.map_err(map_repo_error)?;

        Ok(all
            .into_iter()
            .filter_map(|t| {
                status::needs_attention(&t, now).map(|reason| AttentionItem {
                    lubricentro: t,
                    reason,
                })
            })
            .collect())
    }

    /// One audit entry per mutation; an audit failure surfaces to the caller
    /// because a silent gap in the trail is worse than a retried action.
    async fn append_audit(
        &self,
        tenant: &Lubricentro,
        action: AuditAction,
        details: serde_json::Value,
        admin_id: &str,
        now: i64,
    ) -> AppResult<()> {
        self.audit
            .append(&tenant.id_string(), action, details, admin_id, now)
            .await
            .map_err(map_repo_error)?;
        Ok(())
    }
}

fn validate_id(id: &str) -> AppResult<()> {
    if id.trim().is_empty() {
        return Err(AppError::validation("Lubricentro id must not be empty"));
    }
    Ok(())
}

fn parse_plan(plan: &str) -> AppResult<PlanType> {
    plan.parse::<PlanType>().map_err(|_| {
        AppError::with_message(
            ErrorCode::InvalidPlan,
            format!("Plan '{}' is not recognized", plan),
        )
        .with_detail("plan", plan)
    })
}

fn parse_renewal(renewal: &str) -> AppResult<RenewalMode> {
    match renewal {
        "manual" => Ok(RenewalMode::Manual),
        "automatic" => Ok(RenewalMode::Automatic),
        other => Err(AppError::validation(format!(
            "Renewal mode '{}' is not recognized",
            other
        ))),
    }
}

/// Repository errors map to the service error vocabulary; infrastructure
/// failures are logged here and surface as DatabaseError.
fn map_repo_error(e: RepoError) -> AppError {
    match e {
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::LubricentroNotFound, msg),
        RepoError::Validation(msg) => AppError::validation(msg),
        RepoError::Database(msg) => {
            tracing::error!(error = %msg, "Repository database error");
            AppError::new(ErrorCode::DatabaseError)
        }
    }
}
