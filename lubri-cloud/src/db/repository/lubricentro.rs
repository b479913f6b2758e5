//! Lubricentro Repository
//!
//! Lifecycle mutations are single UPDATE statements that compute from the
//! stored value, so two concurrent administrative calls cannot lose an
//! update. The daily sweep commits all of its writes in one transaction.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Lubricentro, LubricentroCreate};
use serde::Serialize;
use shared::models::{BillingInterval, PlanType};
use shared::util;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

pub const TABLE: &str = "lubricentro";

/// Per-step write counts of one daily sweep run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepCounts {
    /// trial records past trial_end_date, set inactive
    pub trials_expired: usize,
    /// active auto-renewal records past subscription_end_date, payment now pending
    pub renewals_pending: usize,
    /// active manual records past subscription_end_date, set inactive
    pub subscriptions_deactivated: usize,
    /// active records whose billing cycle rolled forward
    pub cycles_rolled: usize,
}

/// Rollover candidate row (id + interval is all the sweep needs)
#[derive(Debug, serde::Deserialize)]
struct RolloverRow {
    #[serde(with = "crate::db::models::serde_helpers::option_record_id", default)]
    id: Option<RecordId>,
    #[serde(default)]
    renewal_interval: Option<BillingInterval>,
}

#[derive(Clone)]
pub struct LubricentroRepository {
    base: BaseRepository,
}

impl LubricentroRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Accept both "lubricentro:abc" and bare "abc" forms
    fn parse_id(id: &str) -> RepoResult<RecordId> {
        if id.contains(':') {
            id.parse()
                .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))
        } else {
            Ok(RecordId::from_table_key(TABLE, id))
        }
    }

    /// Register a new lubricentro: trial status, trial_end_date = now + trial_days
    pub async fn create(
        &self,
        data: LubricentroCreate,
        trial_days: u32,
        now: i64,
    ) -> RepoResult<Lubricentro> {
        let trial_end = util::add_days(now, trial_days as i64);
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE lubricentro SET
                    fantasy_name = $fantasy_name,
                    responsable = $responsable,
                    email = $email,
                    cuit = $cuit,
                    status = 'trial',
                    subscription_plan = NONE,
                    trial_end_date = $trial_end,
                    current_period_start = NONE,
                    current_period_end = NONE,
                    subscription_end_date = NONE,
                    next_payment_date = NONE,
                    last_payment_date = NONE,
                    services_used_this_month = 0,
                    services_limit = $services_limit,
                    active_user_count = 0,
                    auto_renewal = false,
                    payment_status = 'paid',
                    renewal_interval = 'monthly',
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("fantasy_name", data.fantasy_name))
            .bind(("responsable", data.responsable))
            .bind(("email", data.email))
            .bind(("cuit", data.cuit))
            .bind(("trial_end", trial_end))
            .bind(("services_limit", PlanType::Basic.services_limit()))
            .bind(("now", now))
            .await?;

        let created: Option<Lubricentro> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create lubricentro".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Lubricentro>> {
        let thing = Self::parse_id(id)?;
        let record: Option<Lubricentro> = self.base.db().select(thing).await?;
        Ok(record)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Lubricentro>> {
        let records: Vec<Lubricentro> = self
            .base
            .db()
            .query("SELECT * FROM lubricentro ORDER BY fantasy_name")
            .await?
            .take(0)?;
        Ok(records)
    }

    /// Tenants whose next payment falls in (from, to]
    pub async fn find_upcoming_payments(&self, from: i64, to: i64) -> RepoResult<Vec<Lubricentro>> {
        let records: Vec<Lubricentro> = self
            .base
            .db()
            .query(
                "SELECT * FROM lubricentro \
                 WHERE next_payment_date != NONE \
                   AND next_payment_date > $from \
                   AND next_payment_date <= $to",
            )
            .bind(("from", from))
            .bind(("to", to))
            .await?
            .take(0)?;
        Ok(records)
    }

    /// Activate a paid subscription; one statement, last write wins on the
    /// whole field set
    pub async fn apply_activation(
        &self,
        id: &str,
        plan: PlanType,
        auto_renewal: bool,
        period_end: i64,
        now: i64,
    ) -> RepoResult<Lubricentro> {
        let thing = Self::parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = 'active',
                    subscription_plan = $plan,
                    current_period_start = $now,
                    current_period_end = $period_end,
                    next_payment_date = $period_end,
                    auto_renewal = $auto_renewal,
                    services_limit = $services_limit,
                    last_payment_date = $now,
                    payment_status = 'paid',
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("plan", plan))
            .bind(("period_end", period_end))
            .bind(("auto_renewal", auto_renewal))
            .bind(("services_limit", plan.services_limit()))
            .bind(("now", now))
            .await?;

        result
            .take::<Option<Lubricentro>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Lubricentro {} not found", id)))
    }

    /// Terminal state; calling twice leaves the same result
    pub async fn apply_deactivation(&self, id: &str, now: i64) -> RepoResult<Lubricentro> {
        let thing = Self::parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = 'inactive',
                    current_period_end = $now,
                    auto_renewal = false,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("now", now))
            .await?;

        result
            .take::<Option<Lubricentro>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Lubricentro {} not found", id)))
    }

    /// Push trial_end_date forward by `additional_ms`, from the stored value
    /// (or from `now` when the record never had one). Single statement, so a
    /// concurrent extension cannot be lost.
    pub async fn extend_trial(
        &self,
        id: &str,
        additional_ms: i64,
        now: i64,
    ) -> RepoResult<Lubricentro> {
        let thing = Self::parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    trial_end_date = (trial_end_date ?? $now) + $additional,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("additional", additional_ms))
            .bind(("now", now))
            .await?;

        result
            .take::<Option<Lubricentro>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Lubricentro {} not found", id)))
    }

    /// Change plan. `reset_period_end = Some(end)` resets the billing cycle
    /// (automatic renewal); `None` preserves the stored current_period_end
    /// without a second read.
    pub async fn apply_plan_change(
        &self,
        id: &str,
        plan: PlanType,
        auto_renewal: bool,
        reset_period_end: Option<i64>,
        now: i64,
    ) -> RepoResult<Lubricentro> {
        let thing = Self::parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    subscription_plan = $plan,
                    services_limit = $services_limit,
                    auto_renewal = $auto_renewal,
                    current_period_end = IF $reset THEN $period_end ELSE current_period_end END,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("plan", plan))
            .bind(("services_limit", plan.services_limit()))
            .bind(("auto_renewal", auto_renewal))
            .bind(("reset", reset_period_end.is_some()))
            .bind(("period_end", reset_period_end))
            .bind(("now", now))
            .await?;

        result
            .take::<Option<Lubricentro>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Lubricentro {} not found", id)))
    }

    /// Zero the monthly usage counter for one tenant
    pub async fn reset_services_counter(&self, id: &str, now: i64) -> RepoResult<Lubricentro> {
        let thing = Self::parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    services_used_this_month = 0,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("now", now))
            .await?;

        result
            .take::<Option<Lubricentro>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Lubricentro {} not found", id)))
    }

    /// Count one performed service against the monthly ceiling.
    ///
    /// Returns `None` when the record exists but the plan limit is already
    /// reached (services_limit = -1 never blocks).
    pub async fn increment_services_used(
        &self,
        id: &str,
        now: i64,
    ) -> RepoResult<Option<Lubricentro>> {
        let thing = Self::parse_id(id)?;

        if self.find_by_id(id).await?.is_none() {
            return Err(RepoError::NotFound(format!("Lubricentro {} not found", id)));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    services_used_this_month += 1,
                    updated_at = $now
                WHERE services_limit = -1 OR services_used_this_month < services_limit
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("now", now))
            .await?;

        Ok(result.take::<Option<Lubricentro>>(0)?)
    }

    /// Monthly reset: zero every tenant's usage counter in one transaction
    pub async fn reset_all_service_counters(&self, now: i64) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                UPDATE lubricentro SET services_used_this_month = 0, updated_at = $now RETURN AFTER;
                COMMIT TRANSACTION;"#,
            )
            .bind(("now", now))
            .await?;

        let updated: Vec<Lubricentro> = result.take(0)?;
        Ok(updated.len())
    }

    /// Daily lifecycle sweep. Scans from the pre-transaction state, then
    /// commits every transition in ONE transaction: either all steps' writes
    /// land or none do.
    ///
    /// 1. trial past trial_end_date            -> inactive
    /// 2. active past subscription_end_date    -> pending payment (auto renewal)
    ///                                         -> inactive (manual)
    /// 3. active past current_period_end       -> cycle rolled 1/6 months,
    ///                                            payment pending
    pub async fn run_daily_sweep(&self, now: i64) -> RepoResult<SweepCounts> {
        // Step 3 needs per-record month arithmetic, so candidates are read first.
        let rollovers: Vec<RolloverRow> = self
            .base
            .db()
            .query(
                "SELECT id, renewal_interval FROM lubricentro \
                 WHERE status = 'active' \
                   AND current_period_end != NONE \
                   AND current_period_end < $now",
            )
            .bind(("now", now))
            .await?
            .take(0)?;
        let rollovers: Vec<(RecordId, BillingInterval)> = rollovers
            .into_iter()
            .filter_map(|row| {
                let id = row.id?;
                Some((id, row.renewal_interval.unwrap_or(BillingInterval::Monthly)))
            })
            .collect();

        let mut sql = String::from(
            r#"BEGIN TRANSACTION;
            UPDATE lubricentro SET status = 'inactive', updated_at = $now
                WHERE status = 'trial' AND trial_end_date != NONE AND trial_end_date < $now
                RETURN AFTER;
            UPDATE lubricentro SET payment_status = 'pending', updated_at = $now
                WHERE status = 'active' AND auto_renewal = true
                  AND subscription_end_date != NONE AND subscription_end_date < $now
                RETURN AFTER;
            UPDATE lubricentro SET status = 'inactive', updated_at = $now
                WHERE status = 'active' AND auto_renewal = false
                  AND subscription_end_date != NONE AND subscription_end_date < $now
                RETURN AFTER;
            "#,
        );
        for k in 0..rollovers.len() {
            sql.push_str(&format!(
                "UPDATE $roll_id{k} SET current_period_end = $roll_end{k}, \
                 next_payment_date = $roll_end{k}, payment_status = 'pending', \
                 updated_at = $now RETURN AFTER;\n"
            ));
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self.base.db().query(sql).bind(("now", now));
        let rolled = rollovers.len();
        for (k, (id, interval)) in rollovers.into_iter().enumerate() {
            let new_end = util::add_months(now, interval.months());
            query = query
                .bind((format!("roll_id{k}"), id))
                .bind((format!("roll_end{k}"), new_end));
        }

        let mut result = query.await?;

        let trials_expired = result.take::<Vec<Lubricentro>>(0)?.len();
        let renewals_pending = result.take::<Vec<Lubricentro>>(1)?.len();
        let subscriptions_deactivated = result.take::<Vec<Lubricentro>>(2)?.len();

        Ok(SweepCounts {
            trials_expired,
            renewals_pending,
            subscriptions_deactivated,
            cycles_rolled: rolled,
        })
    }
}
