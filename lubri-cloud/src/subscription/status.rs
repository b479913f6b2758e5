//! Subscription status resolver
//!
//! Pure, side-effect-free functions over a [`Lubricentro`] snapshot and the
//! current time. Consumed by the dashboards and by the needs-attention
//! query. Missing dates are treated as "now" (already expired) so the
//! resolver fails closed instead of erroring.

use crate::db::models::Lubricentro;
use rust_decimal::Decimal;
use shared::models::{AttentionReason, SubscriptionStatus};
use shared::util::MILLIS_PER_DAY;

/// Trial window in days a lubricentro shows as "trial ending"
const TRIAL_ATTENTION_DAYS: i64 = 3;

/// True iff the tenant is in trial and the trial window has not closed
pub fn is_trial_active(t: &Lubricentro, now: i64) -> bool {
    t.status == SubscriptionStatus::Trial && t.trial_end_date.map(|end| end > now).unwrap_or(false)
}

/// Days until the relevant period ends, rounded up.
///
/// The period end is `current_period_end` when set, else `trial_end_date`,
/// else `now` (yielding 0). Negative values mean already expired.
pub fn days_until_expiration(t: &Lubricentro, now: i64) -> i64 {
    let period_end = t
        .current_period_end
        .or(t.trial_end_date)
        .unwrap_or(now);
    ceil_div(period_end - now, MILLIS_PER_DAY)
}

/// Why the tenant should surface on the attention dashboard, if at all.
///
/// At most one reason fires; the trial check precedes the active check.
pub fn needs_attention(t: &Lubricentro, now: i64) -> Option<AttentionReason> {
    let days = days_until_expiration(t, now);
    match t.status {
        SubscriptionStatus::Trial if (0..=TRIAL_ATTENTION_DAYS).contains(&days) => {
            Some(AttentionReason::TrialEnding {
                days_remaining: days,
            })
        }
        SubscriptionStatus::Active if days < 0 => Some(AttentionReason::SubscriptionExpired {
            days_overdue: -days,
        }),
        _ => None,
    }
}

/// Monthly revenue the tenant contributes: zero unless active, else the
/// plan's list price (custom/absent plans contribute zero).
pub fn monthly_revenue(t: &Lubricentro) -> Decimal {
    if t.status != SubscriptionStatus::Active {
        return Decimal::ZERO;
    }
    t.subscription_plan
        .map(|plan| plan.monthly_price())
        .unwrap_or(Decimal::ZERO)
}

/// Ceiling division for possibly negative numerators
fn ceil_div(n: i64, d: i64) -> i64 {
    n.div_euclid(d) + if n.rem_euclid(d) > 0 { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Lubricentro;
    use shared::models::{BillingInterval, PaymentStatus, PlanType};
    use shared::util::MILLIS_PER_DAY;

    const NOW: i64 = 1_768_435_200_000; // 2026-01-15 00:00:00 UTC

    fn tenant(status: SubscriptionStatus) -> Lubricentro {
        Lubricentro {
            id: None,
            fantasy_name: "Lubricentro Norte".into(),
            responsable: "Ana Pérez".into(),
            email: "norte@example.com".into(),
            cuit: "30-12345678-9".into(),
            status,
            subscription_plan: None,
            trial_end_date: None,
            current_period_start: None,
            current_period_end: None,
            subscription_end_date: None,
            next_payment_date: None,
            last_payment_date: None,
            services_used_this_month: 0,
            services_limit: 100,
            active_user_count: 0,
            auto_renewal: false,
            payment_status: PaymentStatus::Paid,
            renewal_interval: BillingInterval::Monthly,
            created_at: Some(NOW),
            updated_at: Some(NOW),
        }
    }

    #[test]
    fn trial_is_active_only_while_window_open() {
        let mut t = tenant(SubscriptionStatus::Trial);
        t.trial_end_date = Some(NOW + MILLIS_PER_DAY);
        assert!(is_trial_active(&t, NOW));

        t.trial_end_date = Some(NOW - 1);
        assert!(!is_trial_active(&t, NOW));
    }

    #[test]
    fn trial_without_end_date_fails_closed() {
        let t = tenant(SubscriptionStatus::Trial);
        assert!(!is_trial_active(&t, NOW));
        assert_eq!(days_until_expiration(&t, NOW), 0);
    }

    #[test]
    fn active_tenant_is_never_trial_active() {
        let mut t = tenant(SubscriptionStatus::Active);
        t.trial_end_date = Some(NOW + 30 * MILLIS_PER_DAY);
        assert!(!is_trial_active(&t, NOW));
    }

    #[test]
    fn days_round_up_and_go_negative_after_expiry() {
        let mut t = tenant(SubscriptionStatus::Active);
        t.current_period_end = Some(NOW + MILLIS_PER_DAY / 2);
        assert_eq!(days_until_expiration(&t, NOW), 1);

        t.current_period_end = Some(NOW + 3 * MILLIS_PER_DAY);
        assert_eq!(days_until_expiration(&t, NOW), 3);

        t.current_period_end = Some(NOW - 2 * MILLIS_PER_DAY);
        assert_eq!(days_until_expiration(&t, NOW), -2);
    }

    #[test]
    fn period_end_prefers_current_period_over_trial_end() {
        let mut t = tenant(SubscriptionStatus::Active);
        t.trial_end_date = Some(NOW + MILLIS_PER_DAY);
        t.current_period_end = Some(NOW + 10 * MILLIS_PER_DAY);
        assert_eq!(days_until_expiration(&t, NOW), 10);
    }

    #[test]
    fn attention_fires_for_trial_ending_within_three_days() {
        let mut t = tenant(SubscriptionStatus::Trial);
        t.trial_end_date = Some(NOW + 2 * MILLIS_PER_DAY);
        assert_eq!(
            needs_attention(&t, NOW),
            Some(AttentionReason::TrialEnding { days_remaining: 2 })
        );

        t.trial_end_date = Some(NOW + 5 * MILLIS_PER_DAY);
        assert_eq!(needs_attention(&t, NOW), None);
    }

    #[test]
    fn attention_fires_for_expired_active_subscription() {
        let mut t = tenant(SubscriptionStatus::Active);
        t.current_period_end = Some(NOW - 4 * MILLIS_PER_DAY);
        assert_eq!(
            needs_attention(&t, NOW),
            Some(AttentionReason::SubscriptionExpired { days_overdue: 4 })
        );
    }

    #[test]
    fn trial_check_takes_precedence_over_active_check() {
        // An expired trial record reports nothing once negative, and an
        // inactive record never fires either branch.
        let mut t = tenant(SubscriptionStatus::Trial);
        t.trial_end_date = Some(NOW - MILLIS_PER_DAY);
        assert_eq!(needs_attention(&t, NOW), None);

        let mut t = tenant(SubscriptionStatus::Inactive);
        t.current_period_end = Some(NOW - MILLIS_PER_DAY);
        assert_eq!(needs_attention(&t, NOW), None);
    }

    #[test]
    fn revenue_is_zero_unless_active() {
        let mut t = tenant(SubscriptionStatus::Trial);
        t.subscription_plan = Some(PlanType::Premium);
        assert_eq!(monthly_revenue(&t), Decimal::ZERO);

        t.status = SubscriptionStatus::Active;
        assert_eq!(monthly_revenue(&t), PlanType::Premium.monthly_price());

        t.status = SubscriptionStatus::Inactive;
        assert_eq!(monthly_revenue(&t), Decimal::ZERO);
    }

    #[test]
    fn revenue_for_active_without_plan_is_zero() {
        let t = tenant(SubscriptionStatus::Active);
        assert_eq!(monthly_revenue(&t), Decimal::ZERO);
    }
}
