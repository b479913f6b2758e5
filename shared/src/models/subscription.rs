//! Subscription lifecycle vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription lifecycle state of a lubricentro
///
/// One discriminated field replaces the legacy pair of free-form status
/// strings that carried the same three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state of the current billing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Pending,
}

/// Length of the recurring billing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    Monthly,
    Semiannual,
}

impl BillingInterval {
    /// Calendar months the cycle rolls forward by on expiry
    pub fn months(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Semiannual => 6,
        }
    }
}

/// How a subscription renews when the period ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalMode {
    /// An administrator re-activates by hand after payment
    Manual,
    /// The cycle rolls forward and payment is collected afterwards
    Automatic,
}

/// Reason a lubricentro shows up on the "needs attention" dashboard
///
/// At most one reason fires per record; the trial check takes precedence
/// over the expired-subscription check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AttentionReason {
    /// Trial ends within the next 3 days
    TrialEnding { days_remaining: i64 },
    /// Active subscription whose period end has already passed
    SubscriptionExpired { days_overdue: i64 },
}
