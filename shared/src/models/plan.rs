//! Subscription plan catalog

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription plan tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Basic,
    Premium,
    Enterprise,
    /// Negotiated plan; limits and price are managed manually
    Custom,
}

impl PlanType {
    /// Monthly service ceiling for the plan. `-1` means unlimited.
    ///
    /// Custom plans start from the basic ceiling until adjusted manually.
    pub fn services_limit(&self) -> i32 {
        match self {
            Self::Basic => 100,
            Self::Premium => 500,
            Self::Enterprise => -1,
            Self::Custom => 100,
        }
    }

    /// Monthly list price in ARS. Custom plans are invoiced out of band
    /// and contribute zero to the estimated revenue.
    pub fn monthly_price(&self) -> Decimal {
        match self {
            Self::Basic => Decimal::from(25_000),
            Self::Premium => Decimal::from(45_000),
            Self::Enterprise => Decimal::from(75_000),
            Self::Custom => Decimal::ZERO,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized plan keys
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown plan: {0}")]
pub struct UnknownPlan(pub String);

impl FromStr for PlanType {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "premium" => Ok(Self::Premium),
            "enterprise" => Ok(Self::Enterprise),
            "custom" => Ok(Self::Custom),
            other => Err(UnknownPlan(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_limits_follow_the_plan_table() {
        assert_eq!(PlanType::Basic.services_limit(), 100);
        assert_eq!(PlanType::Premium.services_limit(), 500);
        assert_eq!(PlanType::Enterprise.services_limit(), -1);
        assert_eq!(PlanType::Custom.services_limit(), 100);
    }

    #[test]
    fn unknown_plan_is_rejected() {
        assert!("gold".parse::<PlanType>().is_err());
        assert_eq!("premium".parse::<PlanType>().unwrap(), PlanType::Premium);
    }

    #[test]
    fn custom_plan_has_no_list_price() {
        assert_eq!(PlanType::Custom.monthly_price(), Decimal::ZERO);
    }
}
