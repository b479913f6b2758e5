//! Subscription domain vocabulary shared across the platform

pub mod plan;
pub mod subscription;

pub use plan::PlanType;
pub use subscription::{
    AttentionReason, BillingInterval, PaymentStatus, RenewalMode, SubscriptionStatus,
};
