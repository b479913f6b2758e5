//! Subscription lifecycle core
//!
//! - [`status`]: pure resolver over a tenant snapshot + current time
//! - [`service`]: administrative mutation operations (activate, deactivate,
//!   extend trial, change plan, reset counter, batch)

pub mod service;
pub mod status;

pub use service::{
    AttentionItem, BatchAction, BatchFailure, BatchReport, SubscriptionOverview,
    SubscriptionService,
};
