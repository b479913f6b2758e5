//! lubri-cloud — subscription lifecycle service for lubricentro tenants
//!
//! Embedded-store service that manages each lubricentro's subscription
//! state: trial, paid activation, plan changes, monthly service quotas and
//! the scheduled jobs that expire, renew and remind.

pub mod config;
pub mod db;
pub mod jobs;
pub mod state;
pub mod subscription;
