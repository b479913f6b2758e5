//! Shared types for the lubri platform
//!
//! Cross-cutting vocabulary used by the cloud service and the console:
//! - [`error`]: unified error codes and the [`error::AppError`] type
//! - [`models`]: subscription domain model (status, plan, billing interval)
//! - [`util`]: time helpers (epoch millis, month arithmetic)

pub mod error;
pub mod models;
pub mod util;
