//! Document models stored in SurrealDB

pub mod audit;
pub mod lubricentro;
pub mod notification;
pub mod serde_helpers;

pub use audit::{AuditAction, AuditEntry};
pub use lubricentro::{Lubricentro, LubricentroCreate, LubricentroId};
pub use notification::{KIND_PAYMENT_REMINDER, Notification, NotificationStatus};
