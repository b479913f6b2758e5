//! Repository Module
//!
//! CRUD and lifecycle operations over the SurrealDB tables. Mutations that
//! derive new values from stored ones are single UPDATE statements so that
//! concurrent administrative calls cannot interleave a stale read between
//! the read and the write.

pub mod audit;
pub mod lubricentro;
pub mod notification;

pub use audit::AuditRepository;
pub use lubricentro::{LubricentroRepository, SweepCounts};
pub use notification::{NotificationRepository, PaymentReminder};

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
