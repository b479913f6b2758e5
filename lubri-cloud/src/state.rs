//! Shared application state

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::config::{BoxError, Config};
use crate::db;
use crate::subscription::SubscriptionService;

/// Handles shared by the jobs and the service layer. `Surreal<Db>` is
/// internally reference counted, cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub subscriptions: SubscriptionService,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let db = db::open(&config.data_dir).await?;
        tracing::info!(data_dir = %config.data_dir, "Store opened");

        Ok(Self {
            config: config.clone(),
            subscriptions: SubscriptionService::new(db.clone()),
            db,
        })
    }
}
