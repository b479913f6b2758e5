//! lubri-cloud — subscription lifecycle service
//!
//! Long-running service that:
//! - Tracks each lubricentro's subscription state in an embedded store
//! - Applies administrative mutations with a full audit trail
//! - Runs the daily lifecycle sweep, monthly counter reset and payment
//!   reminder jobs

use tokio_util::sync::CancellationToken;

use lubri_cloud::config::{BoxError, Config};
use lubri_cloud::jobs::{LifecycleSweepJob, MonthlyResetJob, PaymentReminderJob};
use lubri_cloud::state::AppState;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lubri_cloud=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting lubri-cloud (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    let shutdown = CancellationToken::new();

    let sweep = LifecycleSweepJob::new(
        state.db.clone(),
        shutdown.clone(),
        config.timezone,
        config.sweep_hour,
    );
    let reset = MonthlyResetJob::new(state.db.clone(), shutdown.clone(), config.timezone);
    let reminders = PaymentReminderJob::new(
        state.db.clone(),
        shutdown.clone(),
        config.timezone,
        config.reminder_hour,
        config.reminder_window_days,
    );

    let handles = vec![
        tokio::spawn(sweep.run()),
        tokio::spawn(reset.run()),
        tokio::spawn(reminders.run()),
    ];

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping jobs");
    shutdown.cancel();

    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("Job task join error: {e}");
        }
    }

    tracing::info!("lubri-cloud stopped");
    Ok(())
}
