//! Service configuration

use chrono_tz::Tz;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for the embedded store (env: DATA_DIR)
    pub data_dir: String,
    /// Local timezone the schedulers run in (env: TIMEZONE)
    pub timezone: Tz,
    /// Trial length granted on registration, in days (env: TRIAL_DAYS)
    pub trial_days: u32,
    /// Payment reminder look-ahead window, in days (env: REMINDER_WINDOW_DAYS)
    pub reminder_window_days: i64,
    /// Local hour the daily lifecycle sweep fires (env: SWEEP_HOUR)
    pub sweep_hour: u32,
    /// Local hour the payment reminder job fires (env: REMINDER_HOUR)
    pub reminder_hour: u32,
    /// Environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables. An unset variable
    /// takes its default; a set but invalid value is an error.
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let timezone = match std::env::var("TIMEZONE") {
            Ok(s) => s
                .parse::<Tz>()
                .map_err(|_| format!("Invalid TIMEZONE: {s}"))?,
            Err(_) => chrono_tz::America::Argentina::Buenos_Aires,
        };

        let trial_days = parse_day_count("TRIAL_DAYS", std::env::var("TRIAL_DAYS").ok(), 7)?;
        let trial_days = u32::try_from(trial_days)
            .map_err(|_| format!("TRIAL_DAYS out of range: {trial_days}"))?;

        Ok(Self {
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "data".into()),
            timezone,
            trial_days,
            reminder_window_days: parse_day_count(
                "REMINDER_WINDOW_DAYS",
                std::env::var("REMINDER_WINDOW_DAYS").ok(),
                7,
            )?,
            sweep_hour: parse_hour("SWEEP_HOUR", std::env::var("SWEEP_HOUR").ok(), 0)?,
            reminder_hour: parse_hour("REMINDER_HOUR", std::env::var("REMINDER_HOUR").ok(), 9)?,
            environment,
        })
    }
}

/// Positive day count; `None` (unset) falls back to the default.
fn parse_day_count(name: &str, value: Option<String>, default: i64) -> Result<i64, BoxError> {
    let days = match value {
        Some(v) => v.parse().map_err(|_| format!("Invalid {name}: {v}"))?,
        None => default,
    };
    if days <= 0 {
        return Err(format!("{name} must be positive, got {days}").into());
    }
    Ok(days)
}

/// Hour of day, 0..=23; `None` (unset) falls back to the default.
fn parse_hour(name: &str, value: Option<String>, default: u32) -> Result<u32, BoxError> {
    let hour = match value {
        Some(v) => v.parse().map_err(|_| format!("Invalid {name}: {v}"))?,
        None => default,
    };
    if hour > 23 {
        return Err(format!("{name} must be 0..=23, got {hour}").into());
    }
    Ok(hour)
}
