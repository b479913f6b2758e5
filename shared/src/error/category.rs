//! Error categories, derived from error code ranges

use serde::{Deserialize, Serialize};

/// Classification of errors by domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 0xxx: validation, not-found, bad input
    General,
    /// 3xxx: lubricentro / subscription errors
    Lubricentro,
    /// 9xxx: infrastructure failures
    System,
}

impl ErrorCategory {
    /// Derive the category from a numeric error code
    pub fn from_code(code: u16) -> Self {
        match code {
            3000..=3999 => Self::Lubricentro,
            9000..=9999 => Self::System,
            _ => Self::General,
        }
    }
}
