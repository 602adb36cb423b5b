use serde::{Deserialize, Serialize};

/// User-configurable settings, persisted inside the portfolio document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Seconds between automatic refresh cycles. 0 means manual-only: data
    /// refreshes only on an explicit user action.
    pub refresh_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 60,
        }
    }
}
