//! Privacy mask and idle lock for one shell session.

use bota_config::SessionSettings;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

pub const MASK: &str = "•••";

#[derive(Debug, Clone)]
pub struct SessionState {
    masked: bool,
    idle_timeout: Duration,
    last_activity: DateTime<Utc>,
}

impl SessionState {
    pub fn new(settings: SessionSettings, now: DateTime<Utc>) -> Self {
        Self {
            masked: settings.privacy_mask,
            idle_timeout: Duration::minutes(i64::from(settings.idle_timeout_minutes.max(1))),
            last_activity: now,
        }
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    pub fn set_masked(&mut self, masked: bool) {
        self.masked = masked;
    }

    pub fn toggle_mask(&mut self) -> bool {
        self.masked = !self.masked;
        self.masked
    }

    /// Records activity at `now`. Returns `true` when the session sat idle past the
    /// timeout, in which case the mask has been switched back on.
    pub fn touch(&mut self, now: DateTime<Utc>) -> bool {
        let idle = now - self.last_activity;
        self.last_activity = now;
        if idle >= self.idle_timeout && !self.masked {
            self.masked = true;
            info!(idle_minutes = idle.num_minutes(), "session idle, privacy mask enabled");
            return true;
        }
        false
    }

    /// Renders `amount` with two decimals and the currency code, or the mask.
    pub fn amount(&self, amount: f64, currency: &str) -> String {
        if self.masked {
            MASK.to_string()
        } else {
            format_amount(amount, currency)
        }
    }
}

pub fn format_amount(amount: f64, currency: &str) -> String {
    format!("{amount:.2} {currency}")
}
