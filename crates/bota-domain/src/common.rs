//! Shared traits and date helpers used across the booking records.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

/// Exposes a stable identifier for records stored in the backing tables.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Records that may carry a calendar date.
///
/// Undated records are kept by every date filter and sort before dated ones.
pub trait Dated {
    fn date(&self) -> Option<NaiveDate>;

    /// Returns `true` when the record falls on or after `cutoff`, or has no date.
    fn on_or_after(&self, cutoff: Option<NaiveDate>) -> bool {
        match (self.date(), cutoff) {
            (Some(date), Some(cutoff)) => date >= cutoff,
            _ => true,
        }
    }
}

/// Converts a record into a short label for logs and terminal output.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Formats the `YYYY-MM` bucket key used by monthly groupings.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Normalizes free-text town names for grouping and matching.
pub fn normalize_town(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
