//! Date helper functions

use chrono::{DateTime, Utc};

/// Format a date as an HTML valid date string (`YYYY-MM-DD`, UTC)
pub fn html_date_string(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a date for display, like "05 Jan 2024"
pub fn readable_date(date: &DateTime<Utc>) -> String {
    date.format("%d %b %Y").to_string()
}
