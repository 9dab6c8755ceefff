//! Reusable formatting utilities for CLI output

use chrono::{DateTime, Local, Utc};

/// Format an instant as local date/time, e.g. `01/15/2025 14:30 +07:00`.
pub fn format_local_time(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%m/%d/%Y %H:%M %:z")
        .to_string()
}

/// Time left until `expires_at`, e.g. `2h 5m`, or `expired`.
pub fn format_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = expires_at.signed_duration_since(now);
    if remaining.num_seconds() <= 0 {
        return "expired".to_string();
    }

    let hours = remaining.num_hours();
    let mins = remaining.num_minutes() % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m", mins)
    } else {
        "<1m".to_string()
    }
}
