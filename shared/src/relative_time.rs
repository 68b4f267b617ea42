use chrono::{DateTime, Utc};

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Coarse age label for a timestamp: "Just now", "5h ago", "Yesterday", "3d ago" or "Jan 15".
///
/// Buckets are plain elapsed time divided by the hour / day length, truncated.
/// There is no calendar rounding and everything is UTC.
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - then).num_milliseconds();
    let days = elapsed / DAY_MS;

    match days {
        d if d <= 0 => {
            let hours = elapsed / HOUR_MS;
            if hours < 1 {
                "Just now".to_string()
            } else {
                format!("{hours}h ago")
            }
        }
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{d}d ago"),
        _ => then.format("%b %-d").to_string(),
    }
}

/// Same as [`relative_age`] for an RFC 3339 string. `None` if the string doesn't parse.
pub fn relative_age_str(then: &str, now: DateTime<Utc>) -> Option<String> {
    let then = DateTime::parse_from_rfc3339(then).ok()?;
    Some(relative_age(then.with_timezone(&Utc), now))
}
