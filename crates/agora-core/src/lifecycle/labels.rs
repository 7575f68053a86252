//! Human-readable scheduling labels.

use chrono::{DateTime, Local, TimeDelta, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Describe a future offset the way a feed shows it: "in 3 hours".
///
/// Each unit is rounded to the nearest whole value, and a value that rounds up
/// to the next unit's threshold is promoted ("in 60 minutes" reads "in 1 hour").
pub fn relative_label(until: TimeDelta) -> String {
    let secs = until.num_seconds().max(0);
    if secs < MINUTE {
        return "in less than a minute".to_string();
    }

    let minutes = rounded(secs, MINUTE);
    if minutes < 60 {
        return phrase(minutes, "minute");
    }
    let hours = rounded(secs, HOUR);
    if hours < 24 {
        return phrase(hours, "hour");
    }
    let days = rounded(secs, DAY);
    if days < 30 {
        return phrase(days, "day");
    }
    let months = rounded(secs, MONTH);
    if months < 12 {
        return phrase(months, "month");
    }
    phrase(rounded(secs, YEAR), "year")
}

/// Format the schedule instant in the local time zone, e.g. "Mar 1, 2025 9:05 AM".
pub fn absolute_label(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%b %-d, %Y %-I:%M %p")
        .to_string()
}

fn rounded(secs: i64, unit: i64) -> i64 {
    (secs + unit / 2) / unit
}

fn phrase(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("in 1 {unit}")
    } else {
        format!("in {n} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_a_minute() {
        assert_eq!(relative_label(TimeDelta::seconds(59)), "in less than a minute");
    }

    #[test]
    fn minutes_and_promotion_to_hours() {
        assert_eq!(relative_label(TimeDelta::minutes(1)), "in 1 minute");
        assert_eq!(relative_label(TimeDelta::minutes(45)), "in 45 minutes");
        assert_eq!(relative_label(TimeDelta::seconds(59 * 60 + 40)), "in 1 hour");
    }

    #[test]
    fn hours_days_months_years() {
        assert_eq!(relative_label(TimeDelta::hours(3)), "in 3 hours");
        assert_eq!(relative_label(TimeDelta::hours(2) - TimeDelta::seconds(1)), "in 2 hours");
        assert_eq!(relative_label(TimeDelta::hours(36)), "in 2 days");
        assert_eq!(relative_label(TimeDelta::days(45)), "in 2 months");
        assert_eq!(relative_label(TimeDelta::days(400)), "in 1 year");
    }

    #[test]
    fn absolute_label_mentions_year() {
        let at = DateTime::parse_from_rfc3339("2031-06-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(absolute_label(at).contains("2031"));
    }
}
