use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};

/// Zone that acquisition times are shown in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayZone {
    /// The host's zone. In the browser this is the page's zone.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    pub fn utc() -> Self {
        DisplayZone::Fixed(Utc.fix())
    }

    /// The same instant on this zone's wall clock.
    pub fn localize(self, ts: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            DisplayZone::Local => ts.with_timezone(&Local).fixed_offset(),
            DisplayZone::Fixed(offset) => ts.with_timezone(&offset),
        }
    }
}

/// "Monday, January 1, 2024". Empty for a missing timestamp.
pub fn format_date<Tz: TimeZone>(ts: Option<&DateTime<Tz>>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match ts {
        Some(ts) => ts.format("%A, %B %-d, %Y").to_string(),
        None => String::new(),
    }
}

/// "6:30 PM". Empty for a missing timestamp.
pub fn format_time<Tz: TimeZone>(ts: Option<&DateTime<Tz>>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match ts {
        Some(ts) => ts.format("%-I:%M %p").to_string(),
        None => String::new(),
    }
}

/// Coarse human age of `ts` relative to `now`, e.g. "3 hours" or "a day".
pub fn humanize_since(ts: Option<&DateTime<FixedOffset>>, now: &DateTime<FixedOffset>) -> String {
    let Some(ts) = ts else {
        return String::new();
    };
    let secs = (*now - *ts).num_seconds().unsigned_abs() as f64;
    let minutes = secs / 60.0;
    let hours = minutes / 60.0;
    let days = hours / 24.0;

    if secs < 45.0 {
        "a few seconds".to_string()
    } else if secs < 90.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes", minutes.round() as u64)
    } else if minutes < 90.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{} hours", hours.round() as u64)
    } else if hours < 36.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{} days", days.round() as u64)
    } else if days < 45.0 {
        "a month".to_string()
    } else if days < 320.0 {
        format!("{} months", (days / 30.4).round() as u64)
    } else if days < 548.0 {
        "a year".to_string()
    } else {
        format!("{} years", (days / 365.0).round() as u64)
    }
}

/// "3 hours ago" for a timestamp, measured against a Unix-millisecond clock.
/// Empty for a missing timestamp or an unrepresentable clock.
pub fn age_label(ts: Option<&DateTime<FixedOffset>>, now_ms: i64) -> String {
    let Some(now) = DateTime::<chrono::Utc>::from_timestamp_millis(now_ms) else {
        return String::new();
    };
    match ts {
        Some(ts) => format!("{} ago", humanize_since(Some(ts), &now.fixed_offset())),
        None => String::new(),
    }
}
