//! Calendar helpers evaluated in a configured IANA time zone.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

fn zone(name: &str) -> Tz {
    name.parse().unwrap_or_else(|_| {
        tracing::warn!(timezone = name, "unknown time zone, falling back to UTC");
        Tz::UTC
    })
}

/// Today's date in `tz`.
pub fn today_in(tz: &str) -> NaiveDate {
    Utc::now().with_timezone(&zone(tz)).date_naive()
}

/// Whether `ts` falls on today's date in `tz`.
pub fn is_today(ts: DateTime<Utc>, tz: &str) -> bool {
    let tz = zone(tz);
    ts.with_timezone(&tz).date_naive() == Utc::now().with_timezone(&tz).date_naive()
}
