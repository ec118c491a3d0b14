//! Local calendar dates
//!
//! Resolves a user's configured zone and buckets instants into the calendar
//! date the user experienced them on.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use regex::Regex;

use crate::app::steps_config::DEFAULT_TIMEZONE;

/// Largest offset any real zone uses
const MAX_OFFSET_SECONDS: i32 = 14 * 3600;

/// A user's resolved time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserZone {
    /// IANA zone, e.g. `Europe/Berlin`
    Named(Tz),
    /// Fixed offset, e.g. `UTC+2` or `+05:30`
    Fixed(FixedOffset),
}

impl Default for UserZone {
    fn default() -> Self {
        UserZone::Named(Tz::UTC)
    }
}

impl UserZone {
    /// Resolve a profile zone setting, falling back to UTC when it is unset,
    /// blank, or not understood.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };

        Self::try_parse(raw).unwrap_or_else(|| {
            tracing::warn!(
                timezone = raw,
                fallback = DEFAULT_TIMEZONE,
                "Unrecognised time zone"
            );
            Self::default()
        })
    }

    /// Parse an IANA name or a fixed offset
    pub fn try_parse(raw: &str) -> Option<Self> {
        if let Ok(tz) = raw.parse::<Tz>() {
            return Some(UserZone::Named(tz));
        }
        parse_fixed_offset(raw).map(UserZone::Fixed)
    }

    /// Calendar date of `instant` in this zone
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            UserZone::Named(tz) => instant.with_timezone(tz).date_naive(),
            UserZone::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }

    /// The user's current local date, given the server clock `now`
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local_date(now)
    }
}

/// Parse `UTC+2`, `GMT-05:30`, `+0200` and similar into a fixed offset
fn parse_fixed_offset(raw: &str) -> Option<FixedOffset> {
    static OFFSET: OnceLock<Option<Regex>> = OnceLock::new();
    let re = OFFSET
        .get_or_init(|| Regex::new(r"^(?i)(?:utc|gmt)?\s*([+-])(\d{1,2})(?::?(\d{2}))?$").ok())
        .as_ref()?;
    let caps = re.captures(raw.trim())?;

    let hours: i32 = caps.get(2)?.as_str().parse().ok()?;
    let minutes: i32 = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    if minutes >= 60 {
        return None;
    }

    let seconds = hours * 3600 + minutes * 60;
    if seconds > MAX_OFFSET_SECONDS {
        return None;
    }

    let sign = if caps.get(1)?.as_str() == "-" { -1 } else { 1 };
    FixedOffset::east_opt(sign * seconds)
}
