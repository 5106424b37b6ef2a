use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Parse an IANA timezone name such as `Asia/Bangkok`
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow!("Invalid timezone '{name}': {e}"))
}

/// Get current time in the given timezone
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Get current time in the given timezone as RFC3339 string
pub fn now_rfc3339(tz: Tz) -> String {
    now_in(tz).to_rfc3339()
}
