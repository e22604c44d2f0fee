//! Expiration metadata
//!
//! The expiration marker is advisory: an RFC3339 timestamp stored under the
//! `expiration` key of an object's custom metadata. The storage service does
//! not act on it.

use jiff::{SignedDuration, Timestamp};

use crate::error::{Error, Result};

/// Custom metadata key holding the expiration timestamp
pub const EXPIRATION_KEY: &str = "expiration";

/// Timestamp `days` days after `now`, truncated to whole seconds
pub fn expiration_after(now: Timestamp, days: u32) -> Result<Timestamp> {
    let now = Timestamp::from_second(now.as_second())
        .map_err(|e| Error::General(format!("Invalid timestamp: {e}")))?;
    now.checked_add(SignedDuration::from_hours(i64::from(days) * 24))
        .map_err(|e| Error::InvalidInput(format!("Expiration of {days} days is out of range: {e}")))
}

/// Validate a user-supplied day count for tagging an existing object
pub fn validate_days(days: i64) -> Result<u32> {
    if days <= 0 {
        return Err(Error::InvalidInput(
            "Expiration days must be greater than 0".into(),
        ));
    }
    u32::try_from(days)
        .map_err(|_| Error::InvalidInput(format!("Expiration days out of range: {days}")))
}

/// RFC3339 form stored in object metadata
pub fn format_expiration(at: Timestamp) -> String {
    at.to_string()
}

/// Parse a stored expiration value
#[cfg(test)]
pub(crate) fn parse_expiration(value: &str) -> Result<Timestamp> {
    value
        .parse()
        .map_err(|e| Error::InvalidInput(format!("Invalid expiration '{value}': {e}")))
}
