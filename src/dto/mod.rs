use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::error::ServiceError;

/// Club activity payloads.
pub mod activities;
/// Health check payloads.
pub mod health;
/// Match payloads.
pub mod matches;
/// Season rollover payloads.
pub mod season;
/// Server-sent event payloads.
pub mod sse;
/// Team and player standing payloads.
pub mod teams;
/// Validation helpers for DTOs.
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

/// Parse an optional RFC 3339 timestamp supplied by a client.
pub(crate) fn parse_timestamp(
    field: &str,
    value: Option<&str>,
) -> Result<Option<SystemTime>, ServiceError> {
    value
        .map(|raw| {
            OffsetDateTime::parse(raw, &Rfc3339)
                .map(SystemTime::from)
                .map_err(|err| {
                    ServiceError::InvalidArgument(format!("{field} is not an RFC 3339 timestamp: {err}"))
                })
        })
        .transpose()
}

/// Unwrap a field that the wire format leaves optional but the operation requires.
pub(crate) fn required<T>(field: &str, value: Option<T>) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::InvalidArgument(format!("{field} is required")))
}

/// Trimmed, non-empty text for a required field.
pub(crate) fn required_text(field: &str, value: Option<String>) -> Result<String, ServiceError> {
    let value = required(field, value)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidArgument(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn timestamps_round_trip_through_rfc3339() {
        let at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let formatted = format_system_time(at);
        assert_eq!(formatted, "2023-11-14T22:13:20Z");
        assert_eq!(
            parse_timestamp("scheduledAt", Some(&formatted)).unwrap(),
            Some(at)
        );
        assert_eq!(parse_timestamp("scheduledAt", None).unwrap(), None);
        assert!(parse_timestamp("scheduledAt", Some("tomorrow")).is_err());
    }

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(
            required_text("sport", Some("  soccer ".into())).unwrap(),
            "soccer"
        );
        assert!(required_text("sport", Some("   ".into())).is_err());
        assert!(required_text("sport", None).is_err());
    }
}
