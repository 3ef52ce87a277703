use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Value of the `source` field on every payload.
pub const SOURCE: &str = "github-actions";

/// Body of the webhook POST. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    pub timestamp: String,
    pub message: String,
    pub repository: String,
    pub branch: String,
    pub source: &'static str,
}

impl NotificationPayload {
    /// Build a payload stamped with the current UTC time.
    pub fn new(message: &str, repository: &str, branch: &str) -> Self {
        Self::at(Utc::now(), message, repository, branch)
    }

    pub fn at(now: DateTime<Utc>, message: &str, repository: &str, branch: &str) -> Self {
        Self {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, true),
            message: message.to_string(),
            repository: repository.to_string(),
            branch: branch.to_string(),
            source: SOURCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_exact_wire_shape() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let payload = NotificationPayload::at(now, "Deploy done", "acme/widgets", "main");
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"timestamp":"2024-05-01T12:30:00.000000Z","message":"Deploy done","repository":"acme/widgets","branch":"main","source":"github-actions"}"#
        );
    }

    #[test]
    fn timestamp_is_utc_iso8601() {
        let payload = NotificationPayload::new("m", "r", "b");
        let parsed = DateTime::parse_from_rfc3339(&payload.timestamp).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert!(payload.timestamp.ends_with('Z'));
    }

    #[test]
    fn empty_fields_are_kept() {
        let payload = NotificationPayload::new("", "", "");
        let value = serde_json::to_value(&payload).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        assert_eq!(obj["message"], "");
        assert_eq!(obj["source"], SOURCE);
    }
}
