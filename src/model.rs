//! Wire Types
//!
//! Request and response bodies exchanged with the ECG backend, plus the
//! [`Sample`] reading they carry.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One ECG reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the reading was taken (RFC 3339 on the wire; offset-less
    /// timestamps are read as UTC)
    #[serde(deserialize_with = "de_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Raw signal value
    pub ecg_signal: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, ecg_signal: f64) -> Self {
        Self {
            timestamp,
            ecg_signal,
        }
    }
}

/// Parse a sample timestamp. Accepts RFC 3339 and ISO 8601 without an
/// offset (`2024-01-01T00:00:01`, as Python's `isoformat()` emits), the
/// latter taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

/// Body of `GET /api/ecg-data`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EcgDataResponse {
    #[serde(default)]
    pub data: Vec<Sample>,
}

/// Body of `POST /api/login` and `POST /api/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

/// Response from the login and register endpoints.
///
/// Both fields are optional: a successful call carries `user_id`, a
/// rejected registration usually carries `message` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default, deserialize_with = "de_user_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    /// Decode a 2xx body. A body that is not an auth object (plain text,
    /// HTML, a bare JSON string) carries no `user_id` and decodes as empty.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Auth response is not a JSON object, treating as empty");
            Self::default()
        })
    }

    /// The returned identifier, if present and non-empty
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }

    /// The server message, if present and non-empty
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

/// Backends disagree on whether `user_id` is a number or a string. Zero,
/// like any other falsy value, means no identifier.
fn de_user_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    })
}

/// Default backend address
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

pub const LOGIN_PATH: &str = "/api/login";
pub const REGISTER_PATH: &str = "/api/register";
pub const ECG_DATA_PATH: &str = "/api/ecg-data";

/// Path and query for fetching one user's samples
pub fn ecg_data_path(user_id: &str) -> String {
    format!("{}?user_id={}", ECG_DATA_PATH, urlencoding::encode(user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplaySettings, DisplayState};
    use crate::error::ApiError;

    #[test]
    fn test_sample_from_json() {
        let body = r#"{"data":[{"timestamp":"2024-01-01T00:00:02Z","ecg_signal":1.0}]}"#;
        let resp: EcgDataResponse = serde_json::from_str(body).unwrap();

        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0].ecg_signal, 1.0);
        assert_eq!(resp.data[0].timestamp.to_rfc3339(), "2024-01-01T00:00:02+00:00");
    }

    #[test]
    fn test_offsetless_timestamps_read_as_utc() {
        let body = r#"{"data":[
            {"timestamp":"2024-01-01T00:00:02","ecg_signal":1.0},
            {"timestamp":"2024-01-01T00:00:01.250","ecg_signal":0.5}
        ]}"#;
        let resp: EcgDataResponse = serde_json::from_str(body).unwrap();

        assert_eq!(resp.data[0].timestamp.to_rfc3339(), "2024-01-01T00:00:02+00:00");
        assert_eq!(resp.data[1].timestamp.to_rfc3339(), "2024-01-01T00:00:01.250+00:00");

        let state =
            DisplayState::from_fetch(Ok::<_, ApiError>(resp.data), &DisplaySettings::default());
        let frame = state.frame().expect("should be displaying");
        let values: Vec<f64> = frame.samples.iter().map(|s| s.ecg_signal).collect();
        assert_eq!(values, vec![0.5, 1.0]);
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();

        assert_eq!(parse_timestamp("2024-01-01T03:00:01+03:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T00:00:01Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T00:00:01"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01 00:00:01"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_unparseable_timestamp_rejects_batch() {
        let body = r#"{"data":[{"timestamp":"soon","ecg_signal":1.0}]}"#;
        assert!(serde_json::from_str::<EcgDataResponse>(body).is_err());
    }

    #[test]
    fn test_missing_data_field_is_empty() {
        let resp: EcgDataResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.data.is_empty());
    }

    #[test]
    fn test_auth_response_numeric_user_id() {
        let resp: AuthResponse = serde_json::from_str(r#"{"user_id": 42}"#).unwrap();
        assert_eq!(resp.user_id(), Some("42"));
        assert_eq!(resp.message(), None);
    }

    #[test]
    fn test_auth_response_falsy_user_id() {
        for body in [r#"{"user_id": 0}"#, r#"{"user_id": 0.0}"#, r#"{"user_id": false}"#] {
            let resp: AuthResponse = serde_json::from_str(body).unwrap();
            assert_eq!(resp.user_id(), None, "{}", body);
        }
    }

    #[test]
    fn test_auth_response_from_non_json_body() {
        assert_eq!(AuthResponse::from_body("<html>OK</html>"), AuthResponse::default());
        assert_eq!(AuthResponse::from_body(r#""Welcome""#), AuthResponse::default());
        assert_eq!(AuthResponse::from_body(r#"{"user_id": "42"}"#).user_id(), Some("42"));
    }

    #[test]
    fn test_auth_response_empty_user_id() {
        let resp: AuthResponse =
            serde_json::from_str(r#"{"user_id": "", "message": "login taken"}"#).unwrap();
        assert_eq!(resp.user_id(), None);
        assert_eq!(resp.message(), Some("login taken"));
    }

    #[test]
    fn test_ecg_data_path_encodes_id() {
        assert_eq!(ecg_data_path("42"), "/api/ecg-data?user_id=42");
        assert_eq!(ecg_data_path("a b&c"), "/api/ecg-data?user_id=a%20b%26c");
    }
}
