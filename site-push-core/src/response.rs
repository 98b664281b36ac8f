//! Parsing of the indexing service's JSON reply.
//!
//! A typical reply looks like `{"remain": 99998, "success": 2}`. Rejected URLs come back in
//! `not_same_site` / `not_valid`, and service-side failures as `{"error": 401, "message": "..."}`.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::SitePushError;

/// Raw result of one push call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushSummary {
    /// URLs accepted by the service. Zero when the field is absent.
    #[serde(default, deserialize_with = "deserialize_success")]
    pub success: u64,
    /// Remaining daily quota, if reported.
    #[serde(default)]
    pub remain: Option<u64>,
    #[serde(default)]
    pub not_same_site: Vec<String>,
    #[serde(default)]
    pub not_valid: Vec<String>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

fn deserialize_success<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<u64>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Parses a reply body into a [`PushSummary`].
///
/// Not JSON, not an object, or a `success` that is not a non-negative integer is a
/// `ResponseFormat` error.
pub fn parse_push_response(body: &str) -> Result<PushSummary, SitePushError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| SitePushError::ResponseFormat(format!("response is not JSON: {e}")))?;

    if !value.is_object() {
        return Err(SitePushError::ResponseFormat(format!(
            "expected a JSON object, got: {value}"
        )));
    }

    let summary: PushSummary = serde_json::from_value(value)
        .map_err(|e| SitePushError::ResponseFormat(format!("unexpected response shape: {e}")))?;

    if let Some(error) = &summary.error {
        warn!(
            error = %error,
            message = summary.message.as_deref().unwrap_or(""),
            "Indexing service reported an error"
        );
    }
    if !summary.not_same_site.is_empty() || !summary.not_valid.is_empty() {
        warn!(
            not_same_site = ?summary.not_same_site,
            not_valid = ?summary.not_valid,
            "Indexing service rejected some URLs"
        );
    }
    Ok(summary)
}
