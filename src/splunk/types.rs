//! Splunk management API types.
//!
//! These types map to the JSON feed returned with `output_mode=json`.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Content key holding the disabled flag.
pub const DISABLED_KEY: &str = "disabled";

/// Content key holding the number of events stored in the index.
pub const TOTAL_EVENT_COUNT_KEY: &str = "totalEventCount";

/// Atom-style feed envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Feed {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

/// A single feed entry.
#[derive(Debug, Deserialize)]
pub(crate) struct Entry {
    #[serde(default)]
    pub content: Map<String, Value>,
}

/// Error body returned by the management API.
#[derive(Debug, Deserialize)]
pub(crate) struct MessagesBody {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// A single API message.
#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    pub text: String,
}

/// Response of `POST /services/auth/login`.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(rename = "sessionKey")]
    pub session_key: String,
}

/// Current state of an index as reported by Splunk.
///
/// Always fetched fresh; never cached across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActualState {
    /// Scalar content values, canonicalized to strings.
    attributes: BTreeMap<String, String>,
    /// Whether the index is disabled.
    disabled: bool,
}

impl ActualState {
    /// Creates a state from already-canonical values.
    #[must_use]
    pub const fn new(attributes: BTreeMap<String, String>, disabled: bool) -> Self {
        Self {
            attributes,
            disabled,
        }
    }

    /// Builds the state from an entry's `content` object.
    #[must_use]
    pub fn from_content(content: &Map<String, Value>) -> Self {
        let attributes = content
            .iter()
            .filter_map(|(key, value)| canonical_value(value).map(|v| (key.clone(), v)))
            .collect();
        let disabled = content.get(DISABLED_KEY).is_some_and(is_truthy);

        Self {
            attributes,
            disabled,
        }
    }

    /// Returns the current value of an attribute by native name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns true if the index is disabled.
    #[must_use]
    pub const fn disabled(&self) -> bool {
        self.disabled
    }
}

/// Renders a scalar JSON value the way Splunk stores it in `indexes.conf`.
fn canonical_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_u64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "t" | "yes"),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_content_canonicalizes() {
        let content = json!({
            "homePath": "$SPLUNK_DB/web/db",
            "maxTotalDataSizeMB": 800,
            "homePath.maxDataSizeMB": 0,
            "disabled": false,
            "eai:acl": { "app": "search" },
        });

        let state = ActualState::from_content(content.as_object().unwrap());
        assert_eq!(state.get("maxTotalDataSizeMB"), Some("800"));
        assert_eq!(state.get("homePath.maxDataSizeMB"), Some("0"));
        assert_eq!(state.get("disabled"), Some("0"));
        assert_eq!(state.get("eai:acl"), None);
        assert!(!state.disabled());
    }

    #[test]
    fn test_disabled_string_forms() {
        for (raw, expected) in [("1", true), ("0", false), ("true", true), ("false", false)] {
            let content = json!({ "disabled": raw });
            let state = ActualState::from_content(content.as_object().unwrap());
            assert_eq!(state.disabled(), expected, "disabled = {raw}");
        }
    }

    #[test]
    fn test_parse_feed() {
        let body = r#"{"entry":[{"name":"web","content":{"frozenTimePeriodInSecs":"3600","disabled":true}}]}"#;
        let feed: Feed = serde_json::from_str(body).unwrap();
        let state = ActualState::from_content(&feed.entry[0].content);
        assert_eq!(state.get("frozenTimePeriodInSecs"), Some("3600"));
        assert!(state.disabled());
    }
}
