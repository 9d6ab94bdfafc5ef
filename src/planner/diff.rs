//! Diff engine for comparing desired vs actual index attributes.
//!
//! This module computes the update set: the mutable desired attributes
//! whose value differs from what Splunk currently reports.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::config::DesiredConfig;
use crate::splunk::ActualState;

/// Engine for computing attribute diffs.
#[derive(Debug, Default)]
pub struct DiffEngine;

/// Before/after values of a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeChange {
    /// Native attribute name.
    #[serde(skip)]
    pub attribute: String,
    /// Value before the change, `None` if it was not set.
    pub before: Option<String>,
    /// Value after the change, `None` if it was removed.
    pub after: Option<String>,
}

/// Attributes that must be sent in a single update call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSet {
    /// Changed attributes in name order.
    pub changes: Vec<AttributeChange>,
}

impl DiffEngine {
    /// Creates a new diff engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the update set for an existing index.
    ///
    /// Creation-time-only attributes never appear in the result. An attribute
    /// missing from `actual` counts as different. Values are compared as
    /// strings without coercion.
    #[must_use]
    pub fn compute_update_set(&self, desired: &DesiredConfig, actual: &ActualState) -> UpdateSet {
        let changes: Vec<AttributeChange> = desired
            .mutable_only()
            .iter()
            .filter_map(|(name, value)| {
                let current = actual.get(name);
                if current == Some(value) {
                    None
                } else {
                    debug!("Attribute {name} differs: {current:?} -> {value}");
                    Some(AttributeChange {
                        attribute: name.to_string(),
                        before: current.map(String::from),
                        after: Some(value.to_string()),
                    })
                }
            })
            .collect();

        debug!("Update set holds {} attributes", changes.len());
        UpdateSet { changes }
    }
}

impl AttributeChange {
    /// Creates a change for an attribute set at creation time.
    #[must_use]
    pub fn created(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            before: None,
            after: Some(value.into()),
        }
    }
}

impl UpdateSet {
    /// Returns true if nothing needs updating.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the attribute map to send to Splunk.
    #[must_use]
    pub fn to_attributes(&self) -> BTreeMap<String, String> {
        self.changes
            .iter()
            .filter_map(|c| c.after.clone().map(|v| (c.attribute.clone(), v)))
            .collect()
    }
}

impl fmt::Display for AttributeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.attribute,
            self.before.as_deref().unwrap_or("(unset)"),
            self.after.as_deref().unwrap_or("(unset)")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actual(pairs: &[(&str, &str)]) -> ActualState {
        ActualState::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            false,
        )
    }

    #[test]
    fn test_partial_config_update() {
        let actual = actual(&[("maxTotalDataSizeMB", "800"), ("frozenTimePeriodInSecs", "3600")]);
        let desired = DesiredConfig::new()
            .with("maxTotalDataSizeMB", "800")
            .with("frozenTimePeriodInSecs", "7200");

        let update = DiffEngine::new().compute_update_set(&desired, &actual);

        let expected = BTreeMap::from([(
            String::from("frozenTimePeriodInSecs"),
            String::from("7200"),
        )]);
        assert_eq!(update.to_attributes(), expected);
        assert_eq!(update.changes[0].before.as_deref(), Some("3600"));
    }

    #[test]
    fn test_immutables_never_in_update_set() {
        let actual = actual(&[("homePath", "/old"), ("coldPath", "/old-cold")]);
        let desired = DesiredConfig::new()
            .with("homePath", "/new")
            .with("coldPath", "/new-cold")
            .with("app", "search");

        let update = DiffEngine::new().compute_update_set(&desired, &actual);
        assert!(update.is_empty());
    }

    #[test]
    fn test_missing_actual_attribute_differs() {
        let desired = DesiredConfig::new().with("coldPath.maxDataSizeMB", "0");
        let update = DiffEngine::new().compute_update_set(&desired, &actual(&[]));

        assert_eq!(update.changes.len(), 1);
        assert_eq!(update.changes[0].before, None);
    }

    #[test]
    fn test_no_coercion() {
        let actual = actual(&[("maxTotalDataSizeMB", "800")]);
        let desired = DesiredConfig::new().with("maxTotalDataSizeMB", "0800");

        let update = DiffEngine::new().compute_update_set(&desired, &actual);
        assert_eq!(update.changes.len(), 1);
    }
}
