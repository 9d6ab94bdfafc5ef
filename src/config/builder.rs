//! Desired-state construction.
//!
//! Translates the caller vocabulary of [`IndexParams`] into Splunk's native
//! attribute names. A parameter contributes an attribute only when it was
//! supplied; an absent parameter means the attribute is not managed.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::spec::IndexParams;

/// A managed index attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    /// Hot/warm bucket path.
    HomePath,
    /// Maximum size of the home path.
    HomePathMaxDataSizeMb,
    /// Cold bucket path.
    ColdPath,
    /// Maximum size of the cold path.
    ColdPathMaxDataSizeMb,
    /// Maximum total index size.
    MaxTotalDataSizeMb,
    /// Retention before buckets are frozen.
    Retention,
    /// Owning app namespace.
    App,
}

impl Attribute {
    /// Every managed attribute, in translation-table order.
    pub const ALL: [Self; 7] = [
        Self::HomePath,
        Self::HomePathMaxDataSizeMb,
        Self::ColdPath,
        Self::ColdPathMaxDataSizeMb,
        Self::MaxTotalDataSizeMb,
        Self::Retention,
        Self::App,
    ];

    /// Name used by callers.
    #[must_use]
    pub const fn param_name(self) -> &'static str {
        match self {
            Self::HomePath => "homePath",
            Self::HomePathMaxDataSizeMb => "homePath_maxDataSizeMB",
            Self::ColdPath => "coldPath",
            Self::ColdPathMaxDataSizeMb => "coldPath_maxDataSizeMB",
            Self::MaxTotalDataSizeMb => "maxTotalDataSizeMB",
            Self::Retention => "retention",
            Self::App => "app",
        }
    }

    /// Name Splunk uses for the attribute.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::HomePath => "homePath",
            Self::HomePathMaxDataSizeMb => "homePath.maxDataSizeMB",
            Self::ColdPath => "coldPath",
            Self::ColdPathMaxDataSizeMb => "coldPath.maxDataSizeMB",
            Self::MaxTotalDataSizeMb => "maxTotalDataSizeMB",
            Self::Retention => "frozenTimePeriodInSecs",
            Self::App => "app",
        }
    }

    /// Splunk only honors these at creation time.
    #[must_use]
    pub const fn is_immutable(self) -> bool {
        matches!(self, Self::HomePath | Self::ColdPath | Self::App)
    }

    /// Whether the value must be an unsigned integer.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::HomePathMaxDataSizeMb
                | Self::ColdPathMaxDataSizeMb
                | Self::MaxTotalDataSizeMb
                | Self::Retention
        )
    }

    /// Returns the value supplied for this attribute, if any.
    #[must_use]
    pub fn value(self, params: &IndexParams) -> Option<&str> {
        match self {
            Self::HomePath => params.home_path.as_deref(),
            Self::HomePathMaxDataSizeMb => params.home_path_max_data_size_mb.as_deref(),
            Self::ColdPath => params.cold_path.as_deref(),
            Self::ColdPathMaxDataSizeMb => params.cold_path_max_data_size_mb.as_deref(),
            Self::MaxTotalDataSizeMb => params.max_total_data_size_mb.as_deref(),
            Self::Retention => params.retention.as_deref(),
            Self::App => params.app.as_deref(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.native_name())
    }
}

/// Native attribute names that are only legal at creation time.
#[must_use]
pub fn immutable_attributes() -> impl Iterator<Item = &'static str> {
    Attribute::ALL
        .into_iter()
        .filter(|a| a.is_immutable())
        .map(Attribute::native_name)
}

/// Desired attribute values keyed by native name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DesiredConfig {
    attributes: BTreeMap<String, String>,
}

impl DesiredConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attributes: BTreeMap::new(),
        }
    }

    /// Sets an attribute by native name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Returns the desired value of an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Iterates over `(native name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns true if no attribute is managed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Number of managed attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns a copy without the creation-time-only attributes.
    #[must_use]
    pub fn mutable_only(&self) -> Self {
        let immutable: Vec<&str> = immutable_attributes().collect();
        Self {
            attributes: self
                .attributes
                .iter()
                .filter(|(k, _)| !immutable.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Returns the full attribute map.
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

/// Everything the reconciler needs to converge one index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredState {
    /// Managed attribute values.
    pub config: DesiredConfig,
    /// Requested disabled flag, `None` when not managed.
    pub disabled: Option<bool>,
    /// Purge index data on this run.
    pub clean: bool,
}

impl DesiredState {
    /// Creates a desired state managing only attributes.
    #[must_use]
    pub const fn new(config: DesiredConfig) -> Self {
        Self {
            config,
            disabled: None,
            clean: false,
        }
    }

    /// Sets the requested disabled flag.
    #[must_use]
    pub const fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    /// Requests a clean.
    #[must_use]
    pub const fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }
}

/// Builds a [`DesiredState`] from raw parameters.
#[derive(Debug, Default)]
pub struct DesiredStateBuilder;

impl DesiredStateBuilder {
    /// Creates a new builder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the desired state. Performs no I/O.
    #[must_use]
    pub fn build(&self, params: &IndexParams) -> DesiredState {
        let config = Attribute::ALL
            .into_iter()
            .filter_map(|attribute| {
                attribute
                    .value(params)
                    .map(|value| (attribute.native_name(), value))
            })
            .fold(DesiredConfig::new(), |config, (name, value)| {
                config.with(name, value)
            });

        debug!("Desired configuration manages {} attributes", config.len());

        DesiredState {
            config,
            disabled: params.disabled,
            clean: params.clean.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_dropped() {
        let params = IndexParams {
            name: Some(String::from("web")),
            max_total_data_size_mb: Some(String::from("800")),
            ..IndexParams::default()
        };

        let desired = DesiredStateBuilder::new().build(&params);
        assert_eq!(desired.config.len(), 1);
        assert_eq!(desired.config.get("maxTotalDataSizeMB"), Some("800"));
        assert_eq!(desired.disabled, None);
        assert!(!desired.clean);
    }

    #[test]
    fn test_zero_and_empty_values_are_kept() {
        let params = IndexParams {
            home_path_max_data_size_mb: Some(String::from("0")),
            cold_path: Some(String::new()),
            disabled: Some(false),
            ..IndexParams::default()
        };

        let desired = DesiredStateBuilder::new().build(&params);
        assert_eq!(desired.config.get("homePath.maxDataSizeMB"), Some("0"));
        assert_eq!(desired.config.get("coldPath"), Some(""));
        assert_eq!(desired.disabled, Some(false));
    }

    #[test]
    fn test_friendly_names_translate() {
        let params = IndexParams {
            retention: Some(String::from("7200")),
            cold_path_max_data_size_mb: Some(String::from("100")),
            ..IndexParams::default()
        };

        let desired = DesiredStateBuilder::new().build(&params);
        assert_eq!(desired.config.get("frozenTimePeriodInSecs"), Some("7200"));
        assert_eq!(desired.config.get("coldPath.maxDataSizeMB"), Some("100"));
        assert_eq!(desired.config.get("retention"), None);
    }

    #[test]
    fn test_mutable_only_strips_immutables() {
        let config = DesiredConfig::new()
            .with("homePath", "/a")
            .with("coldPath", "/b")
            .with("app", "search")
            .with("maxTotalDataSizeMB", "800");

        let mutable = config.mutable_only();
        assert_eq!(mutable.len(), 1);
        assert_eq!(mutable.get("maxTotalDataSizeMB"), Some("800"));
    }

    #[test]
    fn test_attribute_lookup() {
        assert_eq!(Attribute::Retention.native_name(), "frozenTimePeriodInSecs");
        assert_eq!(Attribute::Retention.param_name(), "retention");
        let immutable: Vec<&str> = immutable_attributes().collect();
        assert_eq!(immutable, vec!["homePath", "coldPath", "app"]);
    }
}
