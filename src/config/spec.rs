//! Parameter types for an index reconciliation run.
//!
//! [`IndexParams`] mirrors the caller vocabulary one-to-one: every field is
//! optional so that a parameter file and command-line flags can be merged
//! field-by-field before validation. [`ConnectionParameters`] is the
//! validated, immutable connection description handed to the client.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, Result};

/// Default Splunk host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default Splunk management port.
pub const DEFAULT_PORT: u16 = 8089;

/// Default Splunk user.
pub const DEFAULT_USERNAME: &str = "admin";

/// Default connection scheme.
pub const DEFAULT_SCHEME: &str = "https";

/// Raw, unvalidated parameters for one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct IndexParams {
    /// Index name (required).
    #[serde(default)]
    pub name: Option<String>,
    /// Splunk host.
    #[serde(default)]
    pub host: Option<String>,
    /// Splunk management port.
    #[serde(default)]
    pub port: Option<u16>,
    /// Splunk user.
    #[serde(default)]
    pub username: Option<String>,
    /// Splunk password (required).
    #[serde(default)]
    pub password: Option<String>,
    /// Connection scheme, `http` or `https`.
    #[serde(default)]
    pub scheme: Option<String>,
    /// Splunk version (required). Must be quoted in YAML unless it is a bare major.
    #[serde(default, deserialize_with = "version_text")]
    pub version: Option<String>,
    /// Verify the server TLS certificate.
    #[serde(default)]
    pub verify_tls: Option<bool>,
    /// Hot/warm bucket path. Creation time only.
    #[serde(default, rename = "homePath")]
    pub home_path: Option<String>,
    /// Maximum size of the home path in MB.
    #[serde(default, rename = "homePath_maxDataSizeMB", deserialize_with = "string_or_number")]
    pub home_path_max_data_size_mb: Option<String>,
    /// Cold bucket path. Creation time only.
    #[serde(default, rename = "coldPath")]
    pub cold_path: Option<String>,
    /// Maximum size of the cold path in MB.
    #[serde(default, rename = "coldPath_maxDataSizeMB", deserialize_with = "string_or_number")]
    pub cold_path_max_data_size_mb: Option<String>,
    /// Maximum total index size in MB.
    #[serde(default, rename = "maxTotalDataSizeMB", deserialize_with = "string_or_number")]
    pub max_total_data_size_mb: Option<String>,
    /// Retention in seconds.
    #[serde(default, deserialize_with = "string_or_number")]
    pub retention: Option<String>,
    /// App namespace owning the index. Creation time only.
    #[serde(default)]
    pub app: Option<String>,
    /// Desired disabled flag.
    #[serde(default)]
    pub disabled: Option<bool>,
    /// Purge all index data.
    #[serde(default)]
    pub clean: Option<bool>,
    /// Desired presence of the index.
    #[serde(default)]
    pub state: Option<IndexState>,
}

/// Desired presence of the index.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    /// The index must exist and match the desired configuration.
    #[default]
    Present,
    /// The index must not exist.
    Absent,
}

/// Connection scheme for the management API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    #[default]
    Https,
}

/// A parsed Splunk version.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplunkVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

/// Validated connection settings. Immutable for the lifetime of one invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    /// Splunk host.
    pub host: String,
    /// Management port.
    pub port: u16,
    /// Splunk user.
    pub username: String,
    /// Splunk password.
    pub password: String,
    /// Connection scheme.
    pub scheme: Scheme,
    /// Target Splunk version.
    pub version: SplunkVersion,
    /// Verify the server TLS certificate.
    pub verify_tls: bool,
}

impl IndexParams {
    /// Overlays every field set in `overrides` on top of `self`.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            name: overrides.name.or(self.name),
            host: overrides.host.or(self.host),
            port: overrides.port.or(self.port),
            username: overrides.username.or(self.username),
            password: overrides.password.or(self.password),
            scheme: overrides.scheme.or(self.scheme),
            version: overrides.version.or(self.version),
            verify_tls: overrides.verify_tls.or(self.verify_tls),
            home_path: overrides.home_path.or(self.home_path),
            home_path_max_data_size_mb: overrides
                .home_path_max_data_size_mb
                .or(self.home_path_max_data_size_mb),
            cold_path: overrides.cold_path.or(self.cold_path),
            cold_path_max_data_size_mb: overrides
                .cold_path_max_data_size_mb
                .or(self.cold_path_max_data_size_mb),
            max_total_data_size_mb: overrides
                .max_total_data_size_mb
                .or(self.max_total_data_size_mb),
            retention: overrides.retention.or(self.retention),
            app: overrides.app.or(self.app),
            disabled: overrides.disabled.or(self.disabled),
            clean: overrides.clean.or(self.clean),
            state: overrides.state.or(self.state),
        }
    }

    /// Returns the requested intent, defaulting to present.
    #[must_use]
    pub fn intent(&self) -> IndexState {
        self.state.unwrap_or_default()
    }

    /// Returns the index name.
    ///
    /// # Errors
    ///
    /// Returns an error if no name was supplied.
    pub fn index_name(&self) -> Result<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| ConfigError::missing("name").into())
    }

    /// Builds the connection parameters, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the password or version is missing, the scheme is
    /// unsupported, or the version cannot be parsed.
    pub fn connection(&self) -> Result<ConnectionParameters> {
        let password = self
            .password
            .clone()
            .ok_or_else(|| ConfigError::missing("password"))?;
        let version: SplunkVersion = self
            .version
            .as_deref()
            .ok_or_else(|| ConfigError::missing("version"))?
            .parse()?;
        let scheme: Scheme = self.scheme.as_deref().unwrap_or(DEFAULT_SCHEME).parse()?;

        Ok(ConnectionParameters {
            host: self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            username: self
                .username
                .clone()
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            password,
            scheme,
            version,
            verify_tls: self.verify_tls.unwrap_or(false),
        })
    }
}

impl ConnectionParameters {
    /// Returns the management API base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("scheme", &self.scheme)
            .field("version", &self.version)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

impl FromStr for Scheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(ConfigError::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

impl FromStr for SplunkVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidVersion {
            version: s.to_string(),
        };

        let mut parts = [0u32; 3];
        let mut count = 0;
        for segment in s.trim().split('.') {
            if count == parts.len() {
                return Err(invalid());
            }
            parts[count] = segment.parse().map_err(|_| invalid())?;
            count += 1;
        }

        Ok(Self {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
        })
    }
}

impl fmt::Display for SplunkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// A scalar parameter as written in the parameter file.
#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

/// Accepts either a YAML string or a number and keeps its text.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    }))
}

/// Like [`string_or_number`], but refuses floats: `9.10` would read back as `9.1`.
fn version_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Float(n)) => Err(D::Error::custom(format!(
            "version {n} is not exact, quote it (e.g. version: \"{n}\")"
        ))),
        Some(Raw::Text(s)) => Ok(Some(s)),
        Some(Raw::Unsigned(n)) => Ok(Some(n.to_string())),
        Some(Raw::Signed(n)) => Ok(Some(n.to_string())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let version: SplunkVersion = "8.1.0".parse().unwrap();
        assert_eq!(version.major, 8);
        assert_eq!(version.minor, 1);

        let short: SplunkVersion = "9".parse().unwrap();
        assert_eq!(short.to_string(), "9.0.0");
    }

    #[test]
    fn test_version_invalid() {
        assert!("".parse::<SplunkVersion>().is_err());
        assert!("8.x".parse::<SplunkVersion>().is_err());
        assert!("8.1.0.1".parse::<SplunkVersion>().is_err());
    }

    #[test]
    fn test_scheme_parse() {
        assert_eq!("http".parse::<Scheme>().unwrap(), Scheme::Http);
        assert!(matches!(
            "ftp".parse::<Scheme>(),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_connection_defaults() {
        let params = IndexParams {
            name: Some(String::from("web")),
            password: Some(String::from("changeme")),
            version: Some(String::from("8.1.0")),
            ..IndexParams::default()
        };

        let connection = params.connection().unwrap();
        assert_eq!(connection.base_url(), "https://localhost:8089");
        assert_eq!(connection.username, "admin");
        assert!(!connection.verify_tls);
        assert!(!format!("{connection:?}").contains("changeme"));
    }

    #[test]
    fn test_connection_requires_password() {
        let params = IndexParams {
            version: Some(String::from("8.1.0")),
            ..IndexParams::default()
        };
        let err = params.connection().unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = IndexParams {
            name: Some(String::from("web")),
            retention: Some(String::from("3600")),
            ..IndexParams::default()
        };
        let cli = IndexParams {
            retention: Some(String::from("7200")),
            ..IndexParams::default()
        };

        let merged = file.merge(cli);
        assert_eq!(merged.name.as_deref(), Some("web"));
        assert_eq!(merged.retention.as_deref(), Some("7200"));
    }
}
