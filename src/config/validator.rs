//! Parameter validation.
//!
//! Everything here runs before the first remote call, so a bad parameter
//! never reaches Splunk.

use crate::error::{ConfigError, Result, SplunkIndexError};
use tracing::debug;

use super::builder::Attribute;
use super::spec::{IndexParams, IndexState, Scheme, SplunkVersion};

/// Substring Splunk reserves and refuses in index names.
const RESERVED_NAME_FRAGMENT: &str = "kvstore";

/// Validator for index parameters.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates the parameters of one invocation.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure. Scheme and version problems
    /// surface as their dedicated [`ConfigError`] variants.
    pub fn validate(&self, params: &IndexParams) -> Result<ValidationResult> {
        if let Some(scheme) = params.scheme.as_deref() {
            scheme.parse::<Scheme>()?;
        }
        if let Some(version) = params.version.as_deref() {
            version.parse::<SplunkVersion>()?;
        }

        let mut result = ValidationResult::default();

        Self::validate_required(params, &mut result);
        Self::validate_name(params, &mut result);
        Self::validate_connection(params, &mut result);
        Self::validate_attributes(params, &mut result);
        Self::collect_warnings(params, &mut result);

        if result.errors.is_empty() {
            debug!("Parameter validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(SplunkIndexError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }))
        }
    }

    /// Checks that required parameters are present.
    fn validate_required(params: &IndexParams, result: &mut ValidationResult) {
        let required = [
            ("name", params.name.is_some()),
            ("password", params.password.is_some()),
            ("version", params.version.is_some()),
        ];

        for (field, present) in required {
            if !present {
                result.errors.push(ValidationError {
                    field: field.to_string(),
                    message: format!("Parameter '{field}' is required"),
                });
            }
        }
    }

    /// Validates the index name.
    fn validate_name(params: &IndexParams, result: &mut ValidationResult) {
        let Some(name) = params.name.as_deref() else {
            return;
        };

        if !is_valid_index_name(name) {
            result.errors.push(ValidationError {
                field: String::from("name"),
                message: format!(
                    "Index name '{name}' is invalid. Use lowercase letters, digits, \
                     underscores and hyphens, not starting with '_' or '-'."
                ),
            });
        } else if name.contains(RESERVED_NAME_FRAGMENT) {
            result.errors.push(ValidationError {
                field: String::from("name"),
                message: format!("Index name '{name}' must not contain '{RESERVED_NAME_FRAGMENT}'"),
            });
        }
    }

    /// Validates host and port.
    fn validate_connection(params: &IndexParams, result: &mut ValidationResult) {
        if params.host.as_deref().is_some_and(|h| h.trim().is_empty()) {
            result.errors.push(ValidationError {
                field: String::from("host"),
                message: String::from("Host cannot be empty"),
            });
        }

        if params.port == Some(0) {
            result.errors.push(ValidationError {
                field: String::from("port"),
                message: String::from("Port must be between 1 and 65535"),
            });
        }

        if params.password.as_deref().is_some_and(str::is_empty) {
            result.errors.push(ValidationError {
                field: String::from("password"),
                message: String::from("Password cannot be empty"),
            });
        }
    }

    /// Validates numeric index attributes.
    fn validate_attributes(params: &IndexParams, result: &mut ValidationResult) {
        for attribute in Attribute::ALL.into_iter().filter(|a| a.is_numeric()) {
            let Some(value) = attribute.value(params) else {
                continue;
            };
            if value.parse::<u64>().is_err() {
                result.errors.push(ValidationError {
                    field: attribute.param_name().to_string(),
                    message: format!(
                        "'{}' must be a non-negative integer, got '{value}'",
                        attribute.param_name()
                    ),
                });
            }
        }
    }

    /// Collects non-fatal warnings.
    fn collect_warnings(params: &IndexParams, result: &mut ValidationResult) {
        let absent = params.intent() == IndexState::Absent;

        if absent {
            let ignored: Vec<&str> = Attribute::ALL
                .into_iter()
                .filter(|a| a.value(params).is_some())
                .map(Attribute::param_name)
                .collect();
            if !ignored.is_empty() {
                result.warnings.push(format!(
                    "Attributes ignored because state is absent: {}",
                    ignored.join(", ")
                ));
            }
            if params.disabled.is_some() || params.clean.is_some() {
                result
                    .warnings
                    .push(String::from("'disabled' and 'clean' are ignored because state is absent"));
            }
        } else if params.clean == Some(true) {
            result.warnings.push(String::from(
                "'clean' discards all index data and is applied on every run",
            ));
        }
    }
}

/// Checks if an index name only uses characters Splunk accepts.
fn is_valid_index_name(name: &str) -> bool {
    let Some(first) = name.chars().next() else {
        return false;
    };

    if first == '_' || first == '-' {
        return false;
    }

    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_params() -> IndexParams {
        IndexParams {
            name: Some(String::from("web_logs")),
            password: Some(String::from("changeme")),
            version: Some(String::from("8.1.0")),
            ..IndexParams::default()
        }
    }

    #[test]
    fn test_valid_index_name() {
        assert!(is_valid_index_name("main"));
        assert!(is_valid_index_name("web_logs-2"));
        assert!(is_valid_index_name("0day"));
    }

    #[test]
    fn test_invalid_index_name() {
        assert!(!is_valid_index_name(""));
        assert!(!is_valid_index_name("_internal"));
        assert!(!is_valid_index_name("-web"));
        assert!(!is_valid_index_name("Web"));
        assert!(!is_valid_index_name("web logs"));
    }

    #[test]
    fn test_valid_params_pass() {
        let result = ConfigValidator::new().validate(&valid_params()).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_reserved_name_rejected() {
        let params = IndexParams {
            name: Some(String::from("my_kvstore")),
            ..valid_params()
        };
        assert!(ConfigValidator::new().validate(&params).is_err());
    }

    #[test]
    fn test_unsupported_scheme() {
        let params = IndexParams {
            scheme: Some(String::from("ftp")),
            ..valid_params()
        };
        let err = ConfigValidator::new().validate(&params).unwrap_err();
        assert!(matches!(
            err,
            SplunkIndexError::Config(ConfigError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_missing_password() {
        let params = IndexParams {
            password: None,
            ..valid_params()
        };
        let err = ConfigValidator::new().validate(&params).unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_non_numeric_size_rejected() {
        let params = IndexParams {
            max_total_data_size_mb: Some(String::from("big")),
            ..valid_params()
        };
        let err = ConfigValidator::new().validate(&params).unwrap_err();
        assert!(matches!(
            err,
            SplunkIndexError::Config(ConfigError::ValidationError { field: Some(ref f), .. })
                if f == "maxTotalDataSizeMB"
        ));
    }

    #[test]
    fn test_clean_warns() {
        let params = IndexParams {
            clean: Some(true),
            ..valid_params()
        };
        let result = ConfigValidator::new().validate(&params).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_absent_with_attributes_warns() {
        let params = IndexParams {
            state: Some(IndexState::Absent),
            home_path: Some(String::from("/data/web")),
            ..valid_params()
        };
        let result = ConfigValidator::new().validate(&params).unwrap();
        assert!(result.warnings[0].contains("homePath"));
    }
}
