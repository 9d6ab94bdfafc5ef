//! Parameter loading.
//!
//! Parameters come from an optional YAML or JSON file, with command-line
//! values taking precedence field by field.

use crate::error::{ConfigError, Result, SplunkIndexError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::IndexParams;

/// Parser for loading index parameters.
#[derive(Debug, Default)]
pub struct ParamsParser {
    /// Base path for locating the `.env` file.
    base_path: Option<PathBuf>,
}

impl ParamsParser {
    /// Creates a new parameter parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path used to find `.env`.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads parameters from a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<IndexParams> {
        let path = path.as_ref();
        info!("Loading parameters from: {}", path.display());

        if !path.exists() {
            return Err(SplunkIndexError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            SplunkIndexError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_str(&content, Some(path))
    }

    /// Parses parameters from a YAML (or JSON) string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is invalid.
    pub fn parse_str(&self, content: &str, source: Option<&Path>) -> Result<IndexParams> {
        debug!("Parsing parameter document");

        let params: IndexParams = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            SplunkIndexError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        if let Some(name) = params.name.as_deref() {
            debug!("Parsed parameters for index: {name}");
        }
        Ok(params)
    }

    /// Loads the optional parameter file and overlays `overrides` on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is given but cannot be loaded.
    pub fn load(&self, file: Option<&Path>, overrides: IndexParams) -> Result<IndexParams> {
        let base = match file {
            Some(path) => self.load_file(path)?,
            None => IndexParams::default(),
        };
        Ok(base.merge(overrides))
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                SplunkIndexError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}
