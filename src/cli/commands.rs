//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{IndexParams, IndexState};

/// splunk-index - Declarative Splunk index manager.
#[derive(Parser, Debug)]
#[command(name = "splunk-index")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a YAML or JSON parameter file.
    #[arg(short, long, global = true, env = "SPLUNK_INDEX_PARAMS")]
    pub params: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Log format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile the index to the desired state.
    Apply {
        /// Only report, never connect or change anything.
        #[arg(long)]
        check: bool,

        /// Index parameters.
        #[command(flatten)]
        index: IndexArgs,
    },

    /// Show the current state of the index.
    Status {
        /// Index parameters.
        #[command(flatten)]
        index: IndexArgs,
    },

    /// Validate parameters without contacting Splunk.
    Validate {
        /// Index parameters.
        #[command(flatten)]
        index: IndexArgs,
    },
}

/// Index and connection parameters accepted on the command line.
///
/// Every flag is optional here; values missing from the command line may
/// come from the parameter file.
#[derive(Args, Debug, Default, Clone)]
pub struct IndexArgs {
    /// Index name.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Splunk host.
    #[arg(long, env = "SPLUNK_HOST")]
    pub host: Option<String>,

    /// Splunk management port.
    #[arg(long, env = "SPLUNK_PORT")]
    pub port: Option<u16>,

    /// Splunk user.
    #[arg(short, long, env = "SPLUNK_USERNAME")]
    pub username: Option<String>,

    /// Splunk password.
    #[arg(long, env = "SPLUNK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Connection scheme (http, https).
    #[arg(long, env = "SPLUNK_SCHEME")]
    pub scheme: Option<String>,

    /// Splunk version, e.g. 8.1.0.
    #[arg(long, env = "SPLUNK_VERSION")]
    pub splunk_version: Option<String>,

    /// Verify the server TLS certificate (true, false).
    #[arg(long)]
    pub verify_tls: Option<bool>,

    /// Hot/warm bucket path (creation time only).
    #[arg(long)]
    pub home_path: Option<String>,

    /// Maximum size of the home path in MB.
    #[arg(long)]
    pub home_path_max_data_size_mb: Option<String>,

    /// Cold bucket path (creation time only).
    #[arg(long)]
    pub cold_path: Option<String>,

    /// Maximum size of the cold path in MB.
    #[arg(long)]
    pub cold_path_max_data_size_mb: Option<String>,

    /// Maximum total index size in MB.
    #[arg(long)]
    pub max_total_data_size_mb: Option<String>,

    /// Retention in seconds.
    #[arg(long)]
    pub retention: Option<String>,

    /// Owning app (creation time only).
    #[arg(long)]
    pub app: Option<String>,

    /// Desired disabled flag (true, false).
    #[arg(long)]
    pub disabled: Option<bool>,

    /// Discard all index data (destructive, applied on every run).
    #[arg(long)]
    pub clean: bool,

    /// Desired presence of the index.
    #[arg(long)]
    pub state: Option<IndexState>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// Log format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable log lines.
    #[default]
    Text,
    /// One JSON object per log line.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl From<IndexArgs> for IndexParams {
    fn from(args: IndexArgs) -> Self {
        Self {
            name: args.name,
            host: args.host,
            port: args.port,
            username: args.username,
            password: args.password,
            scheme: args.scheme,
            version: args.splunk_version,
            verify_tls: args.verify_tls,
            home_path: args.home_path,
            home_path_max_data_size_mb: args.home_path_max_data_size_mb,
            cold_path: args.cold_path,
            cold_path_max_data_size_mb: args.cold_path_max_data_size_mb,
            max_total_data_size_mb: args.max_total_data_size_mb,
            retention: args.retention,
            app: args.app,
            disabled: args.disabled,
            clean: args.clean.then_some(true),
            state: args.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "splunk-index",
            "apply",
            "--name",
            "web",
            "--password",
            "changeme",
            "--splunk-version",
            "8.1.0",
            "--retention",
            "7200",
            "--disabled",
            "true",
            "--state",
            "present",
        ])
        .unwrap();

        let Commands::Apply { check, index } = cli.command else {
            panic!("expected apply");
        };
        assert!(!check);

        let params = IndexParams::from(index);
        assert_eq!(params.name.as_deref(), Some("web"));
        assert_eq!(params.retention.as_deref(), Some("7200"));
        assert_eq!(params.disabled, Some(true));
        assert_eq!(params.clean, None);
        assert_eq!(params.state, Some(IndexState::Present));
    }

    #[test]
    fn test_parse_check_mode() {
        let cli = Cli::try_parse_from(["splunk-index", "apply", "--check", "--clean"]).unwrap();
        let Commands::Apply { check, index } = cli.command else {
            panic!("expected apply");
        };
        assert!(check);
        assert_eq!(IndexParams::from(index).clean, Some(true));
    }

    #[test]
    fn test_verify_tls_flag_overrides_file() {
        let cli = Cli::try_parse_from(["splunk-index", "status", "--verify-tls", "false"]).unwrap();
        let Commands::Status { index } = cli.command else {
            panic!("expected status");
        };

        let file = IndexParams {
            verify_tls: Some(true),
            ..IndexParams::default()
        };
        let merged = file.merge(IndexParams::from(index));
        assert_eq!(merged.verify_tls, Some(false));
    }

    #[test]
    fn test_verify_tls_unset_keeps_file_value() {
        let cli = Cli::try_parse_from(["splunk-index", "status"]).unwrap();
        let Commands::Status { index } = cli.command else {
            panic!("expected status");
        };

        let file = IndexParams {
            verify_tls: Some(true),
            ..IndexParams::default()
        };
        assert_eq!(file.merge(IndexParams::from(index)).verify_tls, Some(true));
    }

    #[test]
    fn test_parse_rejects_unknown_state() {
        assert!(Cli::try_parse_from(["splunk-index", "apply", "--state", "gone"]).is_err());
    }
}
