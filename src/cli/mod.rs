//! CLI module for the splunk-index tool.
//!
//! This module provides the command-line front end: argument definitions
//! and result formatting.

mod commands;
mod output;

pub use commands::{Cli, Commands, IndexArgs, LogFormat, OutputFormat};
pub use output::OutputFormatter;
