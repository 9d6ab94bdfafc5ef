//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{Attribute, ValidationResult};
use crate::planner::ActionType;
use crate::report::ReconciliationResult;
use crate::splunk::ActualState;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Attribute change row for table display.
#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Attribute")]
    attribute: String,
    #[tabled(rename = "Before")]
    before: String,
    #[tabled(rename = "After")]
    after: String,
}

/// Attribute row for status display.
#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "Parameter")]
    parameter: String,
    #[tabled(rename = "Attribute")]
    attribute: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a reconciliation result.
    #[must_use]
    pub fn format_result(&self, result: &ReconciliationResult) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_default(),
            OutputFormat::Text => Self::format_result_text(result),
        }
    }

    /// Formats a result as text.
    fn format_result_text(result: &ReconciliationResult) -> String {
        if !result.changed {
            return format!(
                "{} Index '{}' is up to date ({}).\n",
                "✓".green(),
                result.index,
                result.state
            );
        }

        let actions: Vec<String> = result
            .actions
            .iter()
            .map(|a| Self::format_action_type(*a))
            .collect();

        let mut output = format!(
            "{} Index '{}' changed: {}\n",
            "~".yellow(),
            result.index,
            actions.join(", ")
        );

        let rows: Vec<ChangeRow> = result
            .changed_state
            .iter()
            .map(|(attribute, change)| ChangeRow {
                attribute: attribute.clone(),
                before: change.before.clone().unwrap_or_else(|| String::from("-")),
                after: change.after.clone().unwrap_or_else(|| String::from("-")),
            })
            .collect();

        if !rows.is_empty() {
            output.push('\n');
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        for action in result.actions.iter().filter(|a| a.is_destructive()) {
            let _ = write!(
                output,
                "\n{} {action}: all data in index '{}' was discarded.\n",
                "⚠".yellow(),
                result.index
            );
        }

        output
    }

    /// Formats the current state of an index.
    #[must_use]
    pub fn format_status(&self, name: &str, state: Option<&ActualState>) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = state.map_or_else(
                    || serde_json::json!({ "index": name, "exists": false }),
                    |s| {
                        let attributes: serde_json::Map<String, serde_json::Value> =
                            Self::managed_attributes(s)
                                .into_iter()
                                .map(|(a, v)| (a.native_name().to_string(), v))
                                .collect();
                        serde_json::json!({
                            "index": name,
                            "exists": true,
                            "disabled": s.disabled(),
                            "attributes": attributes,
                        })
                    },
                );
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_status_text(name, state),
        }
    }

    /// Formats status as text.
    fn format_status_text(name: &str, state: Option<&ActualState>) -> String {
        let Some(state) = state else {
            return format!("{} Index '{name}' does not exist.\n", "✗".red());
        };

        let enabled = if state.disabled() {
            "disabled".red().to_string()
        } else {
            "enabled".green().to_string()
        };
        let mut output = format!("\nIndex: {name} ({enabled})\n\n");

        let rows: Vec<AttributeRow> = Self::managed_attributes(state)
            .into_iter()
            .map(|(attribute, value)| AttributeRow {
                parameter: attribute.param_name().to_string(),
                attribute: attribute.native_name().to_string(),
                value: value.as_str().map_or_else(|| String::from("-"), String::from),
            })
            .collect();

        output.push_str(&Table::new(rows).to_string());
        output.push('\n');
        output
    }

    /// Managed attributes with their current values.
    fn managed_attributes(state: &ActualState) -> Vec<(Attribute, serde_json::Value)> {
        Attribute::ALL
            .into_iter()
            .filter(|a| *a != Attribute::App)
            .map(|a| {
                let value = state
                    .get(a.native_name())
                    .map_or(serde_json::Value::Null, serde_json::Value::from);
                (a, value)
            })
            .collect()
    }

    /// Formats a validation result.
    #[must_use]
    pub fn format_validation(&self, result: &ValidationResult) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "valid": result.is_valid(),
                    "warnings": result.warnings,
                });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = format!("{} Parameters are valid.\n", "✓".green());
                for warning in &result.warnings {
                    let _ = writeln!(output, "   {} {warning}", "⚠".yellow());
                }
                output
            }
        }
    }

    /// Formats a failed run.
    #[must_use]
    pub fn format_failure(&self, message: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "failed": true,
                    "changed": false,
                    "msg": message,
                });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{} {message}\n", "✗".red()),
        }
    }

    /// Formats an action type with color.
    fn format_action_type(action_type: ActionType) -> String {
        match action_type {
            ActionType::Create => "+create".green().to_string(),
            ActionType::Update => "~update".yellow().to_string(),
            ActionType::Enable => "enable".green().to_string(),
            ActionType::Disable => "disable".yellow().to_string(),
            ActionType::Clean => "!clean".red().to_string(),
            ActionType::Delete => "-delete".red().to_string(),
        }
    }
}
