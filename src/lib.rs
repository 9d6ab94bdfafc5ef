// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Splunk Index
//!
//! Declarative, idempotent management of a single Splunk index over the
//! Splunk management REST API.
//!
//! ## Overview
//!
//! A caller states what an index should look like: whether it exists, its
//! storage paths, size limits and retention, whether it is enabled, and
//! whether its data should be purged. Each run observes the live index and
//! issues only the operations needed to converge it, reporting whether
//! anything changed.
//!
//! ## Architecture
//!
//! 1. **Desired State**: built from caller parameters by
//!    [`config::DesiredStateBuilder`], renamed to Splunk's native attribute
//!    vocabulary
//! 2. **Actual State**: read through the [`splunk::IndexAccessor`] capability
//! 3. **Reconciler**: compares both and issues create, update, toggle, clean
//!    or delete in a fixed order
//! 4. **Reporter**: folds the issued operations into a
//!    [`report::ReconciliationResult`]
//!
//! ## Modules
//!
//! - [`config`]: Parameter loading, validation and the desired-state builder
//! - [`splunk`]: Accessor trait and Splunk REST client
//! - [`planner`]: Update-set computation and operation kinds
//! - [`reconciler`]: Convergence state machine
//! - [`report`]: Outcome reporting
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! name: web_logs
//! password: changeme
//! version: "8.1.0"
//! maxTotalDataSizeMB: 800
//! retention: 7776000
//! disabled: false
//! state: present
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod planner;
pub mod reconciler;
pub mod report;
pub mod splunk;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigValidator, DesiredState, DesiredStateBuilder, IndexParams, ParamsParser};
pub use error::{Result, SplunkIndexError};
pub use planner::{ActionType, DiffEngine};
pub use reconciler::{Reconciler, apply};
pub use report::{OutcomeReporter, ReconciliationResult};
pub use splunk::{ActualState, IndexAccessor, SplunkClient};
