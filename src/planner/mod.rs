//! Planning module for index operations.
//!
//! This module handles the comparison between desired and actual attributes
//! and names the operations the reconciler may issue.

mod action;
mod diff;

pub use action::ActionType;
pub use diff::{AttributeChange, DiffEngine, UpdateSet};
