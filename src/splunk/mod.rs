//! Splunk management API integration module.
//!
//! This module provides all functionality for reading and mutating indexes
//! on a Splunk instance: the [`IndexAccessor`] capability trait, the REST
//! client implementing it, and the types describing an index's current state.

mod accessor;
mod client;
mod types;

pub use accessor::IndexAccessor;
#[cfg(test)]
pub use accessor::MockIndexAccessor;
pub use client::SplunkClient;
pub use types::{ActualState, DISABLED_KEY, TOTAL_EVENT_COUNT_KEY};
