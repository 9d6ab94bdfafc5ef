//! Index accessor trait definition.
//!
//! The reconciler only talks to Splunk through this capability interface,
//! so it can run against a test double without network access.

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::types::ActualState;
use crate::error::Result;

/// Read/write access to the index collection of one Splunk instance.
///
/// Every call may fail with a transport, authentication or validation
/// error; callers treat any failure as fatal for the current run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IndexAccessor: Send + Sync {
    /// Checks whether the index exists.
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Reads the current attributes of an existing index.
    async fn fetch_attributes(&self, name: &str) -> Result<ActualState>;

    /// Creates the index with the given native attributes.
    ///
    /// Creation-time-only attributes are legal here.
    async fn create(&self, name: &str, attributes: &BTreeMap<String, String>) -> Result<()>;

    /// Updates mutable attributes of an existing index.
    async fn update(&self, name: &str, attributes: &BTreeMap<String, String>) -> Result<()>;

    /// Enables the index.
    async fn enable(&self, name: &str) -> Result<()>;

    /// Disables the index.
    async fn disable(&self, name: &str) -> Result<()>;

    /// Irrecoverably discards all data in the index.
    async fn clean(&self, name: &str) -> Result<()>;

    /// Deletes the index.
    async fn delete(&self, name: &str) -> Result<()>;
}
