//! Configuration module for index reconciliation.
//!
//! This module handles everything that happens before the first remote call:
//! - Loading parameters from a file and merging command-line overrides
//! - Validation of parameter values
//! - Building the desired state in Splunk's native vocabulary

mod builder;
mod parser;
mod spec;
mod validator;

pub use builder::{
    Attribute, DesiredConfig, DesiredState, DesiredStateBuilder, immutable_attributes,
};
pub use parser::ParamsParser;
pub use spec::{
    ConnectionParameters, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SCHEME, DEFAULT_USERNAME,
    IndexParams, IndexState, Scheme, SplunkVersion,
};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
