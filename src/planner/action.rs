//! Mutating operations issued against an index.

use serde::Serialize;

/// Types of operations the reconciler can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Create the index with all desired attributes.
    Create,
    /// Update mutable attributes.
    Update,
    /// Enable a disabled index.
    Enable,
    /// Disable an enabled index.
    Disable,
    /// Purge all index data.
    Clean,
    /// Delete the index.
    Delete,
}

impl ActionType {
    /// Returns true if the operation destroys data.
    #[must_use]
    pub const fn is_destructive(self) -> bool {
        matches!(self, Self::Clean | Self::Delete)
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Clean => "clean",
            Self::Delete => "delete",
        };
        write!(f, "{s}")
    }
}
