//! Error types for the migration engine

use crate::version::SchemaVersion;
use cfgmig_store::StoreError;

/// Errors raised by a transform
///
/// Transforms log and skip individual bad entities; these errors are for
/// conditions that invalidate the whole step.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Generic failure
    #[error("{0}")]
    Failed(String),

    /// Snapshot did not decode into the model of its version
    #[error("snapshot of target '{target}' does not match its schema: {source}")]
    InvalidSnapshot {
        target: String,
        #[source]
        source: serde_json::Error,
    },

    /// Source tree holds nothing to migrate
    #[error("no {kind} entities found on target '{target}'")]
    NoEntities { target: String, kind: String },
}

impl TransformError {
    /// Create generic failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Create snapshot decode error
    pub fn invalid_snapshot(target: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidSnapshot {
            target: target.into(),
            source,
        }
    }

    /// Create missing entities error
    pub fn no_entities(target: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::NoEntities {
            target: target.into(),
            kind: kind.into(),
        }
    }
}

/// Errors of a migration call
///
/// Every variant is terminal. Sets applied before the failure stay applied.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Registered steps do not connect the requested versions
    #[error("no migration chain found: version {0} is not reachable")]
    ChainNotFound(SchemaVersion),

    /// Get of a target tree failed
    #[error("failed to read config of target '{target}': {source}")]
    SnapshotFetch {
        target: String,
        #[source]
        source: StoreError,
    },

    /// Step transform failed
    #[error("migration {from} -> {to} failed: {source}")]
    Transform {
        from: SchemaVersion,
        to: SchemaVersion,
        #[source]
        source: TransformError,
    },

    /// Set of an action half failed
    #[error("failed to apply changes to target '{target}': {source}")]
    Apply {
        target: String,
        #[source]
        source: StoreError,
    },
}

impl MigrationError {
    /// Version named by a chain resolution failure
    #[inline]
    #[must_use]
    pub fn missing_version(&self) -> Option<&SchemaVersion> {
        match self {
            Self::ChainNotFound(version) => Some(version),
            _ => None,
        }
    }
}
