//! Error types for the store client

use crate::config::ConfigError;
use std::fmt;

/// Errors from Get/Set against a configuration store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Request could not be delivered
    #[error("transport error talking to {address}: {source}")]
    Transport {
        address: String,
        #[source]
        source: reqwest::Error,
    },

    /// Store answered with a failure status
    #[error("{operation} on target '{target}' rejected ({status}): {message}")]
    Rejected {
        operation: &'static str,
        target: String,
        status: u16,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("malformed {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Get returned no data for the target
    #[error("get on target '{0}' returned no data")]
    EmptyResponse(String),

    /// Get returned a tree that is neither inline JSON nor base64 JSON
    #[error("get on target '{target}' returned a malformed tree: {reason}")]
    MalformedTree { target: String, reason: String },

    /// Target is not known to the store
    #[error("unknown target: {0}")]
    UnknownTarget(String),

    /// Path does not address a node the store can write
    #[error("invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Store is not reachable for the target
    #[error("store unavailable for target '{0}'")]
    Unavailable(String),

    /// TLS material was rejected by the HTTP client
    #[error("invalid TLS credentials: {0}")]
    Credentials(#[source] reqwest::Error),

    /// JSON encoding failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Client configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StoreError {
    /// Create invalid path error
    pub fn invalid_path(path: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Create malformed tree error
    pub fn malformed_tree(target: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::MalformedTree {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if the failure happened before reaching the store
    #[inline]
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Credentials(_) | Self::Json(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_target() {
        let err = StoreError::Rejected {
            operation: "set",
            target: "v3".to_string(),
            status: 400,
            message: "bad leaf".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("set"));
        assert!(text.contains("v3"));
        assert!(text.contains("bad leaf"));
    }

    #[test]
    fn local_errors() {
        assert!(StoreError::Config(ConfigError::Invalid("x".into())).is_local());
        assert!(!StoreError::Unavailable("v1".into()).is_local());
    }
}
