//! The Get/Set seam between the migration engine and the remote store

use crate::error::StoreError;
use cfgmig_path::{Path, Update};
use serde::de::DeserializeOwned;

/// Serialized configuration tree of one target
///
/// Opaque JSON bytes; transforms decode them into their own schema types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    target: String,
    json: Vec<u8>,
}

impl Snapshot {
    /// Wrap raw JSON bytes
    #[inline]
    #[must_use]
    pub fn new(target: impl Into<String>, json: Vec<u8>) -> Self {
        Self {
            target: target.into(),
            json,
        }
    }

    /// Serialize a JSON value into a snapshot
    ///
    /// # Errors
    /// Returns error if the value cannot be serialized
    pub fn from_value(
        target: impl Into<String>,
        value: &serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(target, serde_json::to_vec(value)?))
    }

    /// Target the snapshot was read from
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Raw JSON bytes
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.json
    }

    /// Decode into a typed model
    ///
    /// # Errors
    /// Returns error if the bytes do not match `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.json)
    }
}

/// One Set call: updates and deletes under a prefix on a single target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetRequest {
    /// Target the request is applied to
    pub target: String,
    /// Prefix joined in front of every update and delete path
    pub prefix: Option<Path>,
    /// Leaves to write
    pub updates: Vec<Update>,
    /// Nodes to remove
    pub deletes: Vec<Path>,
}

impl SetRequest {
    /// Request that only writes
    #[must_use]
    pub fn updates(target: impl Into<String>, prefix: Option<Path>, updates: Vec<Update>) -> Self {
        Self {
            target: target.into(),
            prefix,
            updates,
            deletes: Vec::new(),
        }
    }

    /// Request that only removes
    #[must_use]
    pub fn deletes(target: impl Into<String>, prefix: Option<Path>, deletes: Vec<Path>) -> Self {
        Self {
            target: target.into(),
            prefix,
            updates: Vec::new(),
            deletes,
        }
    }

    /// Nothing to send
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Prefix with the request target set on it
    #[must_use]
    pub fn scoped_prefix(&self) -> Path {
        self.prefix
            .clone()
            .unwrap_or_default()
            .with_target(self.target.clone())
    }
}

/// Acknowledgement of a Set call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetResponse {
    /// Target the request was applied to
    pub target: String,
    /// Store-assigned timestamp of the change
    pub timestamp: i64,
}

/// Remote configuration store
///
/// Implementations are injected into the migrator; there is no process-wide
/// client.
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch the tree of `target` rooted at `path`
    async fn get(&self, target: &str, path: &Path) -> Result<Snapshot, StoreError>;

    /// Apply updates and deletes on one target
    async fn set(&self, request: &SetRequest) -> Result<SetResponse, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Tree {
        name: String,
    }

    #[test]
    fn snapshot_decode() {
        let snapshot =
            Snapshot::from_value("v2", &serde_json::json!({ "name": "dg" })).unwrap();
        assert_eq!(snapshot.target(), "v2");
        assert_eq!(
            snapshot.decode::<Tree>().unwrap(),
            Tree {
                name: "dg".to_string()
            }
        );
    }

    #[test]
    fn snapshot_decode_mismatch() {
        let snapshot = Snapshot::new("v2", b"[1,2]".to_vec());
        assert!(snapshot.decode::<Tree>().is_err());
    }

    #[test]
    fn scoped_prefix_sets_target() {
        let request = SetRequest::deletes("v1", None, vec![Path::parse("/a")]);
        let prefix = request.scoped_prefix();
        assert!(prefix.is_empty());
        assert_eq!(prefix.target(), Some("v1"));
        assert!(!request.is_empty());
        assert!(SetRequest::default().is_empty());
    }
}
