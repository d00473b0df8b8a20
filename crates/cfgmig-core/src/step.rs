//! Migration steps and the transform contract

use crate::error::TransformError;
use crate::version::{SchemaBinding, SchemaVersion};
use cfgmig_path::{Path, Update};
use cfgmig_store::{SetRequest, Snapshot};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Changes produced for one migrated entity
///
/// Updates are written to the destination target under `update_prefix`;
/// deletes are removed from the source target under `delete_prefix`. Either
/// half may be empty, in which case no Set is sent for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationActions {
    /// Prefix for every update path
    pub update_prefix: Option<Path>,
    /// Leaves to write on the destination target
    pub updates: Vec<Update>,
    /// Prefix for every delete path
    pub delete_prefix: Option<Path>,
    /// Nodes to remove from the source target
    pub deletes: Vec<Path>,
}

impl MigrationActions {
    /// Create empty actions
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the update half
    #[inline]
    #[must_use]
    pub fn with_updates(mut self, prefix: Option<Path>, updates: Vec<Update>) -> Self {
        self.update_prefix = prefix;
        self.updates = updates;
        self
    }

    /// Set the delete half
    #[inline]
    #[must_use]
    pub fn with_deletes(mut self, prefix: Option<Path>, deletes: Vec<Path>) -> Self {
        self.delete_prefix = prefix;
        self.deletes = deletes;
        self
    }

    /// Nothing to apply
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Set request for the update half, if there are updates
    #[must_use]
    pub fn update_request(&self, target: &str) -> Option<SetRequest> {
        (!self.updates.is_empty()).then(|| {
            SetRequest::updates(target, self.update_prefix.clone(), self.updates.clone())
        })
    }

    /// Set request for the delete half, if there are deletes
    #[must_use]
    pub fn delete_request(&self, target: &str) -> Option<SetRequest> {
        (!self.deletes.is_empty()).then(|| {
            SetRequest::deletes(target, self.delete_prefix.clone(), self.deletes.clone())
        })
    }
}

/// Per-version-pair transform
///
/// Receives the step it belongs to, both target names and the snapshots of
/// both targets, and returns the actions to apply in order. A transform does
/// not talk to the store itself.
pub trait MigrationFunction: Send + Sync + Debug {
    /// Compute the actions that migrate `source` into `destination`
    ///
    /// # Errors
    /// Returns error for conditions that invalidate the whole step
    fn transform(
        &self,
        step: &MigrationStep,
        from_target: &str,
        to_target: &str,
        source: &Snapshot,
        destination: &Snapshot,
    ) -> Result<Vec<MigrationActions>, TransformError>;

    /// Describe the transform
    fn describe(&self) -> String;
}

/// One registered migration between two adjacent schema versions
///
/// Immutable once created; cloning shares the transform.
#[derive(Clone)]
pub struct MigrationStep {
    from_binding: SchemaBinding,
    to_binding: SchemaBinding,
    transform: Arc<dyn MigrationFunction>,
}

impl MigrationStep {
    /// Create step between two model bindings
    #[must_use]
    pub fn new<F>(from_binding: SchemaBinding, to_binding: SchemaBinding, transform: F) -> Self
    where
        F: MigrationFunction + 'static,
    {
        Self::from_shared(from_binding, to_binding, Arc::new(transform))
    }

    /// Create step with an already shared transform
    #[must_use]
    pub fn from_shared(
        from_binding: SchemaBinding,
        to_binding: SchemaBinding,
        transform: Arc<dyn MigrationFunction>,
    ) -> Self {
        Self {
            from_binding,
            to_binding,
            transform,
        }
    }

    /// Create step between bare versions, without model names
    #[must_use]
    pub fn between<F>(
        from: impl Into<SchemaVersion>,
        to: impl Into<SchemaVersion>,
        transform: F,
    ) -> Self
    where
        F: MigrationFunction + 'static,
    {
        Self::new(SchemaBinding::new("", from), SchemaBinding::new("", to), transform)
    }

    /// Version migrated from
    #[inline]
    #[must_use]
    pub fn from_version(&self) -> &SchemaVersion {
        self.from_binding.version()
    }

    /// Version migrated to
    #[inline]
    #[must_use]
    pub fn to_version(&self) -> &SchemaVersion {
        self.to_binding.version()
    }

    /// Binding the source snapshot is decoded with
    #[inline]
    #[must_use]
    pub fn from_binding(&self) -> &SchemaBinding {
        &self.from_binding
    }

    /// Binding the destination snapshot is decoded with
    #[inline]
    #[must_use]
    pub fn to_binding(&self) -> &SchemaBinding {
        &self.to_binding
    }

    /// Transform of this step
    #[inline]
    #[must_use]
    pub fn transform(&self) -> &dyn MigrationFunction {
        self.transform.as_ref()
    }

    /// Check if the step connects `from` to `to`
    #[inline]
    #[must_use]
    pub fn connects(&self, from: &SchemaVersion, to: &SchemaVersion) -> bool {
        self.from_version() == from && self.to_version() == to
    }

    /// Run the transform of this step on two snapshots
    ///
    /// # Errors
    /// Returns whatever error the transform raises
    pub fn apply(
        &self,
        from_target: &str,
        to_target: &str,
        source: &Snapshot,
        destination: &Snapshot,
    ) -> Result<Vec<MigrationActions>, TransformError> {
        self.transform
            .transform(self, from_target, to_target, source, destination)
    }
}

impl Debug for MigrationStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("from", &self.from_binding.to_string())
            .field("to", &self.to_binding.to_string())
            .field("transform", &self.transform.describe())
            .finish()
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from_binding, self.to_binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Fixed(Vec<MigrationActions>);

    impl MigrationFunction for Fixed {
        fn transform(
            &self,
            step: &MigrationStep,
            _from_target: &str,
            to_target: &str,
            _source: &Snapshot,
            _destination: &Snapshot,
        ) -> Result<Vec<MigrationActions>, TransformError> {
            if step.to_version() == "9.9.9" {
                return Err(TransformError::failed(format!("refusing {to_target}")));
            }
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            format!("fixed({})", self.0.len())
        }
    }

    fn snapshot(target: &str) -> Snapshot {
        Snapshot::new(target, b"{}".to_vec())
    }

    #[test]
    fn action_requests_only_for_non_empty_halves() {
        let actions = MigrationActions::new().with_updates(
            Some(Path::parse("/device-group[id=a]")),
            vec![Update::new(Path::parse("/site"), "x")],
        );

        let update = actions.update_request("v2").unwrap();
        assert_eq!(update.target, "v2");
        assert_eq!(update.updates.len(), 1);
        assert!(actions.delete_request("v1").is_none());
        assert!(!actions.is_empty());
        assert!(MigrationActions::new().is_empty());
    }

    #[test]
    fn step_applies_its_transform() {
        let expected = vec![MigrationActions::new().with_deletes(None, vec![Path::parse("/a")])];
        let step = MigrationStep::between("1.0.0", "2.0.0", Fixed(expected.clone()));

        let actions = step
            .apply("v1", "v2", &snapshot("v1"), &snapshot("v2"))
            .unwrap();
        assert_eq!(actions, expected);
        assert!(step.connects(&"1.0.0".into(), &"2.0.0".into()));
    }

    #[test]
    fn transform_sees_its_step() {
        let step = MigrationStep::between("1.0.0", "9.9.9", Fixed(Vec::new()));
        let result = step.apply("v1", "v2", &snapshot("v1"), &snapshot("v2"));
        assert!(matches!(result, Err(TransformError::Failed(msg)) if msg == "refusing v2"));
    }

    #[test]
    fn debug_and_display() {
        let step = MigrationStep::new(
            SchemaBinding::new("aether", "2.0.0"),
            SchemaBinding::new("aether", "2.1.0"),
            Fixed(Vec::new()),
        );
        assert_eq!(step.to_string(), "aether@2.0.0 -> aether@2.1.0");
        assert!(format!("{step:?}").contains("fixed(0)"));
    }
}
