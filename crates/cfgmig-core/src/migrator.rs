//! Migration executor
//!
//! Owns the registered steps and the store handle. A migration resolves the
//! step chain, then for each step reads both target trees, runs the step's
//! transform and applies the resulting actions. Everything runs sequentially;
//! the first error stops the migration and nothing already applied is undone.

use crate::chain::resolve_chain;
use crate::error::MigrationError;
use crate::step::{MigrationActions, MigrationStep};
use crate::version::SchemaVersion;
use cfgmig_path::Path;
use cfgmig_store::{ConfigStore, SetRequest, Snapshot};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Summary of a completed migration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Steps run, in chain order, as `(from, to)`
    pub steps: Vec<(SchemaVersion, SchemaVersion)>,
    /// Action entries applied
    pub actions: usize,
    /// Set calls sent
    pub set_calls: usize,
    /// Leaf updates sent
    pub updates: usize,
    /// Paths deleted
    pub deletes: usize,
}

impl MigrationReport {
    /// Check if no step ran
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    fn record(&mut self, applied: &ApplyStats) {
        self.actions += applied.actions;
        self.set_calls += applied.set_calls;
        self.updates += applied.updates;
        self.deletes += applied.deletes;
    }
}

/// Counters of one `execute_actions` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Action entries applied
    pub actions: usize,
    /// Set calls sent
    pub set_calls: usize,
    /// Leaf updates sent
    pub updates: usize,
    /// Paths deleted
    pub deletes: usize,
}

/// Versioned migration engine
///
/// Steps are registered through `&mut self` before any migration runs; the
/// migration itself only needs `&self`.
pub struct Migrator {
    store: Arc<dyn ConfigStore>,
    steps: Vec<MigrationStep>,
}

impl Migrator {
    /// Create migrator with no steps
    #[must_use]
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            steps: Vec::new(),
        }
    }

    /// Create migrator with steps, in registration order
    #[must_use]
    pub fn with_steps(store: Arc<dyn ConfigStore>, steps: impl IntoIterator<Item = MigrationStep>) -> Self {
        let mut migrator = Self::new(store);
        for step in steps {
            migrator.register(step);
        }
        migrator
    }

    /// Append a step
    ///
    /// A second step for an already registered version pair is accepted but
    /// can never be chosen ahead of the first one.
    pub fn register(&mut self, step: MigrationStep) {
        if self
            .steps
            .iter()
            .any(|s| s.connects(step.from_version(), step.to_version()))
        {
            tracing::warn!(
                from = %step.from_version(),
                to = %step.to_version(),
                "duplicate migration step registered"
            );
        }
        tracing::debug!(step = %step, "registered migration step");
        self.steps.push(step);
    }

    /// Registered steps, in registration order
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// First registered step for a version pair
    #[must_use]
    pub fn step(&self, from: &SchemaVersion, to: &SchemaVersion) -> Option<&MigrationStep> {
        self.steps.iter().find(|s| s.connects(from, to))
    }

    /// Resolve the step chain between two versions
    ///
    /// # Errors
    /// Returns [`MigrationError::ChainNotFound`] if the steps do not connect them
    pub fn resolve(
        &self,
        from: &SchemaVersion,
        to: &SchemaVersion,
    ) -> Result<Vec<&MigrationStep>, MigrationError> {
        resolve_chain(&self.steps, from, to)
    }

    /// Read both targets and run the step's transform
    ///
    /// No Set is sent; the returned actions are applied by
    /// [`Self::execute_actions`].
    ///
    /// # Errors
    /// - [`MigrationError::SnapshotFetch`] if either Get fails
    /// - [`MigrationError::Transform`] if the transform fails
    pub async fn run_step(
        &self,
        step: &MigrationStep,
        from_target: &str,
        to_target: &str,
    ) -> Result<Vec<MigrationActions>, MigrationError> {
        tracing::info!(
            from = %step.from_version(),
            to = %step.to_version(),
            from_target,
            to_target,
            "running migration step"
        );

        let source = self.fetch(from_target).await?;
        let destination = self.fetch(to_target).await?;

        let actions = step
            .apply(from_target, to_target, &source, &destination)
            .map_err(|source| MigrationError::Transform {
                from: step.from_version().clone(),
                to: step.to_version().clone(),
                source,
            })?;

        tracing::debug!(count = actions.len(), transform = %step.transform().describe(), "transform produced actions");
        Ok(actions)
    }

    /// Apply actions in order
    ///
    /// Per action: one Set of the updates against `to_target`, then one Set
    /// of the deletes against `from_target`, each skipped when empty. Stops at
    /// the first failed Set; earlier Sets stay applied.
    ///
    /// # Errors
    /// Returns [`MigrationError::Apply`] naming the target of the failed Set
    pub async fn execute_actions(
        &self,
        actions: &[MigrationActions],
        from_target: &str,
        to_target: &str,
    ) -> Result<ApplyStats, MigrationError> {
        let mut stats = ApplyStats::default();
        for action in actions {
            if let Some(request) = action.update_request(to_target) {
                self.send(&request).await?;
                stats.set_calls += 1;
                stats.updates += request.updates.len();
            }
            if let Some(request) = action.delete_request(from_target) {
                self.send(&request).await?;
                stats.set_calls += 1;
                stats.deletes += request.deletes.len();
            }
            stats.actions += 1;
        }
        Ok(stats)
    }

    /// Migrate `from_target` at `from_version` into `to_target` at `to_version`
    ///
    /// Equal versions succeed without touching the store.
    ///
    /// # Errors
    /// Returns the first error of chain resolution, snapshot reads,
    /// transforms or Sets
    pub async fn migrate(
        &self,
        from_target: &str,
        from_version: &SchemaVersion,
        to_target: &str,
        to_version: &SchemaVersion,
    ) -> Result<MigrationReport, MigrationError> {
        let chain = self.resolve(from_version, to_version)?;
        let mut report = MigrationReport::default();
        if chain.is_empty() {
            tracing::info!(version = %from_version, "source and destination versions match, nothing to migrate");
            return Ok(report);
        }

        tracing::info!(
            from = %from_version,
            to = %to_version,
            steps = chain.len(),
            "starting migration"
        );
        for step in chain {
            let actions = self.run_step(step, from_target, to_target).await?;
            let applied = self.execute_actions(&actions, from_target, to_target).await?;
            report.record(&applied);
            report
                .steps
                .push((step.from_version().clone(), step.to_version().clone()));
        }

        tracing::info!(
            steps = report.steps.len(),
            set_calls = report.set_calls,
            updates = report.updates,
            deletes = report.deletes,
            "migration complete"
        );
        Ok(report)
    }

    async fn fetch(&self, target: &str) -> Result<Snapshot, MigrationError> {
        self.store
            .get(target, &Path::root())
            .await
            .map_err(|source| MigrationError::SnapshotFetch {
                target: target.to_string(),
                source,
            })
    }

    async fn send(&self, request: &SetRequest) -> Result<(), MigrationError> {
        match self.store.set(request).await {
            Ok(response) => {
                tracing::debug!(target_name = %response.target, timestamp = response.timestamp, "set applied");
                Ok(())
            }
            Err(source) => {
                tracing::error!(target_name = %request.target, error = %source, "set failed");
                Err(MigrationError::Apply {
                    target: request.target.clone(),
                    source,
                })
            }
        }
    }
}

impl Debug for Migrator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrator")
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::step::MigrationFunction;
    use cfgmig_path::Update;
    use cfgmig_store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug)]
    struct Rename;

    impl MigrationFunction for Rename {
        fn transform(
            &self,
            _step: &MigrationStep,
            _from_target: &str,
            _to_target: &str,
            source: &Snapshot,
            _destination: &Snapshot,
        ) -> Result<Vec<MigrationActions>, TransformError> {
            let tree: serde_json::Value = source
                .decode()
                .map_err(|e| TransformError::invalid_snapshot(source.target(), e))?;
            let name = tree["name"].as_str().unwrap_or_default().to_uppercase();
            Ok(vec![MigrationActions::new()
                .with_updates(None, vec![Update::new(Path::parse("/name"), name)])
                .with_deletes(None, vec![Path::parse("/name")])])
        }

        fn describe(&self) -> String {
            "rename".to_string()
        }
    }

    fn store() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::new()
                .with_tree("v1", json!({ "name": "dg" }))
                .with_tree("v2", json!({})),
        )
    }

    #[tokio::test]
    async fn migrate_single_step() {
        let store = store();
        let migrator = Migrator::with_steps(
            store.clone(),
            [MigrationStep::between("1.0.0", "2.0.0", Rename)],
        );

        let report = migrator
            .migrate("v1", &"1.0.0".into(), "v2", &"2.0.0".into())
            .await
            .unwrap();

        assert_eq!(
            report.steps,
            vec![(SchemaVersion::new("1.0.0"), SchemaVersion::new("2.0.0"))]
        );
        assert_eq!(report.set_calls, 2);
        assert_eq!(store.tree("v2").unwrap(), json!({ "name": "DG" }));
        assert_eq!(store.tree("v1").unwrap(), json!({}));
    }

    #[tokio::test]
    async fn same_version_touches_nothing() {
        let store = store();
        let migrator = Migrator::new(store.clone());

        let report = migrator
            .migrate("v1", &"3.0.0".into(), "v2", &"3.0.0".into())
            .await
            .unwrap();

        assert!(report.is_noop());
        assert!(store.get_targets().is_empty());
        assert!(store.set_requests().is_empty());
    }

    #[tokio::test]
    async fn unresolvable_chain_touches_nothing() {
        let store = store();
        let migrator = Migrator::with_steps(
            store.clone(),
            [MigrationStep::between("1.0.0", "2.0.0", Rename)],
        );

        let err = migrator
            .migrate("v1", &"1.0.0".into(), "v2", &"5.0.0".into())
            .await
            .unwrap_err();

        assert!(matches!(err, MigrationError::ChainNotFound(v) if v == "5.0.0"));
        assert!(store.get_targets().is_empty());
    }

    #[tokio::test]
    async fn empty_halves_send_nothing() {
        let store = store();
        let migrator = Migrator::new(store.clone());
        let actions = vec![MigrationActions::new(), MigrationActions::new()];

        let stats = migrator.execute_actions(&actions, "v1", "v2").await.unwrap();

        assert_eq!(stats.actions, 2);
        assert_eq!(stats.set_calls, 0);
        assert!(store.set_requests().is_empty());
    }

    #[test]
    fn duplicate_registration_is_kept() {
        let mut migrator = Migrator::new(store());
        migrator.register(MigrationStep::between("1.0.0", "2.0.0", Rename));
        migrator.register(MigrationStep::between("1.0.0", "2.0.0", Rename));

        assert_eq!(migrator.steps().len(), 2);
        let first = migrator.step(&"1.0.0".into(), &"2.0.0".into()).unwrap();
        assert!(std::ptr::eq(first, &migrator.steps()[0]));
    }
}
