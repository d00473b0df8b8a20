//! Testing utilities for cfgmig workspace
//!
//! Shared test helpers, fixtures, and a scripted transform.

#![allow(missing_docs)]

use cfgmig_core::{MigrationActions, MigrationFunction, MigrationStep, SchemaBinding, TransformError};
use cfgmig_path::{Path, TypedValue, Update};
use cfgmig_store::{MemoryStore, Snapshot};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

/// One invocation seen by a [`ScriptedTransform`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformCall {
    pub from_version: String,
    pub to_version: String,
    pub from_target: String,
    pub to_target: String,
    pub source: Value,
    pub destination: Value,
}

/// Transform that returns preset actions (or an error) and records its calls
#[derive(Debug, Default)]
pub struct ScriptedTransform {
    actions: Vec<MigrationActions>,
    failure: Option<String>,
    calls: Mutex<Vec<TransformCall>>,
}

impl ScriptedTransform {
    pub fn returning(actions: Vec<MigrationActions>) -> Arc<Self> {
        Arc::new(Self {
            actions,
            ..Self::default()
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(message.to_string()),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<TransformCall> {
        self.calls.lock().clone()
    }
}

impl MigrationFunction for ScriptedTransform {
    fn transform(
        &self,
        step: &MigrationStep,
        from_target: &str,
        to_target: &str,
        source: &Snapshot,
        destination: &Snapshot,
    ) -> Result<Vec<MigrationActions>, TransformError> {
        self.calls.lock().push(TransformCall {
            from_version: step.from_version().to_string(),
            to_version: step.to_version().to_string(),
            from_target: from_target.to_string(),
            to_target: to_target.to_string(),
            source: source.decode().unwrap_or(Value::Null),
            destination: destination.decode().unwrap_or(Value::Null),
        });
        match &self.failure {
            Some(message) => Err(TransformError::failed(message.clone())),
            None => Ok(self.actions.clone()),
        }
    }

    fn describe(&self) -> String {
        format!("scripted({} actions)", self.actions.len())
    }
}

/// Step between bare versions driven by a shared scripted transform
pub fn scripted_step(from: &str, to: &str, transform: &Arc<ScriptedTransform>) -> MigrationStep {
    MigrationStep::from_shared(
        SchemaBinding::new("test", from),
        SchemaBinding::new("test", to),
        transform.clone(),
    )
}

/// Step that does nothing
pub fn noop_step(from: &str, to: &str) -> MigrationStep {
    scripted_step(from, to, &ScriptedTransform::returning(Vec::new()))
}

/// Action writing one leaf under `prefix`
pub fn update_action(prefix: &str, leaf: &str, value: impl Into<TypedValue>) -> MigrationActions {
    MigrationActions::new().with_updates(
        Some(Path::parse(prefix)),
        vec![Update::new(Path::parse(leaf), value)],
    )
}

/// Action deleting one path
pub fn delete_action(path: &str) -> MigrationActions {
    MigrationActions::new().with_deletes(None, vec![Path::parse(path)])
}

/// Action moving one leaf: write it under `prefix`, delete `old`
pub fn move_action(prefix: &str, leaf: &str, value: impl Into<TypedValue>, old: &str) -> MigrationActions {
    let update = update_action(prefix, leaf, value);
    MigrationActions {
        deletes: vec![Path::parse(old)],
        ..update
    }
}

/// Memory store holding the given target trees
pub fn store_with(trees: &[(&str, Value)]) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    for (target, tree) in trees {
        store.insert_tree(*target, tree.clone());
    }
    Arc::new(store)
}

/// Aether 2.0.0 tree with three device groups:
///
/// - `starbucks_NewYork`: id needs normalizing, two adjacent IMSI blocks
/// - `acme-chicago`: valid id, blocks with a gap
/// - an entry without an id
pub fn aether_2_0_tree() -> Value {
    json!({
        "device-group": [
            {
                "id": "starbucks_NewYork",
                "display-name": "Starbucks New York",
                "description": "Cameras in New York",
                "site": "starbucks-newyork",
                "imsis": [
                    { "imsi-id": "front", "imsi-range-from": 100, "imsi-range-to": 199 },
                    { "imsi-id": "back", "imsi-range-from": 200, "imsi-range-to": 299 }
                ]
            },
            {
                "id": "acme-chicago",
                "site": "acme-chicago",
                "imsis": [
                    { "imsi-id": "robots", "imsi-range-from": 0, "imsi-range-to": 9 },
                    { "imsi-id": "sensors", "imsi-range-from": 20 }
                ]
            },
            {
                "display-name": "orphan"
            }
        ]
    })
}

/// Store with the aether 2.0.0 tree on `v2` and an empty tree on `v21`
pub fn aether_store() -> Arc<MemoryStore> {
    store_with(&[("v2", aether_2_0_tree()), ("v21", json!({}))])
}
