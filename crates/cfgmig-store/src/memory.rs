//! In-process store
//!
//! Holds one JSON tree per target and applies Set requests to it. Every call
//! is recorded so tests can assert on what the migrator sent, and failures can
//! be injected per target (Get) or per call index (Set).

use crate::error::StoreError;
use crate::store::{ConfigStore, SetRequest, SetResponse, Snapshot};
use cfgmig_path::{Path, PathElem, TypedValue};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

/// In-memory [`ConfigStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    trees: Mutex<HashMap<String, Value>>,
    gets: Mutex<Vec<String>>,
    sets: Mutex<Vec<SetRequest>>,
    failing_gets: Mutex<HashSet<String>>,
    failing_sets: Mutex<HashSet<usize>>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target tree, returning the store
    #[must_use]
    pub fn with_tree(self, target: impl Into<String>, tree: Value) -> Self {
        self.insert_tree(target, tree);
        self
    }

    /// Add or replace a target tree
    pub fn insert_tree(&self, target: impl Into<String>, tree: Value) {
        self.trees.lock().insert(target.into(), tree);
    }

    /// Current tree of a target
    #[must_use]
    pub fn tree(&self, target: &str) -> Option<Value> {
        self.trees.lock().get(target).cloned()
    }

    /// Make every Get on `target` fail
    pub fn fail_get(&self, target: impl Into<String>) {
        self.failing_gets.lock().insert(target.into());
    }

    /// Make the Set call with this zero-based index fail
    pub fn fail_set_call(&self, index: usize) {
        self.failing_sets.lock().insert(index);
    }

    /// Targets passed to Get, in call order
    #[must_use]
    pub fn get_targets(&self) -> Vec<String> {
        self.gets.lock().clone()
    }

    /// Set requests received, in call order (failed ones included)
    #[must_use]
    pub fn set_requests(&self) -> Vec<SetRequest> {
        self.sets.lock().clone()
    }

    /// Applies the whole request to a copy of the target tree; the copy
    /// replaces the stored tree only when every delete and update succeeded.
    fn apply(&self, request: &SetRequest) -> Result<(), StoreError> {
        let prefix = request.prefix.clone().unwrap_or_default();
        let mut trees = self.trees.lock();
        let mut tree = trees
            .get(&request.target)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        for delete in &request.deletes {
            remove_node(&mut tree, &prefix.join(delete));
        }
        for update in &request.updates {
            let path = prefix.join(update.path());
            write_leaf(&mut tree, &path, update.value())?;
        }

        trees.insert(request.target.clone(), tree);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ConfigStore for MemoryStore {
    async fn get(&self, target: &str, path: &Path) -> Result<Snapshot, StoreError> {
        self.gets.lock().push(target.to_string());
        if self.failing_gets.lock().contains(target) {
            return Err(StoreError::Unavailable(target.to_string()));
        }

        let trees = self.trees.lock();
        let tree = trees
            .get(target)
            .ok_or_else(|| StoreError::UnknownTarget(target.to_string()))?;
        let node = find_node(tree, path).ok_or_else(|| StoreError::EmptyResponse(target.to_string()))?;
        Ok(Snapshot::new(target, serde_json::to_vec(node)?))
    }

    async fn set(&self, request: &SetRequest) -> Result<SetResponse, StoreError> {
        let index = {
            let mut sets = self.sets.lock();
            sets.push(request.clone());
            sets.len() - 1
        };
        if self.failing_sets.lock().contains(&index) {
            tracing::debug!(index, target_name = %request.target, "injected set failure");
            return Err(StoreError::Unavailable(request.target.clone()));
        }

        self.apply(request)?;
        Ok(SetResponse {
            target: request.target.clone(),
            timestamp: i64::try_from(index).unwrap_or(i64::MAX),
        })
    }
}

fn to_json(value: &TypedValue) -> Value {
    match value {
        TypedValue::String(s) => Value::String(s.clone()),
        TypedValue::U8(v) => Value::from(*v),
        TypedValue::U16(v) => Value::from(*v),
        TypedValue::U32(v) => Value::from(*v),
        TypedValue::U64(v) => Value::from(*v),
        TypedValue::I64(v) => Value::from(*v),
        TypedValue::Bool(v) => Value::Bool(*v),
    }
}

/// Key values compare against the textual form of scalar list fields
fn matches_keys(item: &Value, keys: &BTreeMap<String, String>) -> bool {
    keys.iter().all(|(name, expected)| match item.get(name) {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == *expected,
        Some(Value::Bool(b)) => b.to_string() == *expected,
        _ => false,
    })
}

fn keyed_entry(elem: &PathElem) -> Value {
    let fields = elem
        .keys()
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect();
    Value::Object(fields)
}

fn child<'a>(node: &'a Value, elem: &PathElem) -> Option<&'a Value> {
    let field = node.get(elem.name())?;
    if elem.keys().is_empty() {
        return Some(field);
    }
    field
        .as_array()?
        .iter()
        .find(|item| matches_keys(item, elem.keys()))
}

fn child_mut<'a>(node: &'a mut Value, elem: &PathElem) -> Option<&'a mut Value> {
    let field = node.as_object_mut()?.get_mut(elem.name())?;
    if elem.keys().is_empty() {
        return Some(field);
    }
    field
        .as_array_mut()?
        .iter_mut()
        .find(|item| matches_keys(item, elem.keys()))
}

/// Existing nodes are never replaced; a scalar where a container or list
/// is expected is an error
fn child_or_insert<'a>(node: &'a mut Value, elem: &PathElem) -> Result<&'a mut Value, &'static str> {
    let fields = node.as_object_mut().ok_or("intermediate node is not a container")?;
    if elem.keys().is_empty() {
        return Ok(fields
            .entry(elem.name())
            .or_insert_with(|| Value::Object(Map::new())));
    }

    let items = fields
        .entry(elem.name())
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or("keyed element is not a list")?;
    let index = match items.iter().position(|item| matches_keys(item, elem.keys())) {
        Some(index) => index,
        None => {
            items.push(keyed_entry(elem));
            items.len() - 1
        }
    };
    Ok(&mut items[index])
}

fn find_node<'a>(tree: &'a Value, path: &Path) -> Option<&'a Value> {
    path.elems()
        .iter()
        .try_fold(tree, |node, elem| child(node, elem))
}

fn descend<'a>(mut node: &'a mut Value, elems: &[PathElem]) -> Option<&'a mut Value> {
    for elem in elems {
        node = child_mut(node, elem)?;
    }
    Some(node)
}

fn write_leaf(tree: &mut Value, path: &Path, value: &TypedValue) -> Result<(), StoreError> {
    let Some((leaf, parents)) = path.elems().split_last() else {
        return Err(StoreError::invalid_path(path, "cannot write a value at the root"));
    };
    if !leaf.keys().is_empty() {
        return Err(StoreError::invalid_path(path, "leaf element carries keys"));
    }

    let mut node = tree;
    for elem in parents {
        node = child_or_insert(node, elem).map_err(|reason| StoreError::invalid_path(path, reason))?;
    }
    let parent = node
        .as_object_mut()
        .ok_or_else(|| StoreError::invalid_path(path, "parent is not a container"))?;
    parent.insert(leaf.name().to_string(), to_json(value));
    Ok(())
}

/// Removing a node that does not exist is a no-op
fn remove_node(tree: &mut Value, path: &Path) {
    let Some((last, parents)) = path.elems().split_last() else {
        *tree = Value::Object(Map::new());
        return;
    };
    let Some(parent) = descend(tree, parents).and_then(Value::as_object_mut) else {
        return;
    };

    if last.keys().is_empty() {
        parent.remove(last.name());
    } else if let Some(items) = parent.get_mut(last.name()).and_then(Value::as_array_mut) {
        items.retain(|item| !matches_keys(item, last.keys()));
    }
}
