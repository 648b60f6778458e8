// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! An endpoint keeping the configuration tree in memory.
//!
//! Containers are JSON objects and lists are JSON arrays of entries, each entry carrying
//! its key leaves as strings. Writing below a missing container or list entry creates it.
//! A delete prunes what it leaves hollow on its way up: empty containers, empty lists and
//! list entries left with nothing but their keys. Arrays inside a payload are leaf-lists
//! and are written as a whole.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{Capabilities, ConfigEndpoint, EndpointError, Path, PathElem, SetKind, SetOp};

#[derive(Default)]
struct MemoryState {
    tree: Value,                              /* the configuration */
    history: Vec<SetOp>,                      /* every op applied so far */
    failures: Vec<(Path, EndpointError)>,     /* injected failures, by path prefix */
}
impl MemoryState {
    fn check_failure(&self, path: &Path) -> Result<(), EndpointError> {
        match self.failures.iter().find(|(prefix, _)| path.starts_with(prefix)) {
            Some((_, error)) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

pub struct MemoryEndpoint {
    state: Mutex<MemoryState>,
}

impl Default for MemoryEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEndpoint {
    #[must_use]
    pub fn new() -> Self {
        Self::with_tree(Value::Object(Map::new()))
    }
    /// Build an endpoint whose tree is initially `tree`
    #[must_use]
    pub fn with_tree(tree: Value) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                tree,
                ..Default::default()
            }),
        }
    }
    /// A copy of the whole tree
    #[must_use]
    pub fn tree(&self) -> Value {
        self.state.lock().tree.clone()
    }
    #[must_use]
    pub fn history(&self) -> Vec<SetOp> {
        self.state.lock().history.clone()
    }
    pub fn clear_history(&self) {
        self.state.lock().history.clear();
    }
    /// Make every get or set touching `path` or anything below it fail with `error`
    pub fn inject_failure(&self, path: Path, error: EndpointError) {
        self.state.lock().failures.push((path, error));
    }
    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }
}

fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches_keys(entry: &Value, keys: &[(String, String)]) -> bool {
    keys.iter()
        .all(|(k, v)| entry.get(k).and_then(key_text).as_deref() == Some(v.as_str()))
}

fn new_entry(keys: &[(String, String)]) -> Value {
    Value::Object(
        keys.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

fn lookup<'a>(mut node: &'a Value, elems: &[PathElem]) -> Option<&'a Value> {
    for elem in elems {
        let child = node.get(&elem.name)?;
        node = if elem.keys.is_empty() {
            child
        } else {
            child
                .as_array()?
                .iter()
                .find(|entry| matches_keys(entry, &elem.keys))?
        };
    }
    Some(node)
}

fn lookup_or_create<'a>(
    mut node: &'a mut Value,
    path: &Path,
) -> Result<&'a mut Value, EndpointError> {
    for elem in path.elems() {
        let rejected = || {
            EndpointError::Rejected(
                path.to_string(),
                format!("'{}' is not a container", elem.name),
            )
        };
        if node.is_null() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            return Err(rejected());
        };
        let child = map.entry(elem.name.clone()).or_insert(Value::Null);
        if elem.keys.is_empty() {
            node = child;
            continue;
        }
        if child.is_null() {
            *child = Value::Array(vec![]);
        }
        let Value::Array(list) = child else {
            return Err(rejected());
        };
        let pos = if let Some(pos) = list.iter().position(|e| matches_keys(e, &elem.keys)) {
            pos
        } else {
            list.push(new_entry(&elem.keys));
            list.len() - 1
        };
        node = &mut list[pos];
    }
    Ok(node)
}

fn merge(target: &mut Value, value: &Value) {
    match (target, value) {
        (Value::Object(target), Value::Object(value)) => {
            for (k, v) in value {
                match target.get_mut(k) {
                    Some(t) => merge(t, v),
                    None => {
                        target.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (target, value) => *target = value.clone(),
    }
}

/// Nothing left but (possibly) the keys of a list entry
fn is_hollow(value: &Value, keys: &[(String, String)]) -> bool {
    match value {
        Value::Object(map) => map.keys().all(|k| keys.iter().any(|(key, _)| key == k)),
        Value::Array(list) => list.is_empty(),
        Value::Null => true,
        _ => false,
    }
}

/// Remove the node at `elems` below `node`, pruning hollow parents. Returns whether
/// anything was removed.
fn delete_at(node: &mut Value, elems: &[PathElem]) -> bool {
    let Some((first, rest)) = elems.split_first() else {
        return false;
    };
    let Value::Object(map) = node else {
        return false;
    };
    if first.keys.is_empty() {
        if rest.is_empty() {
            return map.remove(&first.name).is_some();
        }
        let Some(child) = map.get_mut(&first.name) else {
            return false;
        };
        let removed = delete_at(child, rest);
        if removed && is_hollow(child, &[]) {
            map.remove(&first.name);
        }
        return removed;
    }

    let Some(Value::Array(list)) = map.get_mut(&first.name) else {
        return false;
    };
    let Some(pos) = list.iter().position(|e| matches_keys(e, &first.keys)) else {
        return false;
    };
    let removed = if rest.is_empty() {
        list.remove(pos);
        true
    } else {
        let removed = delete_at(&mut list[pos], rest);
        if removed && is_hollow(&list[pos], &first.keys) {
            list.remove(pos);
        }
        removed
    };
    let empty = list.is_empty();
    if empty {
        map.remove(&first.name);
    }
    removed
}

fn apply_op(tree: &mut Value, op: &SetOp) -> Result<(), EndpointError> {
    if op.kind == SetKind::Delete {
        if op.path.is_root() {
            *tree = Value::Object(Map::new());
        } else if !delete_at(tree, op.path.elems()) {
            debug!("Nothing to delete at {}", op.path);
        }
        return Ok(());
    }
    let Some(value) = &op.value else {
        return Err(EndpointError::Rejected(
            op.path.to_string(),
            "missing payload".to_owned(),
        ));
    };
    let node = lookup_or_create(tree, &op.path)?;
    if op.kind == SetKind::Replace {
        *node = value.clone();
    } else {
        merge(node, value);
    }
    if let Some(elem) = op.path.last().filter(|elem| !elem.keys.is_empty()) {
        let Value::Object(entry) = node else {
            return Err(EndpointError::Rejected(
                op.path.to_string(),
                "list entry payload must be an object".to_owned(),
            ));
        };
        for (k, v) in &elem.keys {
            entry.insert(k.clone(), Value::String(v.clone()));
        }
    }
    Ok(())
}

#[async_trait]
impl ConfigEndpoint for MemoryEndpoint {
    async fn capabilities(&self) -> Result<Capabilities, EndpointError> {
        self.state.lock().check_failure(&Path::root())?;
        Ok(Capabilities {
            version: "memory".to_owned(),
            models: vec![
                "openconfig-interfaces".to_owned(),
                "openconfig-network-instance".to_owned(),
                "sonic-vxlan".to_owned(),
            ],
            encodings: vec!["JSON_IETF".to_owned()],
        })
    }

    async fn get(&self, path: &Path) -> Result<Value, EndpointError> {
        let state = self.state.lock();
        state.check_failure(path)?;
        lookup(&state.tree, path.elems())
            .cloned()
            .ok_or_else(|| EndpointError::NotFound(path.to_string()))
    }

    async fn set(&self, batch: Vec<SetOp>) -> Result<(), EndpointError> {
        let mut state = self.state.lock();
        for op in &batch {
            if let Err(e) = state.check_failure(&op.path) {
                warn!("Refusing {op}: {e}");
                return Err(e);
            }
        }
        let mut tree = state.tree.clone();
        for op in &batch {
            apply_op(&mut tree, op)?;
            debug!("Applied {op}");
        }
        state.tree = tree;
        state.history.extend(batch);
        Ok(())
    }
}
