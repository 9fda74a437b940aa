//! Purpose: Per-level output accumulator with explicit write strategies.
//! Exports: `Output`, `deep_merge`.
//! Role: Holds what one template level has produced; the projector only writes through it.
//! Invariants: An accumulator nothing was written to finishes as `None` (ABSENT), never `{}`.
//! Invariants: A non-object `replace` owns the level; later keyed writes are dropped, not mixed in.
//! Notes: Deep merge is positional for arrays and recursive for objects; scalars are overwritten.

use serde_json::{Map, Value};

use super::path::assign_path;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Output {
    #[default]
    Empty,
    Keyed(Map<String, Value>),
    Replaced(Value),
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Output::Empty => true,
            Output::Keyed(map) => map.is_empty(),
            Output::Replaced(_) => false,
        }
    }

    /// Store `value` under a single literal key, overwriting that key.
    pub fn insert(&mut self, key: &str, value: Value) {
        if let Some(map) = self.keyed_mut("insert", key) {
            map.insert(key.to_string(), value);
        }
    }

    /// Store `value` at a dotted path, creating intermediate objects.
    pub fn assign(&mut self, path: &str, value: Value) {
        if let Some(map) = self.keyed_mut("assign", path) {
            assign_path(map, path, value);
        }
    }

    /// Deep-merge every entry of `incoming` into the level.
    pub fn merge(&mut self, incoming: Map<String, Value>) {
        let Some(map) = self.keyed_mut("merge", "") else {
            return;
        };
        for (key, value) in incoming {
            match map.get_mut(&key) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    map.insert(key, value);
                }
            }
        }
    }

    /// Make `value` the whole result of this level, discarding earlier writes.
    pub fn replace(&mut self, value: Value) {
        if let Output::Keyed(map) = self {
            if !map.is_empty() {
                tracing::debug!(discarded = map.len(), "replace discards keyed output");
            }
        }
        *self = Output::Replaced(value);
    }

    pub fn finish(self) -> Option<Value> {
        match self {
            Output::Empty => None,
            Output::Keyed(map) if map.is_empty() => None,
            Output::Keyed(map) => Some(Value::Object(map)),
            Output::Replaced(value) => Some(value),
        }
    }

    fn keyed_mut(&mut self, strategy: &'static str, key: &str) -> Option<&mut Map<String, Value>> {
        if matches!(self, Output::Empty) {
            *self = Output::Keyed(Map::new());
        }
        match self {
            Output::Keyed(map) => Some(map),
            Output::Replaced(Value::Object(map)) => Some(map),
            Output::Replaced(_) | Output::Empty => {
                tracing::debug!(strategy, key, "keyed write after replace dropped");
                None
            }
        }
    }
}

/// Merge `incoming` into `target` in place.
///
/// Objects merge key by key, arrays element by element (extra incoming
/// elements are appended), and any other pairing takes the incoming value.
pub fn deep_merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(existing), Value::Array(incoming)) => {
            for (index, value) in incoming.into_iter().enumerate() {
                match existing.get_mut(index) {
                    Some(slot) => deep_merge(slot, value),
                    None => existing.push(value),
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
