use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered key-value data addressed with dotted paths (`prefixes.short`).
///
/// Numeric segments index into lists (`prompts.0.name`). Reads never fail:
/// a missing path is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataStore {
    root: Map<String, Value>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = child(current, segment)?;
        }
        Some(current)
    }

    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).cloned().unwrap_or(default)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Write `value` at `path`, creating intermediate maps as needed. A scalar
    /// sitting where a map is required is replaced.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((head, rest)) = segments.split_first() else {
            return;
        };
        let slot = self.root.entry(head.to_string()).or_insert(Value::Null);
        assign(slot, rest, value.into());
    }

    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Remove the leaf at `path`, leaving its siblings in place.
    pub fn forget(&mut self, path: &str) -> Option<Value> {
        let segments: Vec<&str> = path.split('.').collect();
        let (leaf, parents) = segments.split_last()?;
        let Some((head, rest)) = parents.split_first() else {
            return self.root.shift_remove(*leaf);
        };

        let mut parent = self.root.get_mut(*head)?;
        for segment in rest {
            parent = child_mut(parent, segment)?;
        }
        match parent {
            Value::Object(map) => map.shift_remove(*leaf),
            Value::Array(items) => {
                let index = leaf.parse::<usize>().ok().filter(|i| *i < items.len())?;
                Some(items.remove(index))
            }
            _ => None,
        }
    }

    /// Bulk-merge `entries`, overwriting overlapping keys.
    pub fn put(&mut self, entries: Map<String, Value>) {
        for (key, value) in entries {
            self.set(&key, value);
        }
    }

    pub fn merge(&mut self, other: &DataStore) {
        self.put(other.root.clone());
    }

    pub fn to_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Replace the contents with `entries`, keeping surviving keys in their
    /// current position and appending new ones.
    pub fn replace_ordered(&mut self, mut entries: Map<String, Value>) {
        let mut next = Map::new();
        for key in self.root.keys() {
            if let Some(value) = entries.shift_remove(key) {
                next.insert(key.clone(), value);
            }
        }
        next.extend(entries);
        self.root = next;
    }

    pub fn reset(&mut self) {
        self.root.clear();
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

impl From<Map<String, Value>> for DataStore {
    fn from(root: Map<String, Value>) -> Self {
        Self::from_map(root)
    }
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

fn assign(slot: &mut Value, segments: &[&str], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *slot = value;
        return;
    };

    if let Value::Array(items) = slot {
        if let Ok(index) = head.parse::<usize>() {
            if let Some(item) = items.get_mut(index) {
                assign(item, rest, value);
                return;
            }
            if index == items.len() {
                let mut fresh = Value::Null;
                assign(&mut fresh, rest, value);
                items.push(fresh);
                return;
            }
        }
    }

    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        let next = map.entry(head.to_string()).or_insert(Value::Null);
        assign(next, rest, value);
    }
}

/// Text form of a value as it appears in rendered output.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) if items.iter().all(is_scalar) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}
