//! Per-schema memoization of top-level validation results.
//!
//! Keys compare by deep structural equality, with numbers compared by bit
//! pattern so that the key relation stays reflexive for `NaN`. Each key owns
//! a `OnceLock` cell: concurrent validations of an equal input compute once
//! and the map's shard lock is never held while a validation runs.
//!
//! The cache holds at most `capacity` inputs. Once full, the oldest
//! admitted input is evicted first. A capacity of zero disables caching.

use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::validation_error::ValidateError;
use super::value::Value;

/// Number of distinct inputs a schema remembers unless configured otherwise.
pub(crate) const DEFAULT_CAPACITY: usize = 256;

type Slot = Arc<OnceLock<Vec<ValidateError>>>;

/// Cached results keyed by input value.
#[derive(Debug)]
pub(crate) struct Memo {
    capacity: usize,
    entries: DashMap<MemoKey, Slot>,
    admitted: Mutex<VecDeque<MemoKey>>,
}

impl Default for Memo {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Memo {
    /// A cache remembering at most `capacity` inputs.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: DashMap::new(),
            admitted: Mutex::new(VecDeque::new()),
        }
    }

    /// Returns the cached result for `value`, running `compute` on a miss.
    pub(crate) fn get_or_compute(
        &self,
        value: &Value,
        compute: impl FnOnce() -> Vec<ValidateError>,
    ) -> Vec<ValidateError> {
        if self.capacity == 0 {
            return compute();
        }
        // The shard lock is released before `admit` touches the map again.
        let (cell, fresh) = match self.entries.entry(MemoKey(value.clone())) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), None),
            Entry::Vacant(entry) => {
                let key = entry.key().clone();
                let inserted = Arc::clone(entry.insert(Slot::default()).value());
                (inserted, Some(key))
            }
        };
        if let Some(key) = fresh {
            self.admit(key);
        } else if let Some(errors) = cell.get() {
            tracing::trace!(errors = errors.len(), "validation cache hit");
            return errors.clone();
        }
        cell.get_or_init(compute).clone()
    }

    /// Records a newly cached key and evicts the oldest beyond capacity.
    fn admit(&self, key: MemoKey) {
        let mut admitted = self.admitted.lock().unwrap_or_else(PoisonError::into_inner);
        admitted.push_back(key);
        while admitted.len() > self.capacity {
            let Some(oldest) = admitted.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            tracing::trace!(capacity = self.capacity, "validation cache eviction");
        }
    }

    /// Number of distinct inputs cached.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A value wrapped with hash-map key semantics.
#[derive(Debug, Clone)]
struct MemoKey(Value);

impl PartialEq for MemoKey {
    fn eq(&self, other: &Self) -> bool {
        same(&self.0, &other.0)
    }
}

impl Eq for MemoKey {}

impl Hash for MemoKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(&self.0, state);
    }
}

fn same(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x.to_bits() == y.to_bits(),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Date(x), Value::Date(y)) => x == y,
        (Value::Sequence(xs), Value::Sequence(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same(x, y))
        }
        (Value::Mapping(xs), Value::Mapping(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|((kx, x), (ky, y))| kx == ky && same(x, y))
        }
        _ => false,
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        Value::Null => {}
        Value::Bool(b) => b.hash(state),
        Value::Number(n) => n.to_bits().hash(state),
        Value::String(s) => s.hash(state),
        Value::Date(d) => d.hash(state),
        Value::Sequence(items) => {
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Mapping(entries) => {
            entries.len().hash(state);
            for (key, item) in entries {
                key.hash(state);
                hash_value(item, state);
            }
        }
    }
}
