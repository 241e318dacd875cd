//! The data store: current-value slots plus a per-key-type history index.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::error::StoreError;
use crate::key::StoreKey;

/// Keyed value store with change detection and per-key-type history.
///
/// The store holds one current value per key (addressed by the key's
/// canonical string form) and, for typed keys, an append-only history of
/// every value ever set under each key type. Current values and history
/// are independent: deleting a slot does not rewrite the past.
#[derive(Debug, Default)]
pub struct DataStore {
    /// Current value per canonical key string.
    slots: BTreeMap<String, Value>,

    /// Every value ever set through a typed key, per key type, in write
    /// order. Raw keys never appear here.
    history: BTreeMap<String, Vec<Value>>,
}

impl DataStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            history: BTreeMap::new(),
        }
    }

    /// Return the current value at `key`, or `None` if the slot is empty.
    pub fn get(&self, key: &StoreKey) -> Option<&Value> {
        self.slots.get(&key.to_string())
    }

    /// Return the current value at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the slot is empty.
    pub fn fetch(&self, key: &StoreKey) -> Result<&Value, StoreError> {
        self.get(key).ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
        })
    }

    /// Set the value at `key`. Returns `true` iff the value differs from
    /// the prior value at that key, or the key had no prior value.
    ///
    /// A write through a typed key is always appended to that key type's
    /// history, changed or not -- the history records every value ever
    /// set, not every distinct value.
    pub fn set(&mut self, key: &StoreKey, value: Value) -> bool {
        let slot = key.to_string();
        let changed = self.slots.get(&slot) != Some(&value);

        if let StoreKey::Typed { key_type, .. } = key {
            self.history
                .entry(key_type.clone())
                .or_default()
                .push(value.clone());
        }

        trace!(key = %slot, changed, "store set");
        self.slots.insert(slot, value);
        changed
    }

    /// Serialize `value` and set it at `key`. Returns the change flag
    /// from [`DataStore::set`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serde`] if serialization fails.
    pub fn set_value<T: Serialize>(
        &mut self,
        key: &StoreKey,
        value: &T,
    ) -> Result<bool, StoreError> {
        let json = serde_json::to_value(value).map_err(|source| StoreError::Serde {
            key: key.to_string(),
            source,
        })?;
        Ok(self.set(key, json))
    }

    /// Remove and return the current value at `key`, if any.
    ///
    /// History is untouched: the per-type index records every value ever
    /// set under the key type, and slot deletion does not rewrite it.
    pub fn delete(&mut self, key: &StoreKey) -> Option<Value> {
        let slot = key.to_string();
        let removed = self.slots.remove(&slot);
        trace!(key = %slot, removed = removed.is_some(), "store delete");
        removed
    }

    /// Return every value ever set under `key_type`, in write order.
    ///
    /// Returns an empty slice for a key type that has never been written.
    pub fn list_by_type(&self, key_type: &str) -> &[Value] {
        self.history.get(key_type).map_or(&[], Vec::as_slice)
    }

    /// Deserialize the current value at `key`, or `None` if the slot is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serde`] if the stored value does not
    /// deserialize into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &StoreKey) -> Result<Option<T>, StoreError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|source| StoreError::Serde {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    /// Deserialize the current value at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the slot is empty, or
    /// [`StoreError::Serde`] if the stored value does not deserialize
    /// into `T`.
    pub fn fetch_as<T: DeserializeOwned>(&self, key: &StoreKey) -> Result<T, StoreError> {
        let value = self.fetch(key)?;
        serde_json::from_value(value.clone()).map_err(|source| StoreError::Serde {
            key: key.to_string(),
            source,
        })
    }

    /// Whether a current value exists at `key`.
    pub fn contains(&self, key: &StoreKey) -> bool {
        self.slots.contains_key(&key.to_string())
    }

    /// Number of occupied slots (current values only, not history).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the store holds no current values.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop all current values and all history.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.history.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn set_reports_change_against_prior_value() {
        let mut store = DataStore::new();
        let key = StoreKey::raw("counter");

        // No prior value: changed.
        assert!(store.set(&key, json!(1)));
        // Same value: unchanged.
        assert!(!store.set(&key, json!(1)));
        // Different value: changed.
        assert!(store.set(&key, json!(2)));
    }

    #[test]
    fn get_after_delete_is_absent() {
        let mut store = DataStore::new();
        let key = StoreKey::raw("transient");

        let _ = store.set(&key, json!("here"));
        assert_eq!(store.delete(&key), Some(json!("here")));
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn fetch_after_delete_fails_with_not_found() {
        let mut store = DataStore::new();
        let key = StoreKey::typed("Agent", "7");

        let _ = store.set(&key, json!({"hp": 10}));
        let _ = store.delete(&key);

        let err = store.fetch(&key).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(err.to_string(), "entry not found: Agent:7");
    }

    #[test]
    fn typed_keys_accrue_per_type_history_in_order() {
        let mut store = DataStore::new();

        let _ = store.set(&StoreKey::typed("X", "1"), json!("v1"));
        let _ = store.set(&StoreKey::typed("X", "2"), json!("v2"));

        assert_eq!(store.list_by_type("X"), &[json!("v1"), json!("v2")]);
    }

    #[test]
    fn history_records_unchanged_writes_too() {
        let mut store = DataStore::new();
        let key = StoreKey::typed("Tick", "round");

        let _ = store.set(&key, json!(1));
        let _ = store.set(&key, json!(1));

        assert_eq!(store.list_by_type("Tick").len(), 2);
    }

    #[test]
    fn raw_keys_are_not_history_tracked() {
        let mut store = DataStore::new();

        let _ = store.set(&StoreKey::raw("loose"), json!("value"));
        assert!(store.list_by_type("loose").is_empty());
    }

    #[test]
    fn delete_leaves_history_intact() {
        let mut store = DataStore::new();
        let key = StoreKey::typed("Log", "entry");

        let _ = store.set(&key, json!("a"));
        let _ = store.set(&key, json!("b"));
        let _ = store.delete(&key);

        assert!(store.get(&key).is_none());
        assert_eq!(store.list_by_type("Log"), &[json!("a"), json!("b")]);
    }

    #[test]
    fn unknown_type_history_is_empty() {
        let store = DataStore::new();
        assert!(store.list_by_type("Never").is_empty());
    }

    #[test]
    fn typed_accessors_round_trip() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Marker {
            label: String,
            count: u32,
        }

        let mut store = DataStore::new();
        let key = StoreKey::typed("Marker", "main");
        let marker = Marker {
            label: String::from("spawn"),
            count: 3,
        };

        assert!(store.set_value(&key, &marker).unwrap());
        let restored: Marker = store.fetch_as(&key).unwrap();
        assert_eq!(restored, marker);

        let maybe: Option<Marker> = store.get_as(&StoreKey::raw("absent")).unwrap();
        assert!(maybe.is_none());
    }

    #[test]
    fn fetch_as_rejects_mismatched_shape() {
        let mut store = DataStore::new();
        let key = StoreKey::raw("shape");
        let _ = store.set(&key, json!("not a number"));

        let err = store.fetch_as::<u64>(&key).unwrap_err();
        assert!(matches!(err, StoreError::Serde { .. }));
    }

    #[test]
    fn clear_drops_slots_and_history() {
        let mut store = DataStore::new();
        let _ = store.set(&StoreKey::typed("T", "1"), json!(1));
        let _ = store.set(&StoreKey::raw("r"), json!(2));
        assert_eq!(store.len(), 2);

        store.clear();
        assert!(store.is_empty());
        assert!(store.list_by_type("T").is_empty());
    }
}
