//! Store keys: raw string slots and structured, history-tracked keys.
//!
//! A [`StoreKey`] addresses one slot in the data store. Raw keys are
//! plain strings and participate only in current-value storage.
//! Typed keys carry a key type and an id, render canonically as
//! `"KeyType:id"`, and additionally feed the per-type history index:
//! every value written through a typed key is appended to that key
//! type's history.

/// A key addressing one slot in the [`DataStore`].
///
/// [`DataStore`]: crate::DataStore
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreKey {
    /// A raw string slot. Not tracked in per-type history.
    Raw(String),

    /// A structured key whose canonical form is `"KeyType:id"`.
    /// Writes through typed keys are tracked in per-type history.
    Typed {
        /// The key type, shared by all keys of the same kind.
        key_type: String,
        /// The id distinguishing this key within its type.
        id: String,
    },
}

impl StoreKey {
    /// Create a raw string key.
    pub fn raw(slot: impl Into<String>) -> Self {
        Self::Raw(slot.into())
    }

    /// Create a structured key with the given type and id.
    pub fn typed(key_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Typed {
            key_type: key_type.into(),
            id: id.into(),
        }
    }

    /// Return the key type for typed keys, or `None` for raw keys.
    pub fn key_type(&self) -> Option<&str> {
        match self {
            Self::Raw(_) => None,
            Self::Typed { key_type, .. } => Some(key_type),
        }
    }
}

impl core::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Raw(slot) => write!(f, "{slot}"),
            Self::Typed { key_type, id } => write!(f, "{key_type}:{id}"),
        }
    }
}

impl From<&str> for StoreKey {
    fn from(slot: &str) -> Self {
        Self::Raw(slot.to_owned())
    }
}

impl From<String> for StoreKey {
    fn from(slot: String) -> Self {
        Self::Raw(slot)
    }
}
