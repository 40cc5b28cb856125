//! Preferences that survive page reloads.
//!
//! Values are stored as JSON under a caller-chosen key. Loading never fails:
//! a missing, unreadable, or malformed entry yields the caller's default.
//! Saving never fails either: the in-memory value changes first and a
//! persistence failure only costs durability. Keys are not namespaced here;
//! two call sites using the same key share one slot.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;
use crate::log::LogCategory;
use crate::log_warn;
use crate::storage::StorageMedium;

/// Read and decode the value stored under `key`.
///
/// An empty stored string counts as absent.
pub fn try_load<T: DeserializeOwned>(
    medium: &dyn StorageMedium,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = medium.get_item(key)? else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Deserialize {
            key: key.to_string(),
            source,
        })
}

/// Encode `value` and write it under `key`. Nothing is written unless the
/// whole value serialized.
pub fn try_save<T: Serialize + ?Sized>(
    medium: &dyn StorageMedium,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    medium.set_item(key, &raw)
}

/// Load the value under `key`, or `default` if there is none or it cannot
/// be read.
pub fn load<T: DeserializeOwned>(medium: &dyn StorageMedium, key: &str, default: T) -> T {
    match try_load(medium, key) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(err) => {
            log_warn!(LogCategory::Storage, "{err}; falling back to default");
            default
        }
    }
}

/// Persist `value` under `key`, discarding any failure.
pub fn save<T: Serialize + ?Sized>(medium: &dyn StorageMedium, key: &str, value: &T) {
    if let Err(err) = try_save(medium, key, value) {
        log_warn!(LogCategory::Storage, "{err}; value kept in memory only");
    }
}

/// Forget the value under `key`, discarding any failure.
pub fn clear(medium: &dyn StorageMedium, key: &str) {
    if let Err(err) = medium.remove_item(key) {
        log_warn!(LogCategory::Storage, "{err}");
    }
}

struct Slot<T> {
    key: String,
    medium: Rc<dyn StorageMedium>,
    current: RefCell<T>,
}

impl<T: Serialize> Slot<T> {
    fn set(&self, value: T) {
        *self.current.borrow_mut() = value;
        save(&*self.medium, &self.key, &*self.current.borrow());
    }

    fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.current.borrow_mut());
        save(&*self.medium, &self.key, &*self.current.borrow());
    }
}

/// A persisted value plus its in-memory current value.
///
/// The current value is always defined: the last value set, else the value
/// loaded at construction, else the default.
pub struct Preference<T> {
    slot: Rc<Slot<T>>,
    default: T,
}

impl<T> Preference<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    pub fn load(medium: Rc<dyn StorageMedium>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let initial = load(&*medium, &key, default.clone());
        Preference {
            slot: Rc::new(Slot {
                key,
                medium,
                current: RefCell::new(initial),
            }),
            default,
        }
    }

    pub fn key(&self) -> &str {
        &self.slot.key
    }

    pub fn get(&self) -> T {
        self.slot.current.borrow().clone()
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.slot.current.borrow()
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn set(&self, value: T) {
        self.slot.set(value);
    }

    /// Modify the current value in place, then persist it.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.slot.update(f);
    }

    /// Drop the stored value and go back to the default.
    pub fn reset(&self) {
        *self.slot.current.borrow_mut() = self.default.clone();
        clear(&*self.slot.medium, &self.slot.key);
    }

    /// A write handle bound to this preference. Every call returns the same
    /// handle, and it stays valid for as long as any clone of it lives.
    pub fn setter(&self) -> PreferenceSetter<T> {
        PreferenceSetter {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Preference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preference")
            .field("key", &self.slot.key)
            .field("current", &*self.slot.current.borrow())
            .finish()
    }
}

/// Stable write access to a [`Preference`], safe to hand to other components.
pub struct PreferenceSetter<T> {
    slot: Rc<Slot<T>>,
}

impl<T: Serialize> PreferenceSetter<T> {
    pub fn set(&self, value: T) {
        self.slot.set(value);
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.slot.update(f);
    }

    pub fn ptr_eq(&self, other: &PreferenceSetter<T>) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<T> Clone for PreferenceSetter<T> {
    fn clone(&self) -> Self {
        PreferenceSetter {
            slot: Rc::clone(&self.slot),
        }
    }
}
