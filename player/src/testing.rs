//! Test doubles shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::bridge::Target;
use crate::error::StorageError;
use crate::storage::{MemoryStorage, StorageMedium};

/// A medium whose reads and writes can be made to fail on demand.
#[derive(Default)]
pub struct FailingStorage {
    inner: MemoryStorage,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl StorageMedium for FailingStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.get() {
            return Err(StorageError::Read {
                key: key.to_string(),
                reason: "SecurityError".to_string(),
            });
        }
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: "QuotaExceededError".to_string(),
            });
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: "QuotaExceededError".to_string(),
            });
        }
        self.inner.remove_item(key)
    }
}

/// One forwarded call as seen by a [`RecordingTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call<K> {
    Restart,
    Press(K),
    Release(K),
}

/// A target that records every call it receives. Clones share one log, so a
/// test can keep a clone while the original is mounted.
pub struct RecordingTarget<K> {
    calls: Rc<RefCell<Vec<Call<K>>>>,
}

impl<K: Clone> RecordingTarget<K> {
    pub fn new() -> Self {
        RecordingTarget {
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<Call<K>> {
        self.calls.borrow().clone()
    }
}

impl<K> Clone for RecordingTarget<K> {
    fn clone(&self) -> Self {
        RecordingTarget {
            calls: Rc::clone(&self.calls),
        }
    }
}

impl<K> Target for RecordingTarget<K> {
    type Key = K;

    fn restart(&mut self) {
        self.calls.borrow_mut().push(Call::Restart);
    }

    fn button_press(&mut self, key: K) {
        self.calls.borrow_mut().push(Call::Press(key));
    }

    fn button_release(&mut self, key: K) {
        self.calls.borrow_mut().push(Call::Release(key));
    }
}
