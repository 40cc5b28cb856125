//! Command bridge between the touch controller and the emulator.
//!
//! The emulator component attaches itself to a [`TargetRef`] when it mounts
//! and detaches when it goes away. A [`CommandHandle`] built from that
//! reference forwards `restart`/`press`/`release` to whatever is attached at
//! call time. With nothing attached a call is dropped: controls can be
//! touched before the engine finishes loading or after it is torn down, and
//! neither is an error. Dropped calls are never queued.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::log::{LogCategory, RateLimiter};
use crate::{log_debug, log_warn};

/// The three operations the emulator component exposes to the shell.
pub trait Target {
    type Key;

    fn restart(&mut self);
    fn button_press(&mut self, key: Self::Key);
    fn button_release(&mut self, key: Self::Key);
}

/// What a controller may do with the emulator, mounted or not.
pub trait Controls<K> {
    fn restart(&self);
    /// Returns whether the press reached a mounted emulator.
    fn press(&self, key: K) -> bool;
    fn release(&self, key: K);
}

static DROPPED: RateLimiter = RateLimiter::new(16);
static REENTRANT: RateLimiter = RateLimiter::new(16);

struct Slot<T> {
    target: RefCell<Option<T>>,
    // Bumped on every mount so a stale guard can't detach a newer instance.
    generation: Cell<u64>,
    // Set when an unmount arrives while the target is mid-call.
    detach_pending: Cell<bool>,
}

/// Shared, nullable slot holding the mounted target. Clones alias the slot.
pub struct TargetRef<T> {
    slot: Rc<Slot<T>>,
}

impl<T> TargetRef<T> {
    pub fn new() -> Self {
        TargetRef {
            slot: Rc::new(Slot {
                target: RefCell::new(None),
                generation: Cell::new(0),
                detach_pending: Cell::new(false),
            }),
        }
    }

    /// Whether a target is attached right now.
    pub fn is_live(&self) -> bool {
        match self.slot.target.try_borrow() {
            Ok(target) => target.is_some() && !self.slot.detach_pending.get(),
            // Borrowed means a call into it is in progress.
            Err(_) => !self.slot.detach_pending.get(),
        }
    }

    /// Attach `target`, replacing any instance that was still attached. The
    /// target stays attached until the returned guard is dropped or
    /// [`Mount::unmount`] is called.
    ///
    /// Mounting from inside a forwarded call is refused: `target` is dropped
    /// and the returned guard is inert.
    pub fn mount(&self, target: T) -> Mount<T> {
        let Ok(mut current) = self.slot.target.try_borrow_mut() else {
            log_warn!(LogCategory::Bridge, "mount while the target is busy; ignored");
            return Mount {
                slot: Rc::clone(&self.slot),
                generation: None,
            };
        };

        let generation = self.slot.generation.get().wrapping_add(1);
        self.slot.generation.set(generation);
        self.slot.detach_pending.set(false);
        let replaced = current.replace(target);
        drop(current);
        if replaced.is_some() {
            log_warn!(LogCategory::Bridge, "mount replaced a still-mounted target");
        }

        Mount {
            slot: Rc::clone(&self.slot),
            generation: Some(generation),
        }
    }

    /// Run `f` against the attached target. Returns `None` without calling
    /// `f` when nothing is attached or the target is already mid-call.
    pub fn with_live<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let result = {
            let mut guard = match self.slot.target.try_borrow_mut() {
                Ok(guard) => guard,
                Err(_) => {
                    log_warn!(LogCategory::Bridge, &REENTRANT => "re-entrant command dropped");
                    return None;
                }
            };
            guard.as_mut().map(f)
        };

        if self.slot.detach_pending.replace(false) {
            let detached = self.slot.target.borrow_mut().take();
            drop(detached);
        }
        result
    }

    pub fn ptr_eq(&self, other: &TargetRef<T>) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<T> Default for TargetRef<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TargetRef<T> {
    fn clone(&self) -> Self {
        TargetRef {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> fmt::Debug for TargetRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetRef")
            .field("live", &self.is_live())
            .field("generation", &self.slot.generation.get())
            .finish()
    }
}

/// Keeps a target attached to its [`TargetRef`]. Dropping it detaches.
#[must_use = "dropping the guard unmounts the target immediately"]
pub struct Mount<T> {
    slot: Rc<Slot<T>>,
    generation: Option<u64>,
}

impl<T> Mount<T> {
    /// Detach the target and hand it back. Returns `None` if a newer mount
    /// already replaced it, or if it is mid-call (it is then detached as
    /// soon as that call returns).
    pub fn unmount(mut self) -> Option<T> {
        self.detach()
    }

    fn detach(&mut self) -> Option<T> {
        let generation = self.generation.take()?;
        if self.slot.generation.get() != generation {
            return None;
        }
        self.slot.generation.set(generation.wrapping_add(1));
        match self.slot.target.try_borrow_mut() {
            Ok(mut target) => target.take(),
            Err(_) => {
                self.slot.detach_pending.set(true);
                None
            }
        }
    }
}

impl<T> Drop for Mount<T> {
    fn drop(&mut self) {
        self.detach();
    }
}

struct Forwarder<T> {
    target: TargetRef<T>,
}

impl<T> Forwarder<T> {
    fn forward(&self, op: &'static str, f: impl FnOnce(&mut T)) -> bool {
        let delivered = self.target.with_live(f).is_some();
        if !delivered && !self.target.is_live() {
            log_debug!(LogCategory::Bridge, &DROPPED => "{op} dropped: no emulator mounted");
        }
        delivered
    }
}

/// Stable handle forwarding controller commands to the mounted target.
///
/// Clones are the same handle; compare with [`CommandHandle::ptr_eq`].
pub struct CommandHandle<T> {
    inner: Rc<Forwarder<T>>,
}

impl<T> CommandHandle<T> {
    pub fn new(target: &TargetRef<T>) -> Self {
        CommandHandle {
            inner: Rc::new(Forwarder {
                target: target.clone(),
            }),
        }
    }

    pub fn ptr_eq(&self, other: &CommandHandle<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for CommandHandle<T> {
    fn clone(&self) -> Self {
        CommandHandle {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for CommandHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandle")
            .field("target", &self.inner.target)
            .finish()
    }
}

impl<T: Target> Controls<T::Key> for CommandHandle<T> {
    fn restart(&self) {
        self.inner.forward("restart", |t| t.restart());
    }

    fn press(&self, key: T::Key) -> bool {
        self.inner.forward("press", |t| t.button_press(key))
    }

    fn release(&self, key: T::Key) {
        self.inner.forward("release", |t| t.button_release(key));
    }
}

impl<K, C: Controls<K> + ?Sized> Controls<K> for Rc<C> {
    fn restart(&self) {
        (**self).restart();
    }

    fn press(&self, key: K) -> bool {
        (**self).press(key)
    }

    fn release(&self, key: K) {
        (**self).release(key);
    }
}
