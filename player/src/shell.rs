//! The page-level coordinator.
//!
//! [`Shell`] owns the target reference the emulator mounts into and builds
//! the one command handle the controller gets. It holds no state of its own
//! beyond that wiring and the static configuration.

use std::cell::OnceCell;
use std::rc::Rc;

use crate::bridge::{CommandHandle, Mount, Target, TargetRef};
use crate::config::ShellConfig;
use crate::controller::{Controller, ControllerLayout};
use crate::key::GbaKey;
use crate::log::LogCategory;
use crate::log_info;
use crate::preference::Preference;
use crate::storage::StorageMedium;

pub struct Shell<T> {
    config: ShellConfig,
    target: TargetRef<T>,
    handle: OnceCell<CommandHandle<T>>,
}

impl<T: Target> Shell<T> {
    pub fn new(config: ShellConfig) -> Self {
        Shell {
            config,
            target: TargetRef::new(),
            handle: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// The ROM the emulator component should load.
    pub fn game_url(&self) -> &str {
        &self.config.game_url
    }

    /// Attach a started emulator instance. It stays reachable through
    /// [`Shell::handle`] until the guard is dropped.
    pub fn mount_emulator(&self, emulator: T) -> Mount<T> {
        log_info!(LogCategory::Shell, "emulator mounted ({})", self.config.game_url);
        self.target.mount(emulator)
    }

    pub fn is_emulator_mounted(&self) -> bool {
        self.target.is_live()
    }

    /// The command handle for this shell. Built on first use, then the same
    /// handle every time.
    pub fn handle(&self) -> CommandHandle<T> {
        self.handle
            .get_or_init(|| CommandHandle::new(&self.target))
            .clone()
    }
}

impl<T: Target<Key = GbaKey>> Shell<T> {
    /// Build the touch controller, wired to this shell's handle and to the
    /// layout stored under the configured key.
    pub fn controller(&self, storage: Rc<dyn StorageMedium>) -> Controller<CommandHandle<T>> {
        let layout = Preference::load(
            storage,
            self.config.layout_key.clone(),
            ControllerLayout::default(),
        );
        Controller::new(self.handle(), layout)
    }
}
