//! WASM bindings for the hosting page.

use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::bridge::{CommandHandle, Mount};
use crate::config::ShellConfig;
use crate::controller::Controller;
use crate::emulator::JsEngine;
use crate::key::GbaKey;
use crate::log::{self, LogCategory};
use crate::shell::Shell;
use crate::storage::{LocalStorage, MemoryStorage, StorageMedium};
use crate::{log_error, log_info, log_warn};

/// Initialize panic hook for better error messages in WASM.
/// This is called once when the WASM module is instantiated.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// `localStorage` when the browser allows it, otherwise an in-memory map
/// that lasts until the page is closed.
fn open_storage() -> Rc<dyn StorageMedium> {
    match LocalStorage::open() {
        Ok(storage) => Rc::new(storage),
        Err(err) => {
            log_warn!(LogCategory::Storage, "{err}; preferences will not persist");
            Rc::new(MemoryStorage::new())
        }
    }
}

fn key_from_code(code: u8) -> Result<GbaKey, JsValue> {
    GbaKey::from_code(code).ok_or_else(|| JsValue::from_str(&format!("unknown key code {code}")))
}

#[wasm_bindgen]
pub struct PlayerShell {
    shell: Shell<JsEngine>,
    controller: Controller<CommandHandle<JsEngine>>,
    mount: Option<Mount<JsEngine>>,
}

#[wasm_bindgen]
impl PlayerShell {
    /// `config_json` is an optional JSON object; see `ShellConfig`. A bad
    /// configuration is logged and replaced by the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> PlayerShell {
        let config = match config_json.as_deref() {
            Some(json) => ShellConfig::from_json(json).unwrap_or_else(|err| {
                log_warn!(LogCategory::Shell, "{err}; using defaults");
                ShellConfig::default()
            }),
            None => ShellConfig::default(),
        };
        log::set_level(config.log_level);
        log_info!(LogCategory::Shell, "PlayerShell::new() - game {}", config.game_url);

        let shell = Shell::new(config);
        let controller = shell.controller(open_storage());
        PlayerShell {
            shell,
            controller,
            mount: None,
        }
    }

    #[wasm_bindgen(getter, js_name = gameUrl)]
    pub fn game_url(&self) -> String {
        self.shell.game_url().to_string()
    }

    /// Attach a started engine. A previously mounted engine is replaced.
    #[wasm_bindgen(js_name = mountEmulator)]
    pub fn mount_emulator(&mut self, engine: JsValue) -> Result<(), JsValue> {
        let engine = JsEngine::new(engine).inspect_err(|_| {
            log_error!(LogCategory::Shell, "mountEmulator() needs an engine object");
        })?;
        self.mount = Some(self.shell.mount_emulator(engine));
        Ok(())
    }

    /// Detach the engine, e.g. before the page tears it down.
    #[wasm_bindgen(js_name = unmountEmulator)]
    pub fn unmount_emulator(&mut self) {
        if self.mount.take().is_some() {
            log_info!(LogCategory::Shell, "emulator unmounted");
        }
    }

    #[wasm_bindgen(js_name = isEmulatorMounted)]
    pub fn is_emulator_mounted(&self) -> bool {
        self.shell.is_emulator_mounted()
    }

    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&mut self, code: u8) -> Result<(), JsValue> {
        self.controller.touch_start(key_from_code(code)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = touchEnd)]
    pub fn touch_end(&mut self, code: u8) -> Result<(), JsValue> {
        self.controller.touch_end(key_from_code(code)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = touchCancel)]
    pub fn touch_cancel(&mut self) {
        self.controller.touch_cancel();
    }

    pub fn restart(&mut self) {
        self.controller.restart();
    }

    /// Current layout as a JSON string.
    #[wasm_bindgen(js_name = layoutJson)]
    pub fn layout_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.controller.layout())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = setOpacity)]
    pub fn set_opacity(&self, opacity: f64) {
        self.controller.set_opacity(opacity);
    }

    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&self, scale: f64) {
        self.controller.set_scale(scale);
    }

    #[wasm_bindgen(js_name = toggleSwapAb)]
    pub fn toggle_swap_ab(&self) {
        self.controller.toggle_swap_ab();
    }

    #[wasm_bindgen(js_name = setShowShoulders)]
    pub fn set_show_shoulders(&mut self, show: bool) {
        self.controller.set_show_shoulders(show);
    }

    #[wasm_bindgen(js_name = resetLayout)]
    pub fn reset_layout(&self) {
        self.controller.reset_layout();
    }

    /// Key codes to draw, in drawing order.
    #[wasm_bindgen(js_name = visibleKeys)]
    pub fn visible_keys(&self) -> Vec<u8> {
        self.controller
            .visible_keys()
            .into_iter()
            .map(GbaKey::code)
            .collect()
    }
}
