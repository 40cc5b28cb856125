//! Adapter for the JavaScript emulator engine.
//!
//! The engine is an opaque JS object. The shell only ever calls three of its
//! methods: `restart()`, `buttonPress(code)` and `buttonRelease(code)`, with
//! key codes from [`GbaKey::code`]. Return values are ignored; a missing
//! method or a thrown exception is logged and otherwise absorbed.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::bridge::Target;
use crate::key::GbaKey;
use crate::log::{LogCategory, RateLimiter};
use crate::log_warn;
use crate::storage::describe_js;

static CALL_FAILURES: RateLimiter = RateLimiter::new(16);

pub struct JsEngine {
    engine: JsValue,
}

impl JsEngine {
    /// Wrap `engine`, which must be a JS object.
    pub fn new(engine: JsValue) -> Result<JsEngine, JsValue> {
        if !engine.is_object() {
            return Err(JsValue::from_str("emulator engine must be an object"));
        }
        Ok(JsEngine { engine })
    }

    fn call(&self, method: &str, args: &[JsValue]) {
        let func = match js_sys::Reflect::get(&self.engine, &JsValue::from_str(method)) {
            Ok(func) => func,
            Err(err) => {
                log_warn!(LogCategory::Bridge, &CALL_FAILURES => "engine.{method}: {}", describe_js(&err));
                return;
            }
        };
        let Some(func) = func.dyn_ref::<js_sys::Function>() else {
            log_warn!(LogCategory::Bridge, &CALL_FAILURES => "engine has no {method}() method");
            return;
        };

        let args: js_sys::Array = args.iter().collect();
        if let Err(err) = func.apply(&self.engine, &args) {
            log_warn!(LogCategory::Bridge, &CALL_FAILURES => "engine.{method} threw: {}", describe_js(&err));
        }
    }
}

impl Target for JsEngine {
    type Key = GbaKey;

    fn restart(&mut self) {
        self.call("restart", &[]);
    }

    fn button_press(&mut self, key: GbaKey) {
        self.call("buttonPress", &[JsValue::from(key.code())]);
    }

    fn button_release(&mut self, key: GbaKey) {
        self.call("buttonRelease", &[JsValue::from(key.code())]);
    }
}
