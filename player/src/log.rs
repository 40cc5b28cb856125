//! Logging infrastructure for the player shell.
//!
//! Categorized console logging with a global level filter and rate limiting,
//! so chatty paths (commands dropped before the engine mounts) don't flood
//! the browser console.

use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use serde::Deserialize;

/// Log categories, one per subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Storage,
    Bridge,
    Control,
    Shell,
}

impl LogCategory {
    #[cfg_attr(not(all(target_arch = "wasm32", feature = "wasm")), allow(dead_code))]
    fn prefix(self) -> &'static str {
        match self {
            LogCategory::Storage => "[Storage]",
            LogCategory::Bridge => "[Bridge]",
            LogCategory::Control => "[Control]",
            LogCategory::Shell => "[Shell]",
        }
    }
}

/// Minimum severity that reaches the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    Off = 4,
}

impl LogLevel {
    fn from_u8(value: u8) -> LogLevel {
        match value {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warn,
            3 => LogLevel::Error,
            _ => LogLevel::Off,
        }
    }
}

static MAX_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Set the global level filter.
pub fn set_level(level: LogLevel) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Current global level filter.
pub fn level() -> LogLevel {
    LogLevel::from_u8(MAX_LEVEL.load(Ordering::Relaxed))
}

/// Whether a message at `level` passes the global filter.
pub fn enabled(level: LogLevel) -> bool {
    level != LogLevel::Off && level >= self::level()
}

/// Rate limiter that tracks how many times a particular log point has been hit.
pub struct RateLimiter {
    counter: AtomicU32,
    limit: u32,
}

impl RateLimiter {
    /// Create a new rate limiter that allows `limit` messages.
    pub const fn new(limit: u32) -> Self {
        RateLimiter {
            counter: AtomicU32::new(0),
            limit,
        }
    }

    /// Check if we should log. Returns true if under the limit.
    pub fn should_log(&self) -> bool {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        count < self.limit
    }

    /// Get current count without incrementing.
    pub fn count(&self) -> u32 {
        self.counter.load(Ordering::Relaxed)
    }
}

/// Logger that outputs to the browser console.
pub struct Logger;

impl Logger {
    pub fn debug(category: LogCategory, msg: &str) {
        if enabled(LogLevel::Debug) {
            Self::emit(LogLevel::Debug, category, msg);
        }
    }

    pub fn info(category: LogCategory, msg: &str) {
        if enabled(LogLevel::Info) {
            Self::emit(LogLevel::Info, category, msg);
        }
    }

    pub fn warn(category: LogCategory, msg: &str) {
        if enabled(LogLevel::Warn) {
            Self::emit(LogLevel::Warn, category, msg);
        }
    }

    pub fn error(category: LogCategory, msg: &str) {
        if enabled(LogLevel::Error) {
            Self::emit(LogLevel::Error, category, msg);
        }
    }

    /// Log at `level` only while `limiter` has budget left.
    pub fn limited(level: LogLevel, category: LogCategory, limiter: &RateLimiter, msg: &str) {
        if enabled(level) && limiter.should_log() {
            Self::emit(level, category, msg);
        }
    }

    #[cfg(all(target_arch = "wasm32", feature = "wasm"))]
    fn emit(level: LogLevel, category: LogCategory, msg: &str) {
        let formatted: wasm_bindgen::JsValue = format!("{} {}", category.prefix(), msg).into();
        match level {
            LogLevel::Debug => web_sys::console::debug_1(&formatted),
            LogLevel::Info => web_sys::console::log_1(&formatted),
            LogLevel::Warn => web_sys::console::warn_1(&formatted),
            LogLevel::Error => web_sys::console::error_1(&formatted),
            LogLevel::Off => {}
        }
    }

    // No console outside the browser
    #[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
    fn emit(_level: LogLevel, _category: LogCategory, _msg: &str) {}
}

/// Convenience macros for logging.
#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $limiter:expr => $($arg:tt)*) => {
        if $crate::log::enabled($crate::log::LogLevel::Debug) {
            $crate::log::Logger::limited(
                $crate::log::LogLevel::Debug,
                $cat,
                $limiter,
                &format!($($arg)*),
            )
        }
    };
    ($cat:expr, $($arg:tt)*) => {
        if $crate::log::enabled($crate::log::LogLevel::Debug) {
            $crate::log::Logger::debug($cat, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        $crate::log::Logger::info($cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $limiter:expr => $($arg:tt)*) => {
        $crate::log::Logger::limited(
            $crate::log::LogLevel::Warn,
            $cat,
            $limiter,
            &format!($($arg)*),
        )
    };
    ($cat:expr, $($arg:tt)*) => {
        $crate::log::Logger::warn($cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        $crate::log::Logger::error($cat, &format!($($arg)*))
    };
}
