// Core shell modules (always compiled)
pub mod bridge;
pub mod config;
pub mod controller;
pub mod error;
pub mod key;
pub mod log;
pub mod preference;
pub mod shell;
pub mod storage;

#[cfg(test)]
mod testing;

// Browser-only modules
#[cfg(feature = "wasm")]
pub mod emulator;

#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::*;
