pub mod config;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod io;
pub mod state;
