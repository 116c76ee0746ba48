pub mod actions;
pub mod api;
#[cfg(not(target_arch = "wasm32"))]
pub mod console;
#[cfg(not(target_arch = "wasm32"))]
pub mod session;
#[cfg(all(test, not(target_arch = "wasm32")))]
pub(crate) mod testing;
