//! Whack-a-Mole core crate.
//!
//! A timed reflex game: moles pop up in random holes on a configurable grid
//! and the player clicks them for points before they disappear. The mole
//! lifecycle / spawn-scheduling engine lives in [`game::engine`] and is pure
//! Rust (natively testable); [`game`] itself holds the browser wiring.

use wasm_bindgen::prelude::*;

pub mod game;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    game::start_whack_mode()
}

/// `performance.now()` with a zero fallback outside a browser context.
pub(crate) fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
