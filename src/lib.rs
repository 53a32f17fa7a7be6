//! Desktop cursor intro.
//!
//! Replays a recorded mouse path over a simulated Windows desktop, clicks the
//! portfolio shortcut and opens the portfolio window. The path model, click
//! logic and playback stepping in [`cursor`] are plain Rust and testable on the
//! host; [`desktop`] binds them to the page through wasm-bindgen.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod cursor;
pub mod desktop;

pub use config::DesktopConfig;
pub use cursor::{Point, Rect, Trajectory, TrajectoryStore, Waypoint};
pub use desktop::{
    cancel_cursor_intro, download_cursor_path, init_desktop, launch_desktop_intro, preview_cursor_intro,
    recorded_cursor_path, reveal_portfolio_window,
};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

pub(crate) fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
