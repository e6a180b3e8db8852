//! Browser platform layer
//!
//! Handles start-up and event wiring for:
//! - The balance beam page (pointer drags, mode toggle, table inputs, resize)
//! - The ramp page (sliders, buttons, animation frames)
//!
//! Either lab attaches only when its elements are on the page.

mod beam;
pub mod dom;
mod ramp;

use crate::settings::Settings;

/// Install logging, load settings and attach whichever labs are present
pub fn run() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

    log::info!("Beam & Ramp Lab starting...");

    let settings = Settings::load();
    beam::attach(&settings);
    ramp::attach(&settings);
}
