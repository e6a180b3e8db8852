//! Beam & Ramp Lab - two browser physics teaching simulations
//!
//! Core modules:
//! - `sim`: Platform-free lab state (drag engine, balance physics, results
//!   table, ramp timeline)
//! - `renderer`: DOM rendering adapters that apply sim decisions to elements
//! - `platform`: Browser event wiring (pointer, input, resize, frames)
//! - `settings`: Lab configuration

pub mod error;
#[cfg(target_arch = "wasm32")]
pub mod platform;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{FieldError, LabError};
pub use settings::{RampSettings, Settings};

/// Lab configuration constants
pub mod consts {
    /// Logical beam slots run from -MAX_SLOT to +MAX_SLOT
    pub const MAX_SLOT: i32 = 12;
    /// Number of spacing intervals across the usable beam width
    pub const SLOT_INTERVALS: f32 = 24.0;
    /// Scale inset so ticks/labels/zones/snap sit inside the beam ends
    pub const SCALE_INSET_PX: f32 = 40.0;
    /// Beam width used when the beam surface cannot be measured (980 * 0.95)
    pub const DEFAULT_BEAM_WIDTH_PX: f32 = 931.0;

    /// Snap catchment margins around the beam bounding box
    pub const CATCH_MARGIN_X: f32 = 40.0;
    pub const CATCH_MARGIN_TOP: f32 = 160.0;
    pub const CATCH_MARGIN_BOTTOM: f32 = 240.0;

    /// Force per kilogram on the beam (N/kg, rounded for classroom sums)
    pub const GRAVITY_N_PER_KG: f64 = 10.0;
    /// Maximum beam tilt either way (degrees)
    pub const MAX_ROTATION_DEG: f64 = 15.0;
    /// |total moment| below this counts as balanced
    pub const BALANCE_THRESHOLD: f64 = 0.1;

    /// Force arrow visuals
    pub const ARROW_PX_PER_NEWTON: f64 = 0.8;
    pub const ARROW_MIN_PX: f64 = 12.0;
    pub const ARROW_MAX_PX: f64 = 60.0;

    /// Answer tolerances
    pub const BASIC_MOMENT_TOLERANCE: f64 = 1e-6;
    pub const ADVANCED_MOMENT_TOLERANCE: f64 = 1e-2;
    pub const SPEED_RELATIVE_TOLERANCE: f64 = 0.05;

    /// Ramp kinematics (SI units)
    pub const RAMP_GRAVITY: f64 = 9.81;
    pub const RAMP_LENGTH_M: f64 = 1.0;
    /// Distance from the ramp foot to gate 1
    pub const GATE_LEAD_M: f64 = 0.1;
    /// Runout past gate 2 before the car stops
    pub const RUNOUT_M: f64 = 0.1;
    pub const TRIALS_PER_SET: usize = 3;
}

/// Round to `digits` significant figures
pub fn round_sig_figs(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10f64.powi(digits as i32 - 1 - magnitude);
    (value * scale).round() / scale
}

/// Convert a slider value in centimetres to metres
#[inline]
pub fn cm_to_m(cm: f64) -> f64 {
    cm / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_sig_figs() {
        assert!((round_sig_figs(0.498339, 2) - 0.50).abs() < 1e-12);
        assert!((round_sig_figs(123.0, 2) - 120.0).abs() < 1e-9);
        assert!((round_sig_figs(-0.0123, 2) + 0.012).abs() < 1e-12);
        assert_eq!(round_sig_figs(0.0, 2), 0.0);
    }
}
