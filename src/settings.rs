//! Lab settings
//!
//! Read once at start-up from an optional JSON block on the page. Never
//! written back: the labs keep no state between sessions.

use serde::{Deserialize, Serialize};

use crate::error::LabError;

/// Ramp lab defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampSettings {
    /// Initial ramp height slider value (cm)
    pub height_cm: f64,
    /// Initial gate distance slider value (cm)
    pub gate_distance_cm: f64,
    /// Relative noise applied to the displayed timer (0.05 = ±5%)
    pub jitter_fraction: f64,
    /// Animation speed multiplier (1.0 = real time)
    pub playback_rate: f64,
    /// Fixed jitter seed; `None` seeds from the clock
    pub seed: Option<u64>,
}

impl Default for RampSettings {
    fn default() -> Self {
        Self {
            height_cm: 30.0,
            gate_distance_cm: 50.0,
            jitter_fraction: 0.05,
            playback_rate: 1.0,
            seed: None,
        }
    }
}

/// Lab settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Balance beam ===
    /// Start in Advanced mode (one table row per mass, no side limit)
    pub advanced_mode: bool,
    /// How long a placement notice stays up (ms)
    pub notice_ms: u32,
    /// Delay between fade-out and removal of the notice element (ms)
    pub notice_fade_ms: u32,

    // === Ramp ===
    pub ramp: RampSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            advanced_mode: false,
            notice_ms: 2000,
            notice_fade_ms: 260,
            ramp: RampSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, LabError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Clamp values the simulations cannot use
    fn sanitize(&mut self) {
        self.ramp.jitter_fraction = self.ramp.jitter_fraction.clamp(0.0, 0.5);
        if !(self.ramp.playback_rate > 0.0) {
            self.ramp.playback_rate = 1.0;
        }
        self.ramp.height_cm = self.ramp.height_cm.max(0.0);
        self.ramp.gate_distance_cm = self.ramp.gate_distance_cm.max(0.0);
    }

    /// Element holding the optional JSON config
    #[allow(dead_code)]
    const CONFIG_ELEMENT_ID: &'static str = "lab-config";

    /// Load settings from the page's config block (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        if let Some(json) = text {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded lab settings from #{}", Self::CONFIG_ELEMENT_ID);
                    return settings;
                }
                Err(e) => log::warn!("{e}; using defaults"),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{"advanced_mode": true, "ramp": {"seed": 7}}"#).unwrap();
        assert!(s.advanced_mode);
        assert_eq!(s.notice_ms, 2000);
        assert_eq!(s.ramp.seed, Some(7));
        assert_eq!(s.ramp.height_cm, 30.0);
    }

    #[test]
    fn test_sanitize() {
        let s = Settings::from_json(
            r#"{"ramp": {"jitter_fraction": 3.0, "playback_rate": -1.0, "height_cm": -5}}"#,
        )
        .unwrap();
        assert_eq!(s.ramp.jitter_fraction, 0.5);
        assert_eq!(s.ramp.playback_rate, 1.0);
        assert_eq!(s.ramp.height_cm, 0.0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Settings::from_json("{not json"),
            Err(LabError::Settings(_))
        ));
    }
}
