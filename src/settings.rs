//! Player settings and preferences
//!
//! Persisted in LocalStorage, separately from anything race related.

use serde::{Deserialize, Serialize};

use crate::consts::MPH_PER_KMH;

/// How race questions get answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnswerInput {
    /// Tap an option on the overlay
    #[default]
    Tap,
    /// Steer through the gate carrying the option
    Gates,
}

impl AnswerInput {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerInput::Tap => "Tap",
            AnswerInput::Gates => "Gates",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tap" | "touch" => Some(AnswerInput::Tap),
            "gates" | "gate" | "steer" => Some(AnswerInput::Gates),
            _ => None,
        }
    }
}

/// Speedometer unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedUnit {
    #[default]
    Kmh,
    Mph,
}

impl SpeedUnit {
    pub fn label(&self) -> &'static str {
        match self {
            SpeedUnit::Kmh => "KM/H",
            SpeedUnit::Mph => "MPH",
        }
    }

    /// Convert a km/h reading into this unit
    pub fn from_kmh(&self, kmh: f32) -> f32 {
        match self {
            SpeedUnit::Kmh => kmh,
            SpeedUnit::Mph => kmh * MPH_PER_KMH,
        }
    }
}

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub answer_input: AnswerInput,
    pub speed_unit: SpeedUnit,

    // === HUD ===
    /// Show the keyboard controls hint during the race
    pub show_controls_hint: bool,

    // === Attract mode ===
    /// Let the autopilot drive when the player is idle
    pub autopilot_when_idle: bool,

    // === Accessibility ===
    /// Reduced motion (no camera shake, speed lines or flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            answer_input: AnswerInput::Tap,
            speed_unit: SpeedUnit::Kmh,
            show_controls_hint: true,
            autopilot_when_idle: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Parse settings JSON, falling back to defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Speedometer reading in the preferred unit, rounded
    pub fn display_speed(&self, kmh: f32) -> u32 {
        self.speed_unit.from_kmh(kmh).max(0.0).round() as u32
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "physics_racer_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if storage.set_item(Self::STORAGE_KEY, &self.to_json()).is_ok() {
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
