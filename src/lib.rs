//! Physics Racer - a quiz-gated drag race
//!
//! Core modules:
//! - `sim`: Race simulation (gearbox, RPM, answer gates, finish detection)
//! - `session`: Owns a single race, queues player intents, drives the fixed step
//! - `catalog`: Car table unlocked by quiz score
//! - `questions`: Physics question bank
//! - `tuning`: Data-driven race balance
//! - `hud`: Gauge readout in the player's units
//! - `results`: Post-race telemetry report
//! - `settings`: Persisted player preferences

pub mod catalog;
pub mod hud;
pub mod questions;
pub mod results;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use catalog::{CarConfig, CarTier, car_for_score};
pub use hud::HudReadout;
pub use questions::PhysicsQuestion;
pub use results::RaceReport;
pub use session::RaceSession;
pub use settings::{AnswerInput, Settings, SpeedUnit};
pub use tuning::{RaceTuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame deltas above this are dropped (tab was backgrounded)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Seconds without input before the idle autopilot takes over
    pub const IDLE_AUTOPILOT_SECS: f32 = 5.0;

    /// Sim speed units to km/h for the speedometer
    pub const KMH_PER_SPEED_UNIT: f32 = 0.8;
    pub const MPH_PER_KMH: f32 = 0.621_371;

    /// Lateral spacing between lanes (world units)
    pub const LANE_WIDTH: f32 = 3.5;
    /// Lateral steering response (1/s)
    pub const LANE_CHANGE_RATE: f32 = 5.0;
}
