//! Data-driven race balance
//!
//! Every constant the race loop reads lives here so it can be tuned from JSON
//! without touching the algorithm.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of forward gears the gearbox supports
pub const MAX_GEARS: usize = 6;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("gear ratio table must have 1..={MAX_GEARS} entries (got {0})")]
    GearCount(usize),
    #[error("gear ratio {gear} must be positive (got {ratio})")]
    GearRatio { gear: usize, ratio: f32 },
    #[error("{field} range is inverted: {min} > {max}")]
    InvertedRange { field: &'static str, min: f32, max: f32 },
}

/// Race balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceTuning {
    // === Race ===
    pub race_distance: f32,
    pub countdown_secs: f32,

    // === Questions ===
    /// Race time before the first question may appear
    pub first_question_at: f32,
    pub question_interval_min: f32,
    pub question_interval_max: f32,
    pub race_question_count: usize,
    /// Pause after an answer before racing resumes
    pub answer_display_secs: f32,

    // === Nitro boost (correct answer) ===
    pub boost_duration: f32,
    pub boost_multiplier: f32,
    pub boost_speed_factor: f32,

    // === Drag penalty (wrong answer) ===
    pub penalty_duration: f32,
    pub penalty_accel_factor: f32,
    pub penalty_speed_factor: f32,

    // === Player physics ===
    /// Acceleration stat 100 maps to this
    pub accel_scale: f32,
    /// Top speed stat 100 maps to this
    pub top_speed_scale: f32,
    /// Drag at top speed, as a fraction of base acceleration
    pub drag_coefficient: f32,

    // === Drivetrain ===
    /// Indexed by gear - 1. RPM is speed * rpm_per_speed / ratio, so higher
    /// gears carry larger ratios.
    pub gear_ratios: Vec<f32>,
    pub rpm_per_speed: f32,
    /// Fraction of the gap to target RPM closed per 60 Hz frame
    pub rpm_smoothing: f32,
    /// Tachometer full scale
    pub max_rpm: f32,
    pub torque_low_rpm: f32,
    /// Torque factor at 0 RPM
    pub torque_low_floor: f32,
    pub torque_redline_rpm: f32,
    /// Torque lost per 1000 RPM over the redline
    pub torque_redline_falloff: f32,

    // === Shift grading ===
    pub shift_perfect_min: f32,
    pub shift_perfect_max: f32,
    pub shift_good_min: f32,
    pub shift_bonus_perfect: f32,
    pub shift_bonus_good: f32,
    pub shift_penalty_late: f32,
    pub shift_penalty_early: f32,
    /// Shift bonus lost per second
    pub shift_bonus_bleed: f32,
    /// Shift penalty recovered per second
    pub shift_penalty_recovery: f32,
    pub shift_feedback_secs: f32,

    // === Opponent ===
    pub opponent_accel: f32,
    pub opponent_top_speed: f32,

    // === Answer gates ===
    pub gate_spawn_distance: f32,
    pub gate_speed: f32,
}

impl Default for RaceTuning {
    fn default() -> Self {
        Self {
            race_distance: 1000.0,
            countdown_secs: 3.0,

            first_question_at: 4.0,
            question_interval_min: 6.5,
            question_interval_max: 10.0,
            race_question_count: 8,
            answer_display_secs: 2.0,

            boost_duration: 2.0,
            boost_multiplier: 1.6,
            boost_speed_factor: 1.2,

            penalty_duration: 1.5,
            penalty_accel_factor: 0.3,
            penalty_speed_factor: 0.5,

            accel_scale: 350.0,
            top_speed_scale: 580.0,
            drag_coefficient: 0.2,

            gear_ratios: vec![0.8, 1.0, 1.3, 1.8, 2.5, 4.0],
            rpm_per_speed: 40.0,
            rpm_smoothing: 0.1,
            max_rpm: 8000.0,
            torque_low_rpm: 3000.0,
            torque_low_floor: 0.6,
            torque_redline_rpm: 7000.0,
            torque_redline_falloff: 0.5,

            shift_perfect_min: 6200.0,
            shift_perfect_max: 6800.0,
            shift_good_min: 5500.0,
            shift_bonus_perfect: 1.0,
            shift_bonus_good: 0.5,
            shift_penalty_late: -0.2,
            shift_penalty_early: -0.5,
            shift_bonus_bleed: 2.0,
            shift_penalty_recovery: 1.0,
            shift_feedback_secs: 1.0,

            opponent_accel: 210.0,
            opponent_top_speed: 440.0,

            gate_spawn_distance: 30.0,
            gate_speed: 20.0,
        }
    }
}

impl RaceTuning {
    /// Parse and validate tuning from JSON (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: RaceTuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Highest gear number (1-based)
    pub fn top_gear(&self) -> u8 {
        self.gear_ratios.len() as u8
    }

    /// Ratio for a 1-based gear, clamped into the table
    pub fn gear_ratio(&self, gear: u8) -> f32 {
        let idx = (gear.max(1) as usize - 1).min(self.gear_ratios.len().saturating_sub(1));
        self.gear_ratios.get(idx).copied().unwrap_or(1.0)
    }

    /// Reject tables the integrator can't run safely
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("race_distance", self.race_distance),
            ("countdown_secs", self.countdown_secs),
            ("question_interval_min", self.question_interval_min),
            ("answer_display_secs", self.answer_display_secs),
            ("boost_duration", self.boost_duration),
            ("penalty_duration", self.penalty_duration),
            ("accel_scale", self.accel_scale),
            ("top_speed_scale", self.top_speed_scale),
            ("rpm_per_speed", self.rpm_per_speed),
            ("rpm_smoothing", self.rpm_smoothing),
            ("max_rpm", self.max_rpm),
            ("torque_low_rpm", self.torque_low_rpm),
            ("torque_redline_falloff", self.torque_redline_falloff),
            ("shift_bonus_bleed", self.shift_bonus_bleed),
            ("shift_penalty_recovery", self.shift_penalty_recovery),
            ("opponent_top_speed", self.opponent_top_speed),
            ("gate_speed", self.gate_speed),
            ("gate_spawn_distance", self.gate_spawn_distance),
        ];
        for (field, value) in positive {
            // Also catches NaN
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        if self.gear_ratios.is_empty() || self.gear_ratios.len() > MAX_GEARS {
            return Err(TuningError::GearCount(self.gear_ratios.len()));
        }
        for (i, &ratio) in self.gear_ratios.iter().enumerate() {
            if !(ratio > 0.0) {
                return Err(TuningError::GearRatio { gear: i + 1, ratio });
            }
        }

        let ranges = [
            (
                "question_interval",
                self.question_interval_min,
                self.question_interval_max,
            ),
            ("shift_perfect", self.shift_perfect_min, self.shift_perfect_max),
            ("shift_good", self.shift_good_min, self.shift_perfect_min),
            ("torque_band", self.torque_low_rpm, self.torque_redline_rpm),
        ];
        for (field, min, max) in ranges {
            if min > max {
                return Err(TuningError::InvertedRange { field, min, max });
            }
        }

        Ok(())
    }
}
