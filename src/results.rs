//! Post-race telemetry report

use serde::Serialize;

use crate::consts::KMH_PER_SPEED_UNIT;
use crate::sim::{RaceOutcome, RaceState};

/// What the results screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceReport {
    pub outcome: RaceOutcome,
    pub car_id: String,
    pub quiz_score: u32,
    pub correct_answers: u32,
    pub total_answered: u32,
    /// Rounded percentage, 0 when nothing was answered
    pub accuracy_percent: u32,
    pub finish_time: f32,
    pub top_speed_kmh: u32,
}

impl RaceReport {
    /// Build the report for a finished race (None while it's still running)
    pub fn from_state(state: &RaceState, quiz_score: u32) -> Option<Self> {
        let outcome = state.outcome?;
        Some(Self {
            outcome,
            car_id: state.car_id.clone(),
            quiz_score,
            correct_answers: state.correct_answers,
            total_answered: state.total_answered,
            accuracy_percent: accuracy_percent(state.correct_answers, state.total_answered),
            finish_time: state.finish_time.unwrap_or(state.time_elapsed),
            top_speed_kmh: (state.peak_speed * KMH_PER_SPEED_UNIT).round() as u32,
        })
    }

    pub fn is_win(&self) -> bool {
        self.outcome == RaceOutcome::Win
    }

    pub fn headline(&self) -> &'static str {
        match self.outcome {
            RaceOutcome::Win => "Podium Finish",
            RaceOutcome::Lose => "Defeated on the Strip",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self.outcome {
            RaceOutcome::Win => {
                "Your synchronization of Newton's Laws was flawless. The horsepower was in the mind."
            }
            RaceOutcome::Lose => {
                "Torque was insufficient. Friction and drag dominated the final quarter mile."
            }
        }
    }
}

pub fn accuracy_percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f32 / total as f32 * 100.0).round() as u32
}
