//! Race session
//!
//! Owns a single race: queues player intents, runs the fixed-step clock and
//! reports the result once. Presentation talks to the race only through here.

use std::collections::VecDeque;

use crate::catalog::CarConfig;
use crate::consts::{IDLE_AUTOPILOT_SECS, MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::results::RaceReport;
use crate::settings::{AnswerInput, Settings};
use crate::sim::{Lane, RaceEvent, RaceOutcome, RaceState, TickInput, tick};
use crate::tuning::RaceTuning;

/// Called once when the race ends with (outcome, correct answers, total answered)
pub type FinishCallback = Box<dyn FnMut(RaceOutcome, u32, u32)>;

/// A discrete player intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    SetLane(Lane),
    /// Relative lane steps (negative = left)
    Steer(i8),
    Shift,
    Answer(usize),
}

pub struct RaceSession {
    state: RaceState,
    intents: VecDeque<Intent>,
    accumulator: f32,
    autopilot: bool,
    /// Autopilot takes over after `IDLE_AUTOPILOT_SECS` without input
    idle_autopilot: bool,
    idle_time: f32,
    on_finish: Option<FinishCallback>,
    finish_reported: bool,
}

impl RaceSession {
    pub fn new(car: &CarConfig, tuning: RaceTuning, seed: u64) -> Self {
        Self {
            state: RaceState::new(car, tuning, seed),
            intents: VecDeque::new(),
            accumulator: 0.0,
            autopilot: false,
            idle_autopilot: false,
            idle_time: 0.0,
            on_finish: None,
            finish_reported: false,
        }
    }

    /// Replace the race with a fresh one, keeping tuning, input mode and the
    /// finish callback
    pub fn start_race(&mut self, car: &CarConfig, seed: u64) {
        let gates_enabled = self.state.gates_enabled;
        self.state = RaceState::new(car, self.state.tuning.clone(), seed);
        self.state.gates_enabled = gates_enabled;
        self.intents.clear();
        self.accumulator = 0.0;
        self.idle_time = 0.0;
        self.finish_reported = false;
        log::info!("New race: {} (seed {})", car.id, seed);
    }

    /// Apply the input-related preferences
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_gates_enabled(settings.answer_input == AnswerInput::Gates);
        self.idle_autopilot = settings.autopilot_when_idle;
    }

    /// Answer by steering through gates instead of tapping.
    /// Takes effect from the next question.
    pub fn set_gates_enabled(&mut self, enabled: bool) {
        self.state.gates_enabled = enabled;
    }

    /// Jump to lane -1, 0 or 1. Other values are ignored.
    pub fn set_lane(&mut self, lane: i32) {
        match Lane::from_offset(lane) {
            Some(lane) => self.intents.push_back(Intent::SetLane(lane)),
            None => log::debug!("Ignoring lane {}", lane),
        }
    }

    pub fn steer_left(&mut self) {
        self.intents.push_back(Intent::Steer(-1));
    }

    pub fn steer_right(&mut self) {
        self.intents.push_back(Intent::Steer(1));
    }

    pub fn request_shift(&mut self) {
        self.intents.push_back(Intent::Shift);
    }

    pub fn submit_answer(&mut self, index: usize) {
        self.intents.push_back(Intent::Answer(index));
    }

    /// Hand the controls to the demo driver
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    /// Whether the idle autopilot is driving right now
    pub fn idle_driving(&self) -> bool {
        self.idle_autopilot && self.idle_time >= IDLE_AUTOPILOT_SECS
    }

    pub fn pending_intents(&self) -> usize {
        self.intents.len()
    }

    /// Register the finish callback (replaces any earlier one)
    pub fn on_finish(&mut self, callback: impl FnMut(RaceOutcome, u32, u32) + 'static) {
        self.on_finish = Some(Box::new(callback));
    }

    /// Advance by one display frame.
    ///
    /// Frame deltas that are negative, non-finite or above `MAX_FRAME_DT`
    /// are discarded. The rest run as fixed `SIM_DT` steps.
    pub fn advance(&mut self, frame_dt: f32) -> Vec<RaceEvent> {
        let mut events = Vec::new();

        if !frame_dt.is_finite() || !(0.0..=MAX_FRAME_DT).contains(&frame_dt) {
            log::debug!("Discarding frame delta {}", frame_dt);
            return events;
        }

        if self.intents.is_empty() {
            self.idle_time += frame_dt;
        } else {
            if self.idle_driving() {
                log::debug!("Player input, idle autopilot off");
            }
            self.idle_time = 0.0;
        }

        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.next_input();
            events.extend(tick(&mut self.state, &input, SIM_DT));
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Don't carry a backlog into the next frame
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        if self.state.is_finished() {
            self.intents.clear();
            self.report_finish();
        }

        events
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> &RaceState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Results for a finished race
    pub fn report(&self, quiz_score: u32) -> Option<RaceReport> {
        RaceReport::from_state(&self.state, quiz_score)
    }

    /// Collect queued intents into one step's input.
    ///
    /// One shift and one answer per step; a second of either waits for the
    /// following step.
    fn next_input(&mut self) -> TickInput {
        let mut input = TickInput {
            autopilot: self.autopilot || self.idle_driving(),
            ..Default::default()
        };

        while let Some(&intent) = self.intents.front() {
            match intent {
                Intent::Shift if input.shift => break,
                Intent::Answer(_) if input.answer.is_some() => break,
                Intent::SetLane(lane) => {
                    input.lane = Some(lane);
                    input.steer = 0;
                }
                Intent::Steer(steps) => input.steer = input.steer.saturating_add(steps),
                Intent::Shift => input.shift = true,
                Intent::Answer(index) => input.answer = Some(index),
            }
            self.intents.pop_front();
        }

        input
    }

    fn report_finish(&mut self) {
        if self.finish_reported {
            return;
        }
        let Some(outcome) = self.state.outcome else {
            return;
        };
        self.finish_reported = true;
        if let Some(callback) = self.on_finish.as_mut() {
            callback(
                outcome,
                self.state.correct_answers,
                self.state.total_answered,
            );
        }
    }
}
