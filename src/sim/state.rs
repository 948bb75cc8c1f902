//! Race state and core simulation types
//!
//! `RaceState` is the whole race: the renderer reads it after every step and
//! nothing outside the simulation writes to it.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::gates::Gate;
use crate::catalog::{CarConfig, CarStats};
use crate::consts::{KMH_PER_SPEED_UNIT, LANE_WIDTH};
use crate::questions::{PhysicsQuestion, draw_race_questions, question_by_id};
use crate::tuning::RaceTuning;

/// Current phase of the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RacePhase {
    /// Traffic lights before the start
    Countdown,
    /// Cars moving
    Racing,
    /// Motion paused while a question is up
    Question,
    /// Terminal
    Finished,
}

impl RacePhase {
    /// Allowed transitions: Countdown -> Racing -> (Racing <-> Question) -> Finished
    pub fn can_transition_to(self, next: RacePhase) -> bool {
        matches!(
            (self, next),
            (RacePhase::Countdown, RacePhase::Racing)
                | (RacePhase::Racing, RacePhase::Question)
                | (RacePhase::Question, RacePhase::Racing)
                | (RacePhase::Racing, RacePhase::Finished)
        )
    }

    /// Whether lane changes are accepted
    pub fn accepts_steering(self) -> bool {
        matches!(self, RacePhase::Racing | RacePhase::Question)
    }
}

/// Grade of the most recent upshift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftQuality {
    Perfect,
    Good,
    Early,
    Late,
    #[default]
    None,
}

/// Discrete lateral slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lane {
    Left,
    #[default]
    Center,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    /// -1, 0 or 1
    pub fn offset(self) -> i8 {
        match self {
            Lane::Left => -1,
            Lane::Center => 0,
            Lane::Right => 1,
        }
    }

    pub fn from_offset(offset: i32) -> Option<Lane> {
        match offset {
            -1 => Some(Lane::Left),
            0 => Some(Lane::Center),
            1 => Some(Lane::Right),
            _ => None,
        }
    }

    /// Move `steps` lanes right (negative = left), stopping at the edges
    pub fn shifted(self, steps: i32) -> Lane {
        let target = (self.offset() as i32 + steps).clamp(-1, 1);
        Lane::from_offset(target).unwrap_or(self)
    }

    /// Lateral world position of the lane center
    pub fn x(self) -> f32 {
        self.offset() as f32 * LANE_WIDTH
    }
}

/// Who won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceOutcome {
    Win,
    Lose,
}

/// Things that happened during a step, for presentation choreography
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RaceEvent {
    PhaseChanged { from: RacePhase, to: RacePhase },
    QuestionShown { question_id: u32 },
    Answered { question_id: u32, index: usize, correct: bool },
    GatesSpawned { count: usize },
    GatePassed { lane: Lane, option: usize },
    GateMissed { lane: Lane },
    Shifted { gear: u8, quality: ShiftQuality },
    BoostStarted,
    BoostEnded,
    PenaltyStarted,
    PenaltyEnded,
    Finished { outcome: RaceOutcome, correct_answers: u32, total_answered: u32 },
}

/// Complete race state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceState {
    /// Race seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: RaceTuning,
    pub car_id: String,
    pub car_stats: CarStats,

    pub phase: RacePhase,
    /// Seconds of countdown left (lights show its ceiling)
    pub countdown_left: f32,
    /// Simulation step counter
    pub ticks: u64,
    /// Racing time in seconds (stops while a question is up)
    pub time_elapsed: f32,

    pub player_position: f32,
    pub opponent_position: f32,
    pub player_speed: f32,
    pub opponent_speed: f32,
    pub peak_speed: f32,

    pub lane: Lane,
    /// Smoothed lateral position for the vehicle model
    pub vehicle_x: f32,

    /// 1-based
    pub gear: u8,
    pub rpm: f32,
    pub shift_quality: ShiftQuality,
    pub shift_feedback_left: f32,
    /// Signed accel modifier from the last shift, decays toward zero
    pub shift_bonus: f32,

    pub boost_active: bool,
    pub boost_time_left: f32,
    pub penalty_active: bool,
    pub penalty_time_left: f32,

    /// Ids drawn for this race, asked in order
    pub question_ids: Vec<u32>,
    pub question_index: usize,
    pub next_question_at: f32,
    pub current_question: Option<u32>,
    pub selected_answer: Option<usize>,
    /// Set once the current question is resolved (tap, gate or missed gates)
    pub answered: bool,
    /// Time the current question has been up
    pub question_time: f32,
    pub answer_display_left: f32,
    pub gates_enabled: bool,
    pub gates: Vec<Gate>,
    /// Option the autopilot settled on for the current question
    pub autopilot_pick: Option<usize>,

    pub correct_answers: u32,
    pub total_answered: u32,

    pub outcome: Option<RaceOutcome>,
    pub finish_time: Option<f32>,
}

impl RaceState {
    /// Fresh race for the given car
    pub fn new(car: &CarConfig, tuning: RaceTuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let question_ids = draw_race_questions(&mut rng, tuning.race_question_count);

        Self {
            seed,
            rng,
            car_id: car.id.to_string(),
            car_stats: car.stats,
            phase: RacePhase::Countdown,
            countdown_left: tuning.countdown_secs,
            ticks: 0,
            time_elapsed: 0.0,
            player_position: 0.0,
            opponent_position: 0.0,
            player_speed: 0.0,
            opponent_speed: 0.0,
            peak_speed: 0.0,
            lane: Lane::Center,
            vehicle_x: 0.0,
            gear: 1,
            rpm: 0.0,
            shift_quality: ShiftQuality::None,
            shift_feedback_left: 0.0,
            shift_bonus: 0.0,
            boost_active: false,
            boost_time_left: 0.0,
            penalty_active: false,
            penalty_time_left: 0.0,
            question_ids,
            question_index: 0,
            next_question_at: tuning.first_question_at,
            current_question: None,
            selected_answer: None,
            answered: false,
            question_time: 0.0,
            answer_display_left: 0.0,
            gates_enabled: false,
            gates: Vec::new(),
            autopilot_pick: None,
            correct_answers: 0,
            total_answered: 0,
            outcome: None,
            finish_time: None,
            tuning,
        }
    }

    pub(crate) fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Move to `next` if the transition table allows it
    pub fn transition(&mut self, next: RacePhase) -> Option<RaceEvent> {
        if !self.phase.can_transition_to(next) {
            log::debug!("Rejected phase transition {:?} -> {:?}", self.phase, next);
            return None;
        }
        let from = self.phase;
        self.phase = next;
        Some(RaceEvent::PhaseChanged { from, to: next })
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RacePhase::Finished
    }

    /// Question currently on screen
    pub fn question(&self) -> Option<&'static PhysicsQuestion> {
        self.current_question.and_then(question_by_id)
    }

    /// Questions drawn but not yet asked
    pub fn questions_remaining(&self) -> usize {
        self.question_ids.len().saturating_sub(self.question_index)
    }

    /// Traffic light value: 3, 2, 1, then 0 for GO
    pub fn countdown_display(&self) -> u8 {
        self.countdown_left.max(0.0).ceil() as u8
    }

    /// Player top speed before boost/penalty
    pub fn player_top_speed(&self) -> f32 {
        self.car_stats.top_speed / 100.0 * self.tuning.top_speed_scale
    }

    /// Player acceleration before gearing
    pub fn player_base_accel(&self) -> f32 {
        self.car_stats.acceleration / 100.0 * self.tuning.accel_scale
    }

    /// Current speed ceiling: top speed with boost and penalty applied.
    /// Over-revving is limited by the torque curve, not here.
    pub fn speed_ceiling(&self) -> f32 {
        let mut ceiling = self.player_top_speed();
        if self.boost_active {
            ceiling *= self.tuning.boost_speed_factor;
        }
        if self.penalty_active {
            ceiling *= self.tuning.penalty_speed_factor;
        }
        ceiling
    }

    /// Player progress 0-100
    pub fn player_progress(&self) -> f32 {
        (self.player_position / self.tuning.race_distance * 100.0).min(100.0)
    }

    pub fn opponent_progress(&self) -> f32 {
        (self.opponent_position / self.tuning.race_distance * 100.0).min(100.0)
    }

    /// Speedometer reading
    pub fn speed_kmh(&self) -> f32 {
        self.player_speed * KMH_PER_SPEED_UNIT
    }

    /// Nitro gauge fill 0-1
    pub fn boost_fraction(&self) -> f32 {
        (self.boost_time_left / self.tuning.boost_duration).clamp(0.0, 1.0)
    }

    /// Start the nitro boost (cancels any running penalty)
    pub(crate) fn arm_boost(&mut self, events: &mut Vec<RaceEvent>) {
        if self.penalty_active {
            self.clear_penalty(events);
        }
        if !self.boost_active {
            events.push(RaceEvent::BoostStarted);
        }
        self.boost_active = true;
        self.boost_time_left = self.tuning.boost_duration;
    }

    /// Start the drag penalty (cancels any running boost)
    pub(crate) fn arm_penalty(&mut self, events: &mut Vec<RaceEvent>) {
        if self.boost_active {
            self.clear_boost(events);
        }
        if !self.penalty_active {
            events.push(RaceEvent::PenaltyStarted);
        }
        self.penalty_active = true;
        self.penalty_time_left = self.tuning.penalty_duration;
    }

    pub(crate) fn clear_boost(&mut self, events: &mut Vec<RaceEvent>) {
        self.boost_active = false;
        self.boost_time_left = 0.0;
        events.push(RaceEvent::BoostEnded);
    }

    pub(crate) fn clear_penalty(&mut self, events: &mut Vec<RaceEvent>) {
        self.penalty_active = false;
        self.penalty_time_left = 0.0;
        events.push(RaceEvent::PenaltyEnded);
    }
}
