//! Answer gates
//!
//! While a question is up, each lane gets a gate carrying one answer option.
//! Gates slide toward the car; whichever lane the car is in when they reach it
//! picks the answer.

use glam::Vec3;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::state::Lane;
use crate::questions::PhysicsQuestion;
use crate::tuning::RaceTuning;

/// A spatial answer trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub lane: Lane,
    /// Index into the question's options
    pub option: usize,
    /// Gate center; the car sits at z = 0, gates start at negative z
    pub position: Vec3,
    pub correct: bool,
}

/// One gate per lane: the correct option in a random lane, wrong options in the rest
pub fn layout_gates<R: Rng + ?Sized>(
    question: &PhysicsQuestion,
    rng: &mut R,
    tuning: &RaceTuning,
) -> Vec<Gate> {
    let mut wrong: Vec<usize> = (0..question.option_count())
        .filter(|&i| i != question.correct_answer)
        .collect();
    wrong.shuffle(rng);

    let correct_lane = rng.random_range(0..Lane::ALL.len());
    let mut wrong_iter = wrong.into_iter();

    Lane::ALL
        .iter()
        .enumerate()
        .filter_map(|(i, &lane)| {
            let option = if i == correct_lane {
                question.correct_answer
            } else {
                wrong_iter.next()?
            };
            Some(Gate {
                lane,
                option,
                position: Vec3::new(lane.x(), 0.0, -tuning.gate_spawn_distance),
                correct: question.is_correct(option),
            })
        })
        .collect()
}

/// Slide gates toward the car
pub fn advance_gates(gates: &mut [Gate], dt: f32, tuning: &RaceTuning) {
    for gate in gates {
        gate.position.z += tuning.gate_speed * dt;
    }
}

/// Whether the gate row has reached the car
pub fn gates_reached(gates: &[Gate]) -> bool {
    gates.iter().any(|g| g.position.z >= 0.0)
}

/// The gate in a lane, if any
pub fn gate_in_lane(gates: &[Gate], lane: Lane) -> Option<&Gate> {
    gates.iter().find(|g| g.lane == lane)
}
