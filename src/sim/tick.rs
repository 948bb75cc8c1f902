//! Race simulation step
//!
//! Advances the race by one time increment given the player's intents.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::drivetrain::{
    decay_shift_bonus, grade_shift, shift_bonus, smooth_rpm, target_rpm, torque_factor,
};
use super::gates::{advance_gates, gate_in_lane, gates_reached, layout_gates};
use super::state::{Lane, RaceEvent, RaceOutcome, RacePhase, RaceState, ShiftQuality};
use crate::consts::{LANE_CHANGE_RATE, MAX_FRAME_DT};

/// Autopilot think time before committing to an answer
const AUTOPILOT_THINK_SECS: f32 = 0.8;
/// Chance the autopilot picks the right answer
const AUTOPILOT_ACCURACY: f64 = 0.75;

/// Player intents for a single step
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump straight to a lane
    pub lane: Option<Lane>,
    /// Relative lane steps (negative = left), applied after `lane`
    pub steer: i8,
    /// Upshift request
    pub shift: bool,
    /// Answer option index for the active question
    pub answer: Option<usize>,
    /// Demo mode - autopilot drives
    pub autopilot: bool,
}

/// Advance the race by `dt` seconds and report what happened.
///
/// Deltas that are negative, non-finite or above `MAX_FRAME_DT` are dropped.
pub fn tick(state: &mut RaceState, input: &TickInput, dt: f32) -> Vec<RaceEvent> {
    let mut events = Vec::new();

    if state.is_finished() {
        return events;
    }
    if !dt.is_finite() || !(0.0..=MAX_FRAME_DT).contains(&dt) {
        log::debug!("Dropping frame delta {}", dt);
        return events;
    }

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input, dt);
    }
    let input = &input;

    state.ticks += 1;

    update_timers(state, dt, &mut events);
    apply_steering(state, input, dt);

    match state.phase {
        RacePhase::Countdown => {
            state.countdown_left -= dt;
            if state.countdown_left <= 0.0 {
                state.countdown_left = 0.0;
                events.extend(state.transition(RacePhase::Racing));
                log::info!("Race started ({})", state.car_id);
            }
        }

        RacePhase::Question => {
            state.question_time += dt;

            if let Some(index) = input.answer {
                submit_answer(state, index, &mut events);
            }

            if !state.answered && !state.gates.is_empty() {
                advance_gates(&mut state.gates, dt, &state.tuning);
                if gates_reached(&state.gates) {
                    match gate_in_lane(&state.gates, state.lane).cloned() {
                        Some(gate) => {
                            events.push(RaceEvent::GatePassed {
                                lane: gate.lane,
                                option: gate.option,
                            });
                            submit_answer(state, gate.option, &mut events);
                        }
                        None => miss_gates(state, &mut events),
                    }
                }
            }

            if state.answered && state.answer_display_left <= 0.0 {
                resume_racing(state, &mut events);
            }
        }

        RacePhase::Racing => {
            if input.shift {
                request_shift(state, &mut events);
            }
            if input.answer.is_some() {
                log::debug!("Ignoring answer with no question up");
            }

            state.time_elapsed += dt;

            if state.time_elapsed > state.next_question_at && state.questions_remaining() > 0 {
                show_next_question(state, &mut events);
                return events;
            }

            step_player(state, dt);
            step_opponent(state, dt);
            check_finish(state, &mut events);
        }

        RacePhase::Finished => {}
    }

    events
}

/// Resolve the active question. Taps and gate crossings both land here.
///
/// Ignored when no question is up, it was already answered, or the index is
/// out of range.
pub fn submit_answer(state: &mut RaceState, index: usize, events: &mut Vec<RaceEvent>) {
    if state.phase != RacePhase::Question || state.answered {
        log::debug!("Ignoring answer {} in {:?}", index, state.phase);
        return;
    }
    let Some(question) = state.question() else {
        return;
    };
    if index >= question.option_count() {
        log::debug!("Ignoring out-of-range answer {}", index);
        return;
    }

    let correct = question.is_correct(index);
    state.selected_answer = Some(index);
    state.answered = true;
    state.total_answered += 1;
    state.answer_display_left = state.tuning.answer_display_secs;
    state.gates.clear();

    if correct {
        state.correct_answers += 1;
        state.arm_boost(events);
    } else {
        state.arm_penalty(events);
    }

    log::debug!(
        "Question {} answered {} ({})",
        question.id,
        index,
        if correct { "correct" } else { "wrong" }
    );
    events.push(RaceEvent::Answered {
        question_id: question.id,
        index,
        correct,
    });
}

/// Upshift, graded by the current RPM. Ignored outside Racing or in top gear.
pub fn request_shift(state: &mut RaceState, events: &mut Vec<RaceEvent>) {
    if state.phase != RacePhase::Racing || state.gear >= state.tuning.top_gear() {
        return;
    }

    let quality = grade_shift(state.rpm, &state.tuning);
    state.shift_bonus = shift_bonus(quality, &state.tuning);
    state.shift_quality = quality;
    state.shift_feedback_left = state.tuning.shift_feedback_secs;
    state.gear += 1;

    log::debug!("Shift to {} at {:.0} rpm: {:?}", state.gear, state.rpm, quality);
    events.push(RaceEvent::Shifted {
        gear: state.gear,
        quality,
    });
}

/// Timers run in every live phase, whether or not the cars are moving
fn update_timers(state: &mut RaceState, dt: f32, events: &mut Vec<RaceEvent>) {
    if state.boost_active {
        state.boost_time_left = (state.boost_time_left - dt).max(0.0);
        if state.boost_time_left <= 0.0 {
            state.clear_boost(events);
        }
    }

    if state.penalty_active {
        state.penalty_time_left = (state.penalty_time_left - dt).max(0.0);
        if state.penalty_time_left <= 0.0 {
            state.clear_penalty(events);
        }
    }

    if state.shift_feedback_left > 0.0 {
        state.shift_feedback_left = (state.shift_feedback_left - dt).max(0.0);
        if state.shift_feedback_left <= 0.0 {
            state.shift_quality = ShiftQuality::None;
        }
    }

    if state.answer_display_left > 0.0 {
        state.answer_display_left = (state.answer_display_left - dt).max(0.0);
    }
}

fn apply_steering(state: &mut RaceState, input: &TickInput, dt: f32) {
    if state.phase.accepts_steering() {
        if let Some(lane) = input.lane {
            state.lane = lane;
        }
        if input.steer != 0 {
            state.lane = state.lane.shifted(input.steer as i32);
        }
    }

    // Ease the vehicle model toward its lane
    let target_x = state.lane.x();
    let alpha = (LANE_CHANGE_RATE * dt).min(1.0);
    state.vehicle_x += (target_x - state.vehicle_x) * alpha;
}

fn show_next_question(state: &mut RaceState, events: &mut Vec<RaceEvent>) {
    let interval = {
        let (min, max) = (
            state.tuning.question_interval_min,
            state.tuning.question_interval_max,
        );
        if max > min {
            state.rng().random_range(min..max)
        } else {
            min
        }
    };
    state.next_question_at = state.time_elapsed + interval;

    let id = state.question_ids[state.question_index];
    state.question_index += 1;
    state.current_question = Some(id);
    state.selected_answer = None;
    state.answered = false;
    state.question_time = 0.0;
    state.autopilot_pick = None;

    if state.gates_enabled {
        if let Some(question) = state.question() {
            let tuning = state.tuning.clone();
            state.gates = layout_gates(question, state.rng(), &tuning);
            events.push(RaceEvent::GatesSpawned {
                count: state.gates.len(),
            });
        }
    }

    events.extend(state.transition(RacePhase::Question));
    log::debug!(
        "Question {} up at {:.2}s, next after {:.2}s",
        id,
        state.time_elapsed,
        state.next_question_at
    );
    events.push(RaceEvent::QuestionShown { question_id: id });
}

/// The gate row passed with no gate in the car's lane: counts as a wrong answer
fn miss_gates(state: &mut RaceState, events: &mut Vec<RaceEvent>) {
    state.answered = true;
    state.total_answered += 1;
    state.answer_display_left = state.tuning.answer_display_secs;
    state.gates.clear();
    state.arm_penalty(events);

    log::debug!("Gates missed in lane {:?}", state.lane);
    events.push(RaceEvent::GateMissed { lane: state.lane });
}

fn resume_racing(state: &mut RaceState, events: &mut Vec<RaceEvent>) {
    state.current_question = None;
    state.selected_answer = None;
    state.answered = false;
    state.answer_display_left = 0.0;
    state.question_time = 0.0;
    state.gates.clear();
    events.extend(state.transition(RacePhase::Racing));
}

fn step_player(state: &mut RaceState, dt: f32) {
    let tuning = &state.tuning;
    let base_accel = state.car_stats.acceleration / 100.0 * tuning.accel_scale;
    let top_speed = state.car_stats.top_speed / 100.0 * tuning.top_speed_scale;
    let gear_ratio = tuning.gear_ratio(state.gear);

    // Torque follows the engine speed locked to the wheels; the smoothed
    // value is what the tachometer shows and shifts are graded on
    let engine_rpm = target_rpm(state.player_speed, gear_ratio, tuning);
    state.rpm = smooth_rpm(state.rpm, engine_rpm, dt, tuning);

    let mut accel = base_accel * torque_factor(engine_rpm, tuning) / gear_ratio;

    if state.shift_bonus != 0.0 {
        accel *= 1.0 + state.shift_bonus;
        state.shift_bonus = decay_shift_bonus(state.shift_bonus, dt, tuning);
    }
    if state.boost_active {
        accel *= tuning.boost_multiplier;
    }
    if state.penalty_active {
        accel *= tuning.penalty_accel_factor;
    }

    let ceiling = state.speed_ceiling();

    // Drag grows with the square of the fraction of top speed
    let speed_fraction = if top_speed > 0.0 {
        state.player_speed / top_speed
    } else {
        0.0
    };
    let drag = speed_fraction * speed_fraction * tuning.drag_coefficient * base_accel;

    state.player_speed = (state.player_speed + (accel - drag) * dt).clamp(0.0, ceiling.max(0.0));
    state.peak_speed = state.peak_speed.max(state.player_speed);
    state.player_position =
        (state.player_position + state.player_speed * dt).min(tuning.race_distance);
}

/// Fixed accel-to-cap pacing car
fn step_opponent(state: &mut RaceState, dt: f32) {
    let tuning = &state.tuning;
    state.opponent_speed =
        (state.opponent_speed + tuning.opponent_accel * dt).clamp(0.0, tuning.opponent_top_speed);
    state.opponent_position =
        (state.opponent_position + state.opponent_speed * dt).min(tuning.race_distance);
}

fn check_finish(state: &mut RaceState, events: &mut Vec<RaceEvent>) {
    let distance = state.tuning.race_distance;
    if state.player_position < distance && state.opponent_position < distance {
        return;
    }

    // Ties go to the player
    let outcome = if state.player_position >= state.opponent_position {
        RaceOutcome::Win
    } else {
        RaceOutcome::Lose
    };

    events.extend(state.transition(RacePhase::Finished));
    state.outcome = Some(outcome);
    state.finish_time = Some(state.time_elapsed);

    log::info!(
        "Race finished: {:?} in {:.2}s ({}/{} correct)",
        outcome,
        state.time_elapsed,
        state.correct_answers,
        state.total_answered
    );
    events.push(RaceEvent::Finished {
        outcome,
        correct_answers: state.correct_answers,
        total_answered: state.total_answered,
    });
}

/// Demo driver: shifts in the power band and answers questions
fn autopilot(state: &mut RaceState, input: &mut TickInput, dt: f32) {
    match state.phase {
        RacePhase::Racing => {
            let tuning = &state.tuning;
            if state.gear < tuning.top_gear() && state.rpm >= tuning.shift_perfect_min {
                input.shift = true;
            }
        }
        RacePhase::Question if !state.answered => {
            let Some(question) = state.question() else {
                return;
            };

            let pick = match state.autopilot_pick {
                Some(pick) => pick,
                None => {
                    let pick = if state.rng().random_bool(AUTOPILOT_ACCURACY) {
                        question.correct_answer
                    } else {
                        let wrong: Vec<usize> = (0..question.option_count())
                            .filter(|&i| i != question.correct_answer)
                            .collect();
                        wrong
                            .choose(state.rng())
                            .copied()
                            .unwrap_or(question.correct_answer)
                    };
                    state.autopilot_pick = Some(pick);
                    pick
                }
            };

            if state.gates.is_empty() {
                if state.question_time + dt >= AUTOPILOT_THINK_SECS {
                    input.answer = Some(pick);
                }
            } else {
                // Steer for the gate carrying the pick, or any gate with the same verdict
                let correct = question.is_correct(pick);
                let gate = state
                    .gates
                    .iter()
                    .find(|g| g.option == pick)
                    .or_else(|| state.gates.iter().find(|g| g.correct == correct));
                if let Some(gate) = gate {
                    input.lane = Some(gate.lane);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CAR_CONFIGS, CarConfig, car_for_score};
    use crate::consts::SIM_DT;
    use crate::tuning::RaceTuning;
    use proptest::prelude::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn racing_state(car: &CarConfig, tuning: RaceTuning) -> RaceState {
        let mut state = RaceState::new(car, tuning, 12345);
        state.countdown_left = 0.0;
        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.phase, RacePhase::Racing);
        state
    }

    /// Tuning with no questions so physics runs uninterrupted
    fn quiet_tuning() -> RaceTuning {
        RaceTuning {
            race_question_count: 0,
            ..Default::default()
        }
    }

    /// Tuning where the first question comes up right after the start
    fn quick_question_tuning() -> RaceTuning {
        RaceTuning {
            first_question_at: 0.0,
            race_distance: 100_000.0,
            ..Default::default()
        }
    }

    fn run_until_question(state: &mut RaceState) {
        for _ in 0..600 {
            if state.phase == RacePhase::Question {
                return;
            }
            tick(state, &TickInput::default(), FRAME);
        }
        panic!("no question came up");
    }

    #[test]
    fn test_countdown_to_racing() {
        let mut state = RaceState::new(car_for_score(0), RaceTuning::default(), 1);
        let input = TickInput::default();

        // 2.9 s of countdown
        for _ in 0..174 {
            tick(&mut state, &input, FRAME);
        }
        assert_eq!(state.phase, RacePhase::Countdown);
        assert_eq!(state.countdown_display(), 1);
        assert_eq!(state.player_position, 0.0);

        for _ in 0..7 {
            tick(&mut state, &input, FRAME);
        }
        assert_eq!(state.phase, RacePhase::Racing);
        assert_eq!(state.countdown_display(), 0);
    }

    #[test]
    fn test_oversized_delta_dropped() {
        let mut state = racing_state(car_for_score(5), quiet_tuning());
        let before = state.clone();

        let events = tick(&mut state, &TickInput::default(), 0.25);
        assert!(events.is_empty());
        assert_eq!(state.ticks, before.ticks);
        assert_eq!(state.player_position, before.player_position);

        tick(&mut state, &TickInput::default(), f32::NAN);
        tick(&mut state, &TickInput::default(), -0.01);
        assert_eq!(state.ticks, before.ticks);
    }

    #[test]
    fn test_first_gear_approaches_ceiling_monotonically() {
        let car = CarConfig {
            stats: crate::catalog::CarStats {
                acceleration: 85.0,
                ..CAR_CONFIGS[3].stats
            },
            ..CAR_CONFIGS[3].clone()
        };
        let mut state = racing_state(&car, quiet_tuning());
        state.player_speed = 0.0;
        state.player_position = 0.0;

        let mut last = state.player_speed;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), FRAME);
            assert_eq!(state.gear, 1);
            assert!(state.player_speed >= last);
            assert!(state.player_speed <= state.speed_ceiling());
            last = state.player_speed;
        }
        assert!(state.player_speed > 0.0);
    }

    #[test]
    fn test_shift_grading_in_race() {
        let mut state = racing_state(car_for_score(5), quiet_tuning());

        state.rpm = 6500.0;
        let events = tick(
            &mut state,
            &TickInput {
                shift: true,
                ..Default::default()
            },
            FRAME,
        );
        assert_eq!(state.gear, 2);
        assert_eq!(state.shift_quality, ShiftQuality::Perfect);
        assert!(events.contains(&RaceEvent::Shifted {
            gear: 2,
            quality: ShiftQuality::Perfect
        }));

        state.rpm = 1000.0;
        let mut events = Vec::new();
        request_shift(&mut state, &mut events);
        assert_eq!(state.shift_quality, ShiftQuality::Early);
        assert!(state.shift_bonus < 0.0);

        state.rpm = 7400.0;
        request_shift(&mut state, &mut events);
        assert_eq!(state.shift_quality, ShiftQuality::Late);
        assert_eq!(state.gear, 4);
    }

    #[test]
    fn test_shift_feedback_expires() {
        let mut state = racing_state(car_for_score(5), quiet_tuning());
        state.rpm = 5800.0;
        request_shift(&mut state, &mut Vec::new());
        assert_eq!(state.shift_quality, ShiftQuality::Good);

        for _ in 0..61 {
            tick(&mut state, &TickInput::default(), FRAME);
        }
        assert_eq!(state.shift_quality, ShiftQuality::None);
    }

    #[test]
    fn test_no_shift_past_top_gear() {
        let mut state = racing_state(car_for_score(5), quiet_tuning());
        let mut events = Vec::new();
        for _ in 0..10 {
            request_shift(&mut state, &mut events);
        }
        assert_eq!(state.gear, 6);
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_shift_ignored_during_countdown() {
        let mut state = RaceState::new(car_for_score(5), RaceTuning::default(), 1);
        tick(
            &mut state,
            &TickInput {
                shift: true,
                ..Default::default()
            },
            FRAME,
        );
        assert_eq!(state.gear, 1);
    }

    #[test]
    fn test_question_pauses_motion() {
        let mut state = racing_state(car_for_score(3), quick_question_tuning());
        run_until_question(&mut state);

        assert!(state.current_question.is_some());
        let (pos, opp, time) = (
            state.player_position,
            state.opponent_position,
            state.time_elapsed,
        );
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), FRAME);
        }
        assert_eq!(state.phase, RacePhase::Question);
        assert_eq!(state.player_position, pos);
        assert_eq!(state.opponent_position, opp);
        assert_eq!(state.time_elapsed, time);
    }

    #[test]
    fn test_next_question_interval_in_range() {
        let mut state = racing_state(car_for_score(3), quick_question_tuning());
        run_until_question(&mut state);
        let gap = state.next_question_at - state.time_elapsed;
        assert!((6.5..10.0).contains(&gap), "gap {}", gap);
    }

    #[test]
    fn test_correct_answer_arms_boost() {
        let mut state = racing_state(car_for_score(3), quick_question_tuning());
        run_until_question(&mut state);
        let correct = state.question().unwrap().correct_answer;

        let events = tick(
            &mut state,
            &TickInput {
                answer: Some(correct),
                ..Default::default()
            },
            FRAME,
        );
        assert!(state.boost_active);
        assert_eq!(state.boost_time_left, state.tuning.boost_duration);
        assert_eq!(state.correct_answers, 1);
        assert_eq!(state.total_answered, 1);
        assert!(events.contains(&RaceEvent::BoostStarted));

        // Boost runs out after its duration with no further answers
        let steps = (state.tuning.boost_duration / FRAME).ceil() as usize + 1;
        for _ in 0..steps {
            tick(&mut state, &TickInput::default(), FRAME);
        }
        assert!(!state.boost_active);
        assert_eq!(state.boost_time_left, 0.0);
    }

    #[test]
    fn test_wrong_answer_arms_penalty_and_resumes() {
        let mut state = racing_state(car_for_score(3), quick_question_tuning());
        run_until_question(&mut state);
        let question = state.question().unwrap();
        let wrong = (question.correct_answer + 1) % question.option_count();

        tick(
            &mut state,
            &TickInput {
                answer: Some(wrong),
                ..Default::default()
            },
            FRAME,
        );
        assert!(state.penalty_active);
        assert!(!state.boost_active);
        assert_eq!(state.correct_answers, 0);
        assert_eq!(state.total_answered, 1);

        // A second answer to the same question is ignored
        tick(
            &mut state,
            &TickInput {
                answer: Some(question.correct_answer),
                ..Default::default()
            },
            FRAME,
        );
        assert_eq!(state.total_answered, 1);

        // Back to racing after the display delay
        for _ in 0..121 {
            tick(&mut state, &TickInput::default(), FRAME);
        }
        assert_eq!(state.phase, RacePhase::Racing);
        assert!(state.current_question.is_none());
    }

    #[test]
    fn test_invalid_answers_ignored() {
        let mut state = racing_state(car_for_score(3), quick_question_tuning());
        let mut events = Vec::new();

        // No question up yet
        submit_answer(&mut state, 0, &mut events);
        assert_eq!(state.total_answered, 0);

        run_until_question(&mut state);
        submit_answer(&mut state, 17, &mut events);
        assert_eq!(state.total_answered, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_gate_crossing_resolves_question() {
        let mut state = RaceState::new(car_for_score(3), quick_question_tuning(), 77);
        state.gates_enabled = true;
        state.countdown_left = 0.0;
        tick(&mut state, &TickInput::default(), FRAME);
        run_until_question(&mut state);
        assert_eq!(state.gates.len(), 3);

        let correct_lane = state.gates.iter().find(|g| g.correct).unwrap().lane;
        let steer = TickInput {
            lane: Some(correct_lane),
            ..Default::default()
        };

        let mut passed = false;
        for _ in 0..200 {
            let events = tick(&mut state, &steer, FRAME);
            if events.iter().any(|e| matches!(e, RaceEvent::GatePassed { .. })) {
                passed = true;
                break;
            }
        }
        assert!(passed);
        assert_eq!(state.correct_answers, 1);
        assert!(state.boost_active);
        assert!(state.gates.is_empty());
    }

    #[test]
    fn test_tap_clears_gates() {
        let mut state = RaceState::new(car_for_score(3), quick_question_tuning(), 78);
        state.gates_enabled = true;
        state.countdown_left = 0.0;
        tick(&mut state, &TickInput::default(), FRAME);
        run_until_question(&mut state);

        let index = state.question().unwrap().correct_answer;
        submit_answer(&mut state, index, &mut Vec::new());
        assert!(state.gates.is_empty());
        assert_eq!(state.total_answered, 1);
    }

    #[test]
    fn test_lane_changes() {
        let mut state = RaceState::new(car_for_score(0), quiet_tuning(), 1);
        let left = TickInput {
            steer: -1,
            ..Default::default()
        };

        // Ignored during countdown
        tick(&mut state, &left, FRAME);
        assert_eq!(state.lane, Lane::Center);

        state.countdown_left = 0.0;
        tick(&mut state, &TickInput::default(), FRAME);
        tick(&mut state, &left, FRAME);
        tick(&mut state, &left, FRAME);
        assert_eq!(state.lane, Lane::Left);
        assert!(state.vehicle_x < 0.0);
    }

    #[test]
    fn test_simultaneous_finish_tie_goes_to_player() {
        let mut state = racing_state(car_for_score(0), quiet_tuning());
        let distance = state.tuning.race_distance;
        state.player_position = distance - 0.5;
        state.player_speed = 100.0;
        state.opponent_position = distance - 0.1;
        state.opponent_speed = 440.0;

        let events = tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.phase, RacePhase::Finished);
        assert_eq!(state.player_position, distance);
        assert_eq!(state.opponent_position, distance);
        // Both clamp to the line: a tie at the finishing instant favors the player
        assert_eq!(state.outcome, Some(RaceOutcome::Win));
        assert!(events.iter().any(|e| matches!(e, RaceEvent::Finished { .. })));
    }

    #[test]
    fn test_opponent_strictly_ahead_loses() {
        let mut state = racing_state(car_for_score(0), quiet_tuning());
        let distance = state.tuning.race_distance;
        state.player_position = distance - 50.0;
        state.player_speed = 10.0;
        state.opponent_position = distance - 1.0;
        state.opponent_speed = 440.0;

        tick(&mut state, &TickInput::default(), FRAME);
        assert_eq!(state.phase, RacePhase::Finished);
        assert!(state.opponent_position > state.player_position);
        assert_eq!(state.outcome, Some(RaceOutcome::Lose));
    }

    #[test]
    fn test_autopilot_completes_race() {
        let mut state = RaceState::new(car_for_score(5), RaceTuning::default(), 2024);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..(120 * 120) {
            tick(&mut state, &input, SIM_DT);
            if state.is_finished() {
                break;
            }
        }
        assert!(state.is_finished());
        assert!(state.gear > 1);
        assert!(state.finish_time.is_some());
    }

    #[test]
    fn test_determinism() {
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut a = RaceState::new(car_for_score(4), quick_question_tuning(), 99_999);
        let mut b = RaceState::new(car_for_score(4), quick_question_tuning(), 99_999);
        for _ in 0..2000 {
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }
        assert_eq!(a.ticks, b.ticks);
        assert_eq!(a.player_position, b.player_position);
        assert_eq!(a.question_ids, b.question_ids);
        assert_eq!(a.correct_answers, b.correct_answers);
    }

    /// Nebula at 100 units/s in third: 3077 rpm, full torque
    fn cruising_state() -> RaceState {
        let mut state = racing_state(car_for_score(5), quiet_tuning());
        state.player_speed = 100.0;
        state.gear = 3;
        state
    }

    fn speed_delta(state: &mut RaceState) -> f32 {
        let before = state.player_speed;
        tick(state, &TickInput::default(), FRAME);
        state.player_speed - before
    }

    fn cruising_drag(speed: f32) -> f32 {
        let base = 0.92 * 350.0;
        let top = 0.95 * 580.0;
        (speed / top) * (speed / top) * 0.2 * base
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_plain_acceleration_step() {
        let mut state = cruising_state();
        let accel = 0.92 * 350.0 / 1.3;
        assert_close(speed_delta(&mut state), (accel - cruising_drag(100.0)) * FRAME);
    }

    #[test]
    fn test_boost_multiplies_acceleration() {
        let mut state = cruising_state();
        state.arm_boost(&mut Vec::new());
        let accel = 0.92 * 350.0 / 1.3 * 1.6;
        assert_close(speed_delta(&mut state), (accel - cruising_drag(100.0)) * FRAME);
    }

    #[test]
    fn test_penalty_scales_acceleration() {
        let mut state = cruising_state();
        state.arm_penalty(&mut Vec::new());
        let accel = 0.92 * 350.0 / 1.3 * 0.3;
        assert_close(speed_delta(&mut state), (accel - cruising_drag(100.0)) * FRAME);
    }

    #[test]
    fn test_shift_bonus_scales_acceleration() {
        let mut state = cruising_state();
        state.shift_bonus = state.tuning.shift_bonus_perfect;
        let accel = 0.92 * 350.0 / 1.3 * 2.0;
        assert_close(speed_delta(&mut state), (accel - cruising_drag(100.0)) * FRAME);
        // Bled at 2/s
        assert_close(state.shift_bonus, 1.0 - 2.0 * FRAME);
    }

    #[test]
    fn test_drag_grows_with_speed() {
        let mut state = racing_state(car_for_score(5), quiet_tuning());
        state.gear = 6;
        state.player_speed = 400.0;
        // 4000 rpm in top gear, full torque
        let accel = 0.92 * 350.0 / 4.0;
        let drag = cruising_drag(400.0);
        assert!(drag > cruising_drag(100.0) * 15.0);
        assert_close(speed_delta(&mut state), (accel - drag) * FRAME);
    }

    #[test]
    fn test_boost_lifts_top_gear_ceiling() {
        let mut state = racing_state(car_for_score(5), quiet_tuning());
        state.gear = 6;
        let top = state.player_top_speed();
        state.player_speed = top;
        tick(&mut state, &TickInput::default(), FRAME);
        assert!(state.player_speed <= top);

        state.arm_boost(&mut Vec::new());
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), FRAME);
        }
        assert!(state.player_speed > top, "{} <= {}", state.player_speed, top);
        assert!(state.player_speed <= state.speed_ceiling());
    }

    #[test]
    fn test_top_car_outruns_opponent_on_long_track() {
        let tuning = RaceTuning {
            race_distance: 20_000.0,
            race_question_count: 0,
            ..Default::default()
        };
        let mut state = RaceState::new(car_for_score(5), tuning, 8);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..(120 * 120) {
            tick(&mut state, &input, SIM_DT);
            if state.is_finished() {
                break;
            }
        }
        assert_eq!(state.outcome, Some(RaceOutcome::Win));
        assert_eq!(state.gear, 6);
        assert!(state.peak_speed > state.tuning.opponent_top_speed);
    }

    #[test]
    fn test_gate_row_missing_lane_counts_as_miss() {
        let mut state = RaceState::new(car_for_score(3), quick_question_tuning(), 79);
        state.gates_enabled = true;
        state.countdown_left = 0.0;
        tick(&mut state, &TickInput::default(), FRAME);
        run_until_question(&mut state);

        // Leave the car's lane without a gate, as with a two-option question
        let lane = state.lane;
        state.gates.retain(|g| g.lane != lane);
        assert_eq!(state.gates.len(), 2);

        let mut missed = false;
        for _ in 0..200 {
            let events = tick(&mut state, &TickInput::default(), FRAME);
            if events.contains(&RaceEvent::GateMissed { lane }) {
                missed = true;
                break;
            }
        }
        assert!(missed);
        assert!(state.gates.is_empty());
        assert!(state.penalty_active);
        assert_eq!(state.total_answered, 1);
        assert_eq!(state.correct_answers, 0);

        for _ in 0..121 {
            tick(&mut state, &TickInput::default(), FRAME);
        }
        assert_eq!(state.phase, RacePhase::Racing);
    }

    fn arb_input() -> impl Strategy<Value = TickInput> {
        (
            prop::option::of(-1i32..=1),
            -2i8..=2,
            any::<bool>(),
            prop::option::of(0usize..5),
        )
            .prop_map(|(lane, steer, shift, answer)| TickInput {
                lane: lane.and_then(Lane::from_offset),
                steer,
                shift,
                answer,
                autopilot: false,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn positions_stay_on_track(
            seed in any::<u64>(),
            score in 0u32..6,
            steps in prop::collection::vec((0.0f32..=0.1, arb_input()), 1..400),
        ) {
            let mut state = RaceState::new(car_for_score(score), RaceTuning::default(), seed);
            let distance = state.tuning.race_distance;
            for (dt, input) in &steps {
                tick(&mut state, input, *dt);
                prop_assert!((0.0..=distance).contains(&state.player_position));
                prop_assert!((0.0..=distance).contains(&state.opponent_position));
                prop_assert!(state.player_speed >= 0.0);
            }
        }

        #[test]
        fn gear_never_decreases(
            seed in any::<u64>(),
            steps in prop::collection::vec((0.0f32..=0.1, arb_input()), 1..400),
        ) {
            let mut state = RaceState::new(car_for_score(5), RaceTuning::default(), seed);
            state.countdown_left = 0.0;
            let mut gear = state.gear;
            for (dt, input) in &steps {
                tick(&mut state, input, *dt);
                prop_assert!(state.gear >= gear);
                prop_assert!(state.gear <= state.tuning.top_gear());
                gear = state.gear;
            }
        }

        #[test]
        fn finished_race_is_frozen(
            seed in any::<u64>(),
            steps in prop::collection::vec((0.0f32..=0.1, arb_input()), 1..100),
        ) {
            let mut state = RaceState::new(car_for_score(2), quiet_tuning(), seed);
            let autopilot = TickInput { autopilot: true, ..Default::default() };
            for _ in 0..(120 * 60) {
                tick(&mut state, &autopilot, SIM_DT);
                if state.is_finished() {
                    break;
                }
            }
            prop_assert!(state.is_finished());

            let frozen = state.clone();
            for (dt, input) in &steps {
                let events = tick(&mut state, input, *dt);
                prop_assert!(events.is_empty());
            }
            prop_assert_eq!(state.player_position, frozen.player_position);
            prop_assert_eq!(state.opponent_position, frozen.opponent_position);
            prop_assert_eq!(state.player_speed, frozen.player_speed);
            prop_assert_eq!(state.opponent_speed, frozen.opponent_speed);
            prop_assert_eq!(state.outcome, frozen.outcome);
        }
    }
}
