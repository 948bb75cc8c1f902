//! Gearbox and engine model
//!
//! RPM follows road speed through the gear ratio. Torque peaks in the power
//! band, so shifting near the top of the band is what makes a car fast.

use super::state::ShiftQuality;
use crate::tuning::RaceTuning;

/// Engine speed implied by road speed in the given gear
#[inline]
pub fn target_rpm(speed: f32, gear_ratio: f32, tuning: &RaceTuning) -> f32 {
    (speed * tuning.rpm_per_speed / gear_ratio).max(0.0)
}

/// Exponential approach toward `target`, frame-rate independent.
///
/// `rpm_smoothing` is the fraction of the gap closed per 60 Hz frame.
pub fn smooth_rpm(current: f32, target: f32, dt: f32, tuning: &RaceTuning) -> f32 {
    let keep = (1.0 - tuning.rpm_smoothing).clamp(0.0, 1.0);
    let alpha = 1.0 - keep.powf(dt * 60.0);
    (current + (target - current) * alpha).max(0.0)
}

/// Torque multiplier for an RPM, in [0, 1]
pub fn torque_factor(rpm: f32, tuning: &RaceTuning) -> f32 {
    let factor = if rpm < tuning.torque_low_rpm {
        // Still spinning up
        let floor = tuning.torque_low_floor;
        floor + (rpm / tuning.torque_low_rpm) * (1.0 - floor)
    } else if rpm > tuning.torque_redline_rpm {
        // Over-revving
        1.0 - (rpm - tuning.torque_redline_rpm) / 1000.0 * tuning.torque_redline_falloff
    } else {
        1.0
    };
    factor.clamp(0.0, 1.0)
}

/// Grade an upshift by the RPM it happened at
pub fn grade_shift(rpm: f32, tuning: &RaceTuning) -> ShiftQuality {
    if rpm >= tuning.shift_perfect_min && rpm <= tuning.shift_perfect_max {
        ShiftQuality::Perfect
    } else if rpm >= tuning.shift_good_min && rpm < tuning.shift_perfect_min {
        ShiftQuality::Good
    } else if rpm > tuning.shift_perfect_max {
        ShiftQuality::Late
    } else {
        ShiftQuality::Early
    }
}

/// Accel modifier granted by a graded shift
pub fn shift_bonus(quality: ShiftQuality, tuning: &RaceTuning) -> f32 {
    match quality {
        ShiftQuality::Perfect => tuning.shift_bonus_perfect,
        ShiftQuality::Good => tuning.shift_bonus_good,
        ShiftQuality::Late => tuning.shift_penalty_late,
        ShiftQuality::Early => tuning.shift_penalty_early,
        ShiftQuality::None => 0.0,
    }
}

/// Linear decay of the shift modifier toward zero (never crosses it)
pub fn decay_shift_bonus(bonus: f32, dt: f32, tuning: &RaceTuning) -> f32 {
    if bonus > 0.0 {
        (bonus - dt * tuning.shift_bonus_bleed).max(0.0)
    } else if bonus < 0.0 {
        (bonus + dt * tuning.shift_penalty_recovery).min(0.0)
    } else {
        0.0
    }
}
