//! Heads-up display readout
//!
//! Gauge values the overlay draws each frame, already converted to the
//! player's preferred units.

use serde::Serialize;

use crate::catalog::car_by_id;
use crate::consts::KMH_PER_SPEED_UNIT;
use crate::settings::Settings;
use crate::sim::{RacePhase, RaceState, ShiftQuality};

pub const CONTROLS_HINT: &str = "SPACE shift up / \u{2190} \u{2192} steer";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudReadout {
    /// Speedometer reading in `speed_label` units
    pub speed: u32,
    pub speed_label: &'static str,
    /// Speedometer full scale, same units
    pub gauge_max: u32,
    pub rpm: u32,
    pub max_rpm: u32,
    pub gear: u8,
    pub shift_quality: ShiftQuality,
    /// Traffic light, 0 once racing
    pub countdown: u8,
    /// 0-100
    pub player_progress: f32,
    pub opponent_progress: f32,
    /// Nitro bar fill 0-1
    pub boost_fraction: f32,
    pub penalty_active: bool,
    /// Streak effect while boosting, off with reduced motion
    pub speed_lines: bool,
    pub controls_hint: Option<&'static str>,
}

impl HudReadout {
    pub fn from_state(state: &RaceState, settings: &Settings) -> Self {
        let gauge_max_speed = car_by_id(&state.car_id)
            .map(|car| car.gauge_max_speed())
            .unwrap_or_else(|| state.player_top_speed());

        let show_hint = settings.show_controls_hint
            && matches!(state.phase, RacePhase::Countdown | RacePhase::Racing);

        Self {
            speed: settings.display_speed(state.speed_kmh()),
            speed_label: settings.speed_unit.label(),
            gauge_max: settings.display_speed(gauge_max_speed * KMH_PER_SPEED_UNIT),
            rpm: state.rpm.round() as u32,
            max_rpm: state.tuning.max_rpm.round() as u32,
            gear: state.gear,
            shift_quality: state.shift_quality,
            countdown: state.countdown_display(),
            player_progress: state.player_progress(),
            opponent_progress: state.opponent_progress(),
            boost_fraction: state.boost_fraction(),
            penalty_active: state.penalty_active,
            speed_lines: state.boost_active && !settings.reduced_motion,
            controls_hint: show_hint.then_some(CONTROLS_HINT),
        }
    }
}
