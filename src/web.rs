//! Browser binding
//!
//! Exposes the race session to JavaScript. Snapshots, events and reports
//! cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::catalog::{car_by_id, car_for_score};
use crate::hud::HudReadout;
use crate::session::RaceSession;
use crate::settings::Settings;
use crate::sim::RaceOutcome;
use crate::tuning::RaceTuning;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Physics Racer starting...");
}

/// Car unlocked by a quiz score, as JSON
#[wasm_bindgen(js_name = carForScore)]
pub fn car_for_score_json(score: u32) -> String {
    serde_json::to_string(car_for_score(score)).unwrap_or_default()
}

/// One race, driven by the page's animation frame callback
#[wasm_bindgen]
pub struct WebRace {
    session: RaceSession,
    settings: Settings,
    quiz_score: u32,
}

#[wasm_bindgen]
impl WebRace {
    /// Start a race for the car unlocked by `quiz_score`.
    ///
    /// `tuning_json` may be empty for the default balance.
    #[wasm_bindgen(constructor)]
    pub fn new(quiz_score: u32, seed: u64, tuning_json: &str) -> Result<WebRace, JsValue> {
        let tuning = if tuning_json.trim().is_empty() {
            RaceTuning::default()
        } else {
            RaceTuning::from_json(tuning_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };

        let mut session = RaceSession::new(car_for_score(quiz_score), tuning, seed);
        let settings = Settings::load();
        session.apply_settings(&settings);

        Ok(WebRace {
            session,
            settings,
            quiz_score,
        })
    }

    /// Restart with a specific car. Unknown ids keep the current car.
    #[wasm_bindgen(js_name = startRace)]
    pub fn start_race(&mut self, car_id: &str, seed: u64) {
        let car = match car_by_id(car_id) {
            Some(car) => car,
            None => {
                log::warn!("Unknown car '{}'", car_id);
                match car_by_id(&self.session.snapshot().car_id) {
                    Some(car) => car,
                    None => car_for_score(self.quiz_score),
                }
            }
        };
        self.session.start_race(car, seed);
    }

    #[wasm_bindgen(js_name = setLane)]
    pub fn set_lane(&mut self, lane: i32) {
        self.session.set_lane(lane);
    }

    #[wasm_bindgen(js_name = steerLeft)]
    pub fn steer_left(&mut self) {
        self.session.steer_left();
    }

    #[wasm_bindgen(js_name = steerRight)]
    pub fn steer_right(&mut self) {
        self.session.steer_right();
    }

    #[wasm_bindgen(js_name = requestShift)]
    pub fn request_shift(&mut self) {
        self.session.request_shift();
    }

    #[wasm_bindgen(js_name = submitAnswer)]
    pub fn submit_answer(&mut self, index: usize) {
        self.session.submit_answer(index);
    }

    #[wasm_bindgen(js_name = setAutopilot)]
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.session.set_autopilot(enabled);
    }

    #[wasm_bindgen(js_name = setGatesEnabled)]
    pub fn set_gates_enabled(&mut self, enabled: bool) {
        self.session.set_gates_enabled(enabled);
    }

    /// Step by a frame delta in seconds, returns the events as JSON
    pub fn advance(&mut self, frame_dt: f32) -> String {
        let events = self.session.advance(frame_dt);
        serde_json::to_string(&events).unwrap_or_default()
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(self.session.snapshot()).unwrap_or_default()
    }

    /// Gauge readout in the player's units, as JSON
    #[wasm_bindgen(js_name = hudJson)]
    pub fn hud_json(&self) -> String {
        let hud = HudReadout::from_state(self.session.snapshot(), &self.settings);
        serde_json::to_string(&hud).unwrap_or_default()
    }

    #[wasm_bindgen(js_name = settingsJson)]
    pub fn settings_json(&self) -> String {
        self.settings.to_json()
    }

    /// Replace, apply and persist the settings
    #[wasm_bindgen(js_name = setSettingsJson)]
    pub fn set_settings_json(&mut self, json: &str) -> Result<(), JsValue> {
        let settings = Settings::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.session.apply_settings(&settings);
        settings.save();
        self.settings = settings;
        Ok(())
    }

    /// Active question as JSON, or an empty string
    #[wasm_bindgen(js_name = questionJson)]
    pub fn question_json(&self) -> String {
        self.session
            .snapshot()
            .question()
            .and_then(|q| serde_json::to_string(q).ok())
            .unwrap_or_default()
    }

    /// Register `callback(result, correctAnswers, totalAnswered)`, called once at the finish
    #[wasm_bindgen(js_name = onFinish)]
    pub fn on_finish(&mut self, callback: js_sys::Function) {
        self.session.on_finish(move |outcome, correct, total| {
            let result = match outcome {
                RaceOutcome::Win => "win",
                RaceOutcome::Lose => "lose",
            };
            if let Err(e) = callback.call3(
                &JsValue::NULL,
                &JsValue::from_str(result),
                &JsValue::from(correct),
                &JsValue::from(total),
            ) {
                log::error!("onFinish callback threw: {:?}", e);
            }
        });
    }

    /// Results as JSON once finished, otherwise an empty string
    #[wasm_bindgen(js_name = reportJson)]
    pub fn report_json(&self) -> String {
        self.session
            .report(self.quiz_score)
            .and_then(|r| serde_json::to_string(&r).ok())
            .unwrap_or_default()
    }
}
