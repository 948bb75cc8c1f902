//! Physics Racer entry point
//!
//! On the web the page drives `web::WebRace`. Natively this runs a headless
//! autopiloted race and logs the result.
//!
//! Usage: physics-racer [tuning.json] [seed] [quiz_score]

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use physics_racer::tuning::RaceTuning;
    use physics_racer::{RaceSession, car_for_score};

    env_logger::init();
    log::info!("Physics Racer (native) starting...");

    let args: Vec<String> = std::env::args().collect();

    let tuning = match args.get(1).filter(|p| p.as_str() != "-") {
        Some(path) => match load_tuning(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => RaceTuning::default(),
    };

    let (seed, quiz_score) = match (
        parse_arg::<u64>(&args, 2, "seed", 42),
        parse_arg::<u32>(&args, 3, "quiz score", 5),
    ) {
        (Ok(seed), Ok(score)) => (seed, score),
        (Err(e), _) | (_, Err(e)) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let car = car_for_score(quiz_score);
    log::info!(
        "Quiz score {} unlocks {} ({})",
        quiz_score,
        car.name,
        car.tier.as_str()
    );

    let mut session = RaceSession::new(car, tuning, seed);
    session.set_autopilot(true);
    session.on_finish(|outcome, correct, total| {
        log::info!("Finish: {:?} with {}/{} correct", outcome, correct, total);
    });

    // Ten simulated minutes at 60 fps is far beyond any race
    const FRAME_DT: f32 = 1.0 / 60.0;
    for _ in 0..(60 * 600) {
        for event in session.advance(FRAME_DT) {
            log::debug!("{:?}", event);
        }
        if session.is_finished() {
            break;
        }
    }

    match session.report(quiz_score) {
        Some(report) => {
            log::info!("{}: {}", report.headline(), report.summary());
            log::info!(
                "Time {:.2}s, top speed {} km/h, accuracy {}%",
                report.finish_time,
                report.top_speed_kmh,
                report.accuracy_percent
            );
        }
        None => log::warn!("Race did not finish"),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(
    path: &str,
) -> Result<physics_racer::tuning::RaceTuning, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(physics_racer::tuning::RaceTuning::from_json(&json)?)
}

/// Positional argument `index`, or `default` when absent
#[cfg(not(target_arch = "wasm32"))]
fn parse_arg<T>(args: &[String], index: usize, name: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match args.get(index) {
        Some(raw) => raw
            .parse()
            .map_err(|e| format!("Invalid {} '{}': {}", name, raw, e)),
        None => Ok(default),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_main, this is just to satisfy the compiler
}
