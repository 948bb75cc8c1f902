//! Race simulation module
//!
//! All race logic lives here. This module must stay pure:
//! - Time only advances through `tick`
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod drivetrain;
pub mod gates;
pub mod state;
pub mod tick;

pub use gates::Gate;
pub use state::{Lane, RaceEvent, RaceOutcome, RacePhase, RaceState, ShiftQuality};
pub use tick::{TickInput, request_shift, submit_answer, tick};
