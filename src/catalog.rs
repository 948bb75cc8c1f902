//! Car catalog
//!
//! Static table of the cars a quiz score can unlock. Stats are 0-100 and feed
//! the race physics as multipliers.

use serde::{Deserialize, Serialize};

/// Car rarity tier, unlocked by quiz score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl CarTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarTier::Bronze => "Bronze",
            CarTier::Silver => "Silver",
            CarTier::Gold => "Gold",
            CarTier::Platinum => "Platinum",
            CarTier::Diamond => "Diamond",
        }
    }
}

/// Performance stats, each 0-100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarStats {
    pub top_speed: f32,
    pub acceleration: f32,
    pub handling: f32,
    pub nitro: f32,
}

/// Vehicle body parameters (used by the 3D scene, not the race integrator)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CarPhysics {
    pub mass: f32,
    pub friction: f32,
    pub drag: f32,
}

/// An unlockable car
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub tier: CarTier,
    pub color: &'static str,
    pub accent_color: &'static str,
    pub model_color: &'static str,
    pub emissive_color: &'static str,
    pub physics: CarPhysics,
    pub stats: CarStats,
    pub description: &'static str,
    /// Lowest quiz score that unlocks this car
    pub min_score: u32,
}

impl CarConfig {
    /// Speedometer full-scale value (sim units)
    pub fn gauge_max_speed(&self) -> f32 {
        self.stats.top_speed / 100.0 * 520.0
    }
}

/// All cars, ordered by ascending `min_score`
pub static CAR_CONFIGS: [CarConfig; 5] = [
    CarConfig {
        id: "streetrunner",
        name: "Street Runner MK-I",
        tier: CarTier::Bronze,
        color: "#8B7355",
        accent_color: "#CD853F",
        model_color: "#8B7355",
        emissive_color: "#CD853F",
        physics: CarPhysics { mass: 1200.0, friction: 0.8, drag: 0.35 },
        stats: CarStats { top_speed: 65.0, acceleration: 55.0, handling: 60.0, nitro: 40.0 },
        description: "A reliable starter. Gets the job done, but nothing fancy.",
        min_score: 0,
    },
    CarConfig {
        id: "thunderbolt",
        name: "Thunderbolt V6",
        tier: CarTier::Silver,
        color: "#A8A8A8",
        accent_color: "#00e5ff",
        model_color: "#A8A8A8",
        emissive_color: "#00e5ff",
        physics: CarPhysics { mass: 1100.0, friction: 0.85, drag: 0.32 },
        stats: CarStats { top_speed: 72.0, acceleration: 65.0, handling: 68.0, nitro: 55.0 },
        description: "Balanced performance with a kick of turbo when you need it.",
        min_score: 2,
    },
    CarConfig {
        id: "phantom",
        name: "Phantom GT-R",
        tier: CarTier::Gold,
        color: "#FFD700",
        accent_color: "#FF8C00",
        model_color: "#FFD700",
        emissive_color: "#FF8C00",
        physics: CarPhysics { mass: 1000.0, friction: 0.9, drag: 0.3 },
        stats: CarStats { top_speed: 80.0, acceleration: 75.0, handling: 78.0, nitro: 65.0 },
        description: "A golden beast that dominates the quarter mile.",
        min_score: 3,
    },
    CarConfig {
        id: "vortex",
        name: "Vortex X-9",
        tier: CarTier::Platinum,
        color: "#E5E4E2",
        accent_color: "#ff1744",
        model_color: "#E5E4E2",
        emissive_color: "#ff1744",
        physics: CarPhysics { mass: 900.0, friction: 0.95, drag: 0.28 },
        stats: CarStats { top_speed: 88.0, acceleration: 85.0, handling: 82.0, nitro: 80.0 },
        description: "Cutting-edge engineering. Feels like driving the future.",
        min_score: 4,
    },
    CarConfig {
        id: "nebula",
        name: "Nebula Hyperion",
        tier: CarTier::Diamond,
        color: "#00e5ff",
        accent_color: "#ff1744",
        model_color: "#00e5ff",
        emissive_color: "#ff1744",
        physics: CarPhysics { mass: 800.0, friction: 1.0, drag: 0.25 },
        stats: CarStats { top_speed: 95.0, acceleration: 92.0, handling: 90.0, nitro: 95.0 },
        description: "The ultimate machine. Pure velocity incarnate.",
        min_score: 5,
    },
];

/// Resolve a quiz score to the best car it unlocks
pub fn car_for_score(score: u32) -> &'static CarConfig {
    CAR_CONFIGS
        .iter()
        .rev()
        .find(|car| score >= car.min_score)
        .unwrap_or(&CAR_CONFIGS[0])
}

pub fn car_by_id(id: &str) -> Option<&'static CarConfig> {
    CAR_CONFIGS.iter().find(|car| car.id == id)
}
