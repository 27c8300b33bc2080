//! Odyssea - a timed arcade fishing game core
//!
//! Core modules:
//! - `sim`: Session state machine, bullet time, collectible population, fishing rod
//! - `settings`: Data-driven tuning loaded from JSON
//! - `records`: Persisted best scores for the speed-run level
//! - `audio`: Maps game events to named audio cues
//! - `error`: Errors at the file-backed edges

pub mod audio;
pub mod error;
pub mod records;
pub mod settings;
pub mod sim;

pub use audio::{AudioBus, Feedback, SoundCue};
pub use error::{SettingsError, StoreError};
pub use records::{JsonFileStore, MemoryStore, ScoreStore};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Persistence key for the speed-run record
    pub const TIME_ATTACK_KEY: &str = "SpeedRunHighScore";

    /// Bullet time: the warning flicker starts after this share of the duration
    pub const FLICKER_START_FRACTION: f32 = 0.7;
    /// Number of highlight/standard alternations (each counts twice)
    pub const FLICKER_COUNT: u32 = 10;

    /// Normal game clock rate
    pub const NORMAL_TIME_SCALE: f32 = 1.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Direction a rod tip rotated by `angle_deg` points "down" along.
///
/// At 0° the hook hangs straight down; positive angles swing it to the right.
#[inline]
pub fn hang_direction(angle_deg: f32) -> Vec2 {
    let a = angle_deg.to_radians();
    Vec2::new(a.sin(), -a.cos())
}
