//! Core simulation types
//!
//! Session phases, collectible kinds and the events the simulation emits for
//! presentation collaborators.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::Scene;

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Active gameplay
    #[default]
    Play,
    /// Paused by the player
    Pause,
    /// Countdown expired below the target
    TimesUp,
    /// Target reached (or record beaten in speed run)
    Win,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Play => "Play",
            SessionState::Pause => "Pause",
            SessionState::TimesUp => "TimesUp",
            SessionState::Win => "Win",
        }
    }
}

/// Identifier of a spawned collectible
pub type EntityId = u32;

/// Collectible kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    SmallFish,
    BigFish,
    Star,
}

impl CollectibleKind {
    pub const ALL: [CollectibleKind; 3] = [
        CollectibleKind::SmallFish,
        CollectibleKind::BigFish,
        CollectibleKind::Star,
    ];

    /// Points awarded on capture
    pub fn score_value(&self) -> u32 {
        match self {
            CollectibleKind::SmallFish => 25,
            CollectibleKind::BigFish => 20,
            CollectibleKind::Star => 30,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CollectibleKind::SmallFish => "Small Fish",
            CollectibleKind::BigFish => "Big Fish",
            CollectibleKind::Star => "Star",
        }
    }

    /// Seconds before a replacement spawn is attempted after a capture
    pub fn respawn_delay(&self) -> f32 {
        3.0
    }

    /// Line logged when caught
    pub fn catch_line(&self) -> &'static str {
        match self {
            CollectibleKind::SmallFish => "Splash! You caught a small fish!",
            CollectibleKind::BigFish => "Wow! A big fish!",
            CollectibleKind::Star => "WHooooa! You just got a STAR!!!",
        }
    }
}

/// A live collectible owned by the population manager
#[derive(Debug, Clone, PartialEq)]
pub struct Collectible {
    pub id: EntityId,
    pub kind: CollectibleKind,
    pub pos: Vec2,
    /// Cleared when destroyed by something other than a capture
    pub alive: bool,
    /// Presentation hint: sprite mirrored
    pub flip_x: bool,
}

/// Fire-and-forget notifications for presentation and audio collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    SceneLoaded { scene: Scene },
    StateChanged { from: SessionState, to: SessionState },
    /// Score changed; `ratio` is score / threshold clamped to [0, 1]
    ScoreChanged { score: u32, ratio: f32 },
    ThresholdChanged { threshold: u32 },
    CountdownWarning,
    /// Music low-pass filter engaged (any state but Play)
    FilterOn,
    FilterOff,
    BulletTimeStarted { duration: f32 },
    BulletTimeEnded,
    /// Player highlight toggled by bullet time and its warning flicker
    BulletTimeHighlight { on: bool },
    Cast,
    Captured { entity: EntityId, kind: CollectibleKind },
    Spawned { entity: EntityId, kind: CollectibleKind, pos: Vec2 },
    RecordBeaten { previous: u32, score: u32 },
    QuitRequested,
}
