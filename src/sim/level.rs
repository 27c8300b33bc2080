//! Level table
//!
//! Which scene follows which, and the score each level asks for.

use serde::{Deserialize, Serialize};

/// Playable levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    One,
    Two,
    Three,
    /// Time attack: beat the persisted record instead of a fixed target
    SpeedRun,
}

/// Everything the game can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scene {
    /// Title/instructions screen
    Tutorial,
    Level(Level),
    /// End screen after the last level
    Thanks,
}

impl Level {
    pub fn name(&self) -> &'static str {
        match self {
            Level::One => "Level 1",
            Level::Two => "Level 2",
            Level::Three => "Level 3",
            Level::SpeedRun => "SpeedRun",
        }
    }

    pub fn is_time_attack(&self) -> bool {
        matches!(self, Level::SpeedRun)
    }

    /// Fixed target score, `None` for the time-attack level
    pub fn fixed_threshold(&self) -> Option<u32> {
        match self {
            Level::One => Some(200),
            Level::Two => Some(500),
            Level::Three => Some(1000),
            Level::SpeedRun => None,
        }
    }

    /// Scene loaded by "advance" after a win
    pub fn next(&self) -> Scene {
        match self {
            Level::One => Scene::Level(Level::Two),
            // Level 3 is only reachable by loading it directly
            Level::Two | Level::Three => Scene::Thanks,
            Level::SpeedRun => Scene::Level(Level::SpeedRun),
        }
    }
}

impl Scene {
    pub fn level(&self) -> Option<Level> {
        match self {
            Scene::Level(level) => Some(*level),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scene::Tutorial => "Tutorial",
            Scene::Level(level) => level.name(),
            Scene::Thanks => "Thanks",
        }
    }
}
