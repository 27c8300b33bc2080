//! Real and scaled game time
//!
//! The session slows the game clock for bullet time; anything that must keep
//! real-time pacing reads the unscaled delta instead.

use crate::consts::NORMAL_TIME_SCALE;

#[derive(Debug, Clone)]
pub struct GameClock {
    scale: f32,
    real_dt: f32,
    game_dt: f32,
    real_elapsed: f64,
    game_elapsed: f64,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock {
    pub fn new() -> Self {
        Self {
            scale: NORMAL_TIME_SCALE,
            real_dt: 0.0,
            game_dt: 0.0,
            real_elapsed: 0.0,
            game_elapsed: 0.0,
        }
    }

    /// Start a new tick of `real_dt` seconds at the current scale
    pub fn advance(&mut self, real_dt: f32) {
        let real_dt = real_dt.max(0.0);
        self.real_dt = real_dt;
        self.game_dt = real_dt * self.scale;
        self.real_elapsed += real_dt as f64;
        self.game_elapsed += self.game_dt as f64;
    }

    /// Real seconds elapsed this tick
    pub fn unscaled_elapsed(&self) -> f32 {
        self.real_dt
    }

    /// Game seconds elapsed this tick
    pub fn scaled_elapsed(&self) -> f32 {
        self.game_dt
    }

    /// Change the game clock rate; takes effect from the next tick
    pub fn set_scale(&mut self, factor: f32) {
        self.scale = factor.max(0.0);
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn real_time(&self) -> f64 {
        self.real_elapsed
    }

    pub fn game_time(&self) -> f64 {
        self.game_elapsed
    }
}
