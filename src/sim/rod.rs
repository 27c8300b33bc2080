//! Fishing rod capture zone
//!
//! Idle, the rod swings and the hook hangs a short line below the tip. A cast
//! locks the current direction, extends the hook until it hits the max length
//! or catches something, then retracts it. The rod only moves while the
//! session is in Play.

use glam::Vec2;

use super::clock::GameClock;
use super::state::{Collectible, CollectibleKind, EntityId, GameEvent, SessionState};
use crate::hang_direction;
use crate::settings::RodSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RodPhase {
    #[default]
    Idle,
    Extending,
    Retracting,
}

/// What the hook is carrying back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hooked {
    pub entity: EntityId,
    pub kind: CollectibleKind,
    /// Pinned to the hook while retracting
    pub pos: Vec2,
}

#[derive(Debug, Clone)]
pub struct FishingRod {
    settings: RodSettings,
    phase: RodPhase,
    swing_time: f32,
    /// Degrees, 0 = straight down
    angle: f32,
    line_length: f32,
    hook: Vec2,
    saved_angle: f32,
    cast_dir: Vec2,
    hooked: Option<Hooked>,
}

impl FishingRod {
    pub fn new(settings: RodSettings) -> Self {
        let mut rod = Self {
            settings,
            phase: RodPhase::Idle,
            swing_time: 0.0,
            angle: 0.0,
            line_length: 0.0,
            hook: settings.tip,
            saved_angle: 0.0,
            cast_dir: hang_direction(0.0),
            hooked: None,
        };
        rod.hang_idle();
        rod
    }

    pub fn phase(&self) -> RodPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase != RodPhase::Idle
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn tip(&self) -> Vec2 {
        self.settings.tip
    }

    pub fn hook_pos(&self) -> Vec2 {
        self.hook
    }

    pub fn hook_radius(&self) -> f32 {
        self.settings.hook_radius
    }

    pub fn line_length(&self) -> f32 {
        self.line_length
    }

    pub fn hooked(&self) -> Option<&Hooked> {
        self.hooked.as_ref()
    }

    fn hang_idle(&mut self) {
        self.hook = self.settings.tip + hang_direction(self.angle) * self.settings.idle_line_length;
    }

    /// Back to a still, idle rod (scene load)
    pub fn reset(&mut self) {
        self.phase = RodPhase::Idle;
        self.swing_time = 0.0;
        self.angle = 0.0;
        self.line_length = 0.0;
        self.hooked = None;
        self.hang_idle();
    }

    /// Start a cast along the current swing direction
    pub fn cast(&mut self, state: SessionState, events: &mut Vec<GameEvent>) -> bool {
        if state != SessionState::Play || self.is_busy() {
            return false;
        }
        self.phase = RodPhase::Extending;
        self.hooked = None;
        self.saved_angle = self.angle;
        self.cast_dir = hang_direction(self.angle);
        self.line_length = 0.0;
        events.push(GameEvent::Cast);
        true
    }

    /// Advance one tick.
    ///
    /// `overlap` answers which live collectible, if any, overlaps a disc of the
    /// given radius. Returns the entity the hook just touched; the caller
    /// settles the capture and hands the result back through [`Self::attach`].
    pub fn update(
        &mut self,
        state: SessionState,
        bullet_time: bool,
        swing_factor: f32,
        clock: &GameClock,
        overlap: impl Fn(Vec2, f32) -> Option<EntityId>,
    ) -> Option<EntityId> {
        if state != SessionState::Play {
            return None;
        }

        let dt = clock.unscaled_elapsed();
        match self.phase {
            RodPhase::Idle => {
                // Slows a little in bullet time, never as much as the world
                let swing_dt = if bullet_time {
                    dt * swing_factor
                } else {
                    clock.scaled_elapsed()
                };
                self.swing(swing_dt);
                None
            }
            RodPhase::Extending => {
                self.line_length = (self.line_length + self.settings.extend_speed * dt)
                    .min(self.settings.max_line_length);
                self.hook = self.settings.tip + self.cast_dir * self.line_length;
                let touched = self.touch(&overlap);
                if self.line_length >= self.settings.max_line_length {
                    self.phase = RodPhase::Retracting;
                }
                touched
            }
            RodPhase::Retracting => {
                self.line_length = (self.line_length - self.settings.retract_speed * dt).max(0.0);
                self.hook = self.settings.tip + self.cast_dir * self.line_length;
                if let Some(hooked) = self.hooked.as_mut() {
                    hooked.pos = self.hook;
                }
                if self.line_length <= 0.0 {
                    self.finish_cast();
                    return None;
                }
                self.touch(&overlap)
            }
        }
    }

    fn swing(&mut self, dt: f32) {
        self.swing_time += dt;
        let phase = self.swing_time * self.settings.swing_hz * std::f32::consts::TAU;
        self.angle = self.settings.max_swing_deg * phase.sin();
        self.hang_idle();
    }

    fn touch(&self, overlap: &impl Fn(Vec2, f32) -> Option<EntityId>) -> Option<EntityId> {
        if self.hooked.is_some() {
            return None;
        }
        overlap(self.hook, self.settings.hook_radius)
    }

    /// Hold a captured collectible for the rest of the cast
    pub fn attach(&mut self, caught: &Collectible) {
        if !self.is_busy() || self.hooked.is_some() {
            return;
        }
        self.hooked = Some(Hooked {
            entity: caught.id,
            kind: caught.kind,
            pos: self.hook,
        });
        self.phase = RodPhase::Retracting;
    }

    fn finish_cast(&mut self) {
        self.phase = RodPhase::Idle;
        self.line_length = 0.0;
        self.hooked = None;
        self.angle = self.saved_angle;
        self.hook = self.settings.tip + self.cast_dir * self.settings.idle_line_length;
    }
}
