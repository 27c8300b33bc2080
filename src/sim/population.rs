//! Collectible population
//!
//! Keeps up to `cap` collectibles alive inside the water area. A maintenance
//! poll tops the population up one entity at a time; captures schedule a
//! delayed replacement.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::area::AreaShape;
use super::obstacle::ObstacleQuery;
use super::state::{Collectible, CollectibleKind, EntityId, GameEvent, SessionState};
use super::timers::{ClockDomain, Owner, TimerAction, TimerId, Timers};
use crate::polar_to_cartesian;
use crate::settings::SpawnerSettings;

/// One weighted row of the spawn table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub kind: CollectibleKind,
    pub weight: f32,
}

impl SpawnEntry {
    pub fn new(kind: CollectibleKind, weight: f32) -> Self {
        Self { kind, weight }
    }

    fn is_eligible(&self) -> bool {
        self.weight.is_finite() && self.weight > 0.0
    }
}

/// Pick a kind with probability proportional to its weight.
///
/// `draw` is a uniform sample in [0, 1). Entries with a non-positive weight
/// never win. Returns `None` when nothing is eligible.
pub fn pick_weighted(entries: &[SpawnEntry], draw: f32) -> Option<CollectibleKind> {
    let total: f32 = entries
        .iter()
        .filter(|e| e.is_eligible())
        .map(|e| e.weight)
        .sum();
    if total <= 0.0 {
        return None;
    }

    let r = draw * total;
    let mut acc = 0.0;
    let mut last = None;
    for entry in entries.iter().filter(|e| e.is_eligible()) {
        acc += entry.weight;
        if r <= acc {
            return Some(entry.kind);
        }
        last = Some(entry.kind);
    }
    // Float rounding can leave r a hair above the final sum
    last
}

/// Spawner misconfiguration; logged, never fatal
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnConfigIssue {
    #[error("spawn list is empty, nothing will spawn")]
    NoEntries,
    #[error("spawn weights sum to zero, nothing will spawn")]
    ZeroTotalWeight,
    #[error("placement attempt budget is zero, nothing will spawn")]
    ZeroAttempts,
    #[error("population cap is zero, nothing will spawn")]
    ZeroCap,
    #[error("edge padding {padding} leaves no room inside the water area")]
    PaddingTooLarge { padding: f32 },
}

/// Where candidates are drawn from
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnArea {
    Water(AreaShape),
    /// Fallback when no water area is configured
    Disc { center: Vec2, radius: f32 },
}

/// Per-placement constraints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRules {
    pub edge_padding: f32,
    pub entity_radius: f32,
    pub min_gap: f32,
    pub max_attempts: u32,
}

impl PlacementRules {
    /// Closest two collectible centers may be
    pub fn min_separation(&self) -> f32 {
        self.entity_radius * 2.0 + self.min_gap
    }
}

pub struct PopulationManager {
    entries: Vec<SpawnEntry>,
    cap: usize,
    check_interval: f32,
    until_check: f32,
    area: SpawnArea,
    /// Reference point for obstacle line tests
    origin: Vec2,
    rules: PlacementRules,
    live: Vec<Collectible>,
    next_id: EntityId,
    rng: Pcg32,
}

impl PopulationManager {
    pub fn new(settings: &SpawnerSettings, seed: u64) -> Self {
        let area = match &settings.water_area {
            Some(shape) => SpawnArea::Water(shape.clone()),
            None => SpawnArea::Disc {
                center: settings.origin,
                radius: settings.spawn_radius,
            },
        };
        let manager = Self {
            entries: settings.entries.clone(),
            cap: settings.max_population,
            check_interval: settings.check_interval,
            until_check: 0.0,
            area,
            origin: settings.origin,
            rules: PlacementRules {
                edge_padding: settings.edge_padding,
                entity_radius: settings.entity_radius,
                min_gap: settings.min_gap,
                max_attempts: settings.max_attempts,
            },
            live: Vec::new(),
            next_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        };
        for issue in manager.config_issues() {
            log::warn!("[Spawner] {issue}");
        }
        manager
    }

    /// Problems that will keep anything from spawning
    pub fn config_issues(&self) -> Vec<SpawnConfigIssue> {
        let mut issues = Vec::new();
        if self.entries.is_empty() {
            issues.push(SpawnConfigIssue::NoEntries);
        } else if !self.entries.iter().any(|e| e.is_eligible()) {
            issues.push(SpawnConfigIssue::ZeroTotalWeight);
        }
        if self.rules.max_attempts == 0 {
            issues.push(SpawnConfigIssue::ZeroAttempts);
        }
        if self.cap == 0 {
            issues.push(SpawnConfigIssue::ZeroCap);
        }
        if let SpawnArea::Water(shape) = &self.area {
            if padded_bounds(shape, self.rules.edge_padding).is_none() {
                issues.push(SpawnConfigIssue::PaddingTooLarge {
                    padding: self.rules.edge_padding,
                });
            }
        }
        issues
    }

    pub fn live(&self) -> &[Collectible] {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn rules(&self) -> PlacementRules {
        self.rules
    }

    pub fn get(&self, id: EntityId) -> Option<&Collectible> {
        self.live.iter().find(|c| c.id == id && c.alive)
    }

    /// Spawning is allowed only in Play and below the cap
    pub fn can_spawn(&self, state: SessionState) -> bool {
        state == SessionState::Play && self.live.len() < self.cap
    }

    /// Periodic upkeep: prune externally destroyed entries, then add at most
    /// one collectible if under the cap
    pub fn maintain(
        &mut self,
        dt: f32,
        state: SessionState,
        obstacles: &dyn ObstacleQuery,
        events: &mut Vec<GameEvent>,
    ) -> Option<EntityId> {
        self.until_check -= dt;
        if self.until_check > 0.0 {
            return None;
        }
        self.until_check = self.check_interval;

        self.prune();
        if self.live.len() < self.cap {
            self.try_spawn_one(state, obstacles, events)
        } else {
            None
        }
    }

    /// Forget entries destroyed by something other than a capture
    pub fn prune(&mut self) -> usize {
        let before = self.live.len();
        self.live.retain(|c| c.alive);
        before - self.live.len()
    }

    /// Mark a collectible destroyed by an unrelated cause; pruned on the next poll
    pub fn despawn(&mut self, id: EntityId) -> bool {
        match self.live.iter_mut().find(|c| c.id == id && c.alive) {
            Some(c) => {
                c.alive = false;
                true
            }
            None => false,
        }
    }

    pub fn try_spawn_one(
        &mut self,
        state: SessionState,
        obstacles: &dyn ObstacleQuery,
        events: &mut Vec<GameEvent>,
    ) -> Option<EntityId> {
        if !self.can_spawn(state) {
            return None;
        }
        let kind = self.pick_kind()?;

        let Some(pos) = self.find_position(obstacles) else {
            log::warn!(
                "[Spawner] no free position found after {} attempts",
                self.rules.max_attempts
            );
            return None;
        };

        let id = self.next_id;
        self.next_id += 1;
        let flip_x = self.rng.random_bool(0.5);
        self.live.push(Collectible {
            id,
            kind,
            pos,
            alive: true,
            flip_x,
        });
        events.push(GameEvent::Spawned { entity: id, kind, pos });
        Some(id)
    }

    pub fn pick_kind(&mut self) -> Option<CollectibleKind> {
        let draw: f32 = self.rng.random();
        pick_weighted(&self.entries, draw)
    }

    /// Rejection-sample a position satisfying every placement constraint
    pub fn find_position(&mut self, obstacles: &dyn ObstacleQuery) -> Option<Vec2> {
        match self.area.clone() {
            SpawnArea::Water(shape) => self.sample_water(&shape, obstacles),
            SpawnArea::Disc { center, radius } => self.sample_disc(center, radius, obstacles),
        }
    }

    fn sample_water(&mut self, shape: &AreaShape, obstacles: &dyn ObstacleQuery) -> Option<Vec2> {
        let (lo, hi) = padded_bounds(shape, self.rules.edge_padding)?;

        for _ in 0..self.rules.max_attempts {
            let candidate = Vec2::new(
                lo.x + (hi.x - lo.x) * self.rng.random::<f32>(),
                lo.y + (hi.y - lo.y) * self.rng.random::<f32>(),
            );

            if !shape.contains_point(candidate) {
                continue;
            }
            if candidate.distance(self.origin) > 1e-4
                && !obstacles.line_clear(self.origin, candidate)
            {
                continue;
            }
            if self.too_close_to_existing(candidate) {
                continue;
            }
            return Some(candidate);
        }
        None
    }

    fn sample_disc(
        &mut self,
        center: Vec2,
        radius: f32,
        obstacles: &dyn ObstacleQuery,
    ) -> Option<Vec2> {
        for _ in 0..self.rules.max_attempts {
            let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
            // sqrt keeps the density uniform over the disc's area
            let r = self.rng.random::<f32>().sqrt() * radius;
            let candidate = center + polar_to_cartesian(r, angle);

            if r > 1e-4 && !obstacles.line_clear(center, candidate) {
                continue;
            }
            if obstacles.disc_overlaps_obstacle(candidate, self.rules.entity_radius) {
                continue;
            }
            if self.too_close_to_existing(candidate) {
                continue;
            }
            return Some(candidate);
        }
        None
    }

    fn too_close_to_existing(&self, candidate: Vec2) -> bool {
        let min_dist = self.rules.min_separation();
        self.live
            .iter()
            .filter(|c| c.alive)
            .any(|c| c.pos.distance(candidate) < min_dist)
    }

    /// First live collectible overlapping a disc at `p`
    pub fn overlapping(&self, p: Vec2, r: f32) -> Option<&Collectible> {
        let reach = r + self.rules.entity_radius;
        self.live
            .iter()
            .filter(|c| c.alive)
            .find(|c| c.pos.distance(p) <= reach)
    }

    /// Remove a captured collectible and schedule its replacement
    pub fn report_capture(
        &mut self,
        id: EntityId,
        timers: &mut Timers,
        events: &mut Vec<GameEvent>,
    ) -> Option<Collectible> {
        let index = self.live.iter().position(|c| c.id == id && c.alive)?;
        let caught = self.live.swap_remove(index);

        log::info!(
            "{} was caught! +{} points. {}",
            caught.kind.display_name(),
            caught.kind.score_value(),
            caught.kind.catch_line()
        );
        events.push(GameEvent::Captured {
            entity: caught.id,
            kind: caught.kind,
        });
        self.request_respawn(caught.id, caught.kind.respawn_delay(), timers);
        Some(caught)
    }

    /// Attempt one spawn after `delay` seconds of game time
    pub fn request_respawn(
        &mut self,
        entity: EntityId,
        delay: f32,
        timers: &mut Timers,
    ) -> TimerId {
        log::debug!("[Spawner] respawn for #{entity} in {delay:.1}s");
        timers.schedule(Owner::Population, ClockDomain::Game, delay, TimerAction::Respawn)
    }

    /// A respawn timer fired; dropped unless the session is still in Play
    pub fn on_respawn_due(
        &mut self,
        state: SessionState,
        obstacles: &dyn ObstacleQuery,
        events: &mut Vec<GameEvent>,
    ) -> Option<EntityId> {
        if state != SessionState::Play {
            log::debug!("[Spawner] respawn dropped, session is {}", state.as_str());
            return None;
        }
        self.try_spawn_one(state, obstacles, events)
    }

    /// Drop the whole population and any pending respawns (level load)
    pub fn reset(&mut self, timers: &mut Timers) {
        let dropped = timers.cancel_owner(Owner::Population);
        if dropped > 0 {
            log::debug!("[Spawner] cancelled {dropped} pending respawn(s)");
        }
        self.live.clear();
        self.until_check = 0.0;
    }
}

/// Bounding box of `shape` shrunk by `padding`, `None` if nothing is left
fn padded_bounds(shape: &AreaShape, padding: f32) -> Option<(Vec2, Vec2)> {
    let (lo, hi) = shape.bounds();
    let lo = lo + Vec2::splat(padding);
    let hi = hi - Vec2::splat(padding);
    (lo.x <= hi.x && lo.y <= hi.y).then_some((lo, hi))
}
