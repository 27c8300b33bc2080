//! Obstacle layer queries
//!
//! Spawn placement only needs binary answers: is the straight line to a
//! candidate clear, and does a disc at the candidate touch an obstacle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Obstacle tests used by spawn placement
pub trait ObstacleQuery {
    /// True if the segment `from -> to` touches no obstacle
    fn line_clear(&self, from: Vec2, to: Vec2) -> bool;

    /// True if a disc of radius `r` at `p` overlaps an obstacle
    fn disc_overlaps_obstacle(&self, p: Vec2, r: f32) -> bool;
}

/// Empty obstacle layer
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObstacles;

impl ObstacleQuery for NoObstacles {
    fn line_clear(&self, _from: Vec2, _to: Vec2) -> bool {
        true
    }

    fn disc_overlaps_obstacle(&self, _p: Vec2, _r: f32) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Obstacle {
    Circle { center: Vec2, radius: f32 },
    Rect { min: Vec2, max: Vec2 },
}

/// Signed distance to a circle
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Signed distance to an axis-aligned box
pub fn sd_box(p: Vec2, min: Vec2, max: Vec2) -> f32 {
    let center = (min + max) * 0.5;
    let half = (max - min).abs() * 0.5;
    let q = (p - center).abs() - half;
    q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0)
}

/// Distance from `p` to the segment `a -> b`
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return (p - a).length();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).length()
}

/// Slab test: does the segment `a -> b` pass through the box
fn segment_hits_box(a: Vec2, b: Vec2, min: Vec2, max: Vec2) -> bool {
    let (lo, hi) = (min.min(max), min.max(max));
    let d = b - a;
    let mut t_enter = 0.0f32;
    let mut t_exit = 1.0f32;

    for (origin, delta, lo, hi) in [(a.x, d.x, lo.x, hi.x), (a.y, d.y, lo.y, hi.y)] {
        if delta.abs() < 1e-9 {
            if origin < lo || origin > hi {
                return false;
            }
            continue;
        }
        let t1 = (lo - origin) / delta;
        let t2 = (hi - origin) / delta;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
        if t_enter > t_exit {
            return false;
        }
    }
    true
}

impl Obstacle {
    /// Signed distance from `p` to this obstacle
    pub fn distance(&self, p: Vec2) -> f32 {
        match *self {
            Obstacle::Circle { center, radius } => sd_circle(p, center, radius),
            Obstacle::Rect { min, max } => sd_box(p, min, max),
        }
    }

    pub fn blocks_segment(&self, from: Vec2, to: Vec2) -> bool {
        match *self {
            Obstacle::Circle { center, radius } => distance_to_segment(center, from, to) <= radius,
            Obstacle::Rect { min, max } => segment_hits_box(from, to, min, max),
        }
    }
}

/// Obstacle layer built from configured shapes
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl ObstacleQuery for ObstacleField {
    fn line_clear(&self, from: Vec2, to: Vec2) -> bool {
        !self.obstacles.iter().any(|o| o.blocks_segment(from, to))
    }

    fn disc_overlaps_obstacle(&self, p: Vec2, r: f32) -> bool {
        self.obstacles.iter().any(|o| o.distance(p) < r)
    }
}
