//! Spawn area geometry
//!
//! The water area collectibles are placed in: an axis-aligned box or an
//! arbitrary simple polygon.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum AreaShape {
    Rect { min: Vec2, max: Vec2 },
    /// Simple polygon, vertices in order (either winding)
    Polygon { points: Vec<Vec2> },
}

impl AreaShape {
    /// Axis-aligned bounding box as (min, max)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        match self {
            AreaShape::Rect { min, max } => (min.min(*max), min.max(*max)),
            AreaShape::Polygon { points } => {
                let Some(first) = points.first() else {
                    return (Vec2::ZERO, Vec2::ZERO);
                };
                points
                    .iter()
                    .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)))
            }
        }
    }

    /// Check if a point is inside the area
    pub fn contains_point(&self, p: Vec2) -> bool {
        match self {
            AreaShape::Rect { .. } => {
                let (lo, hi) = self.bounds();
                p.x >= lo.x && p.x <= hi.x && p.y >= lo.y && p.y <= hi.y
            }
            AreaShape::Polygon { points } => point_in_polygon(p, points),
        }
    }
}

/// Even-odd ray crossing test
fn point_in_polygon(p: Vec2, points: &[Vec2]) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
