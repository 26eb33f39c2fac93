//! Axis-aligned bounding boxes for contact checks
//!
//! Entities are tracked by their center; boxes are derived on demand.

use glam::Vec2;

/// Axis-aligned box described by center and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: f32) -> Self {
        Self {
            center,
            half: Vec2::splat(size / 2.0),
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Overlap test; boxes that only touch along an edge do not intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half + other.half;
        d.x < reach.x && d.y < reach.y
    }
}

/// Clamp a center so a box of `size` stays inside `[0, bounds]`
pub fn clamp_center(center: Vec2, size: f32, bounds: Vec2) -> Vec2 {
    let half = Vec2::splat(size / 2.0);
    center.clamp(half, (bounds - half).max(half))
}
