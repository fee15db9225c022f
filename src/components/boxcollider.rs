use bevy_ecs::prelude::Component;
use glam::Vec3;
use smallvec::{SmallVec, smallvec};

use crate::components::pose::Pose;

/// One axis-aligned box of collision geometry, relative to the owner's pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderBox {
    pub size: Vec3,
    pub offset: Vec3,
}

impl ColliderBox {
    /// Returns (min, max) of the box for a given owner pose.
    /// The offset follows the owner's rotation, the extents stay axis-aligned.
    /// Negative sizes are normalized.
    pub fn aabb(&self, pose: &Pose) -> (Vec3, Vec3) {
        let center = pose.transform_point(self.offset);
        let half = self.size.abs() * 0.5;
        (center - half, center + half)
    }
}

/// Collision geometry owned by an entity. An atom may own several pieces;
/// overlap polling reports the owning entity once.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct BoxCollider {
    pub boxes: SmallVec<[ColliderBox; 2]>,
}

impl BoxCollider {
    /// Single box of the given size centered on the owner.
    pub fn new(size: Vec3) -> Self {
        Self {
            boxes: smallvec![ColliderBox {
                size,
                offset: Vec3::ZERO,
            }],
        }
    }

    /// Cube of edge `edge` centered on the owner.
    pub fn cube(edge: f32) -> Self {
        Self::new(Vec3::splat(edge))
    }

    /// Add another box of geometry.
    pub fn with_box(mut self, size: Vec3, offset: Vec3) -> Self {
        self.boxes.push(ColliderBox { size, offset });
        self
    }

    /// AABB vs AABB overlap test of any owned box against a world-space volume.
    pub fn overlaps(&self, pose: &Pose, min: Vec3, max: Vec3) -> bool {
        self.boxes.iter().any(|b| {
            let (bmin, bmax) = b.aabb(pose);
            bmin.cmplt(max).all() && bmax.cmpgt(min).all()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlaps_touching_volume() {
        let collider = BoxCollider::cube(1.0);
        let pose = Pose::at(Vec3::ZERO);
        assert!(collider.overlaps(&pose, Vec3::splat(0.4), Vec3::splat(0.6)));
        assert!(!collider.overlaps(&pose, Vec3::splat(0.6), Vec3::splat(0.8)));
    }

    #[test]
    fn test_any_box_overlaps() {
        let collider = BoxCollider::cube(0.2).with_box(Vec3::splat(0.2), Vec3::new(2.0, 0.0, 0.0));
        let pose = Pose::at(Vec3::ZERO);
        let (min, max) = (Vec3::new(1.95, -0.05, -0.05), Vec3::new(2.05, 0.05, 0.05));
        assert!(collider.overlaps(&pose, min, max));
    }

    #[test]
    fn test_negative_size_is_normalized() {
        let collider = BoxCollider::new(Vec3::new(-1.0, -1.0, -1.0));
        let pose = Pose::at(Vec3::new(5.0, 0.0, 0.0));
        let around = |p: Vec3| (p - Vec3::splat(0.01), p + Vec3::splat(0.01));
        let (min, max) = around(Vec3::new(5.4, 0.4, -0.4));
        assert!(collider.overlaps(&pose, min, max));
        let (min, max) = around(Vec3::new(5.6, 0.0, 0.0));
        assert!(!collider.overlaps(&pose, min, max));
    }
}
