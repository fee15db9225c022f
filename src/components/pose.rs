//! World-space pose of an entity.
//!
//! Every placeable entity (people, injectors, loads, cases, collision zones,
//! lid handles) carries a [`Pose`]. Follow systems rewrite it every fixed tick
//! for entities that are rigidly bound to another one.

use bevy_ecs::prelude::Component;
use glam::{Quat, Vec3};

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// World point of `local` expressed in this pose's frame
    /// (`position + rotation * local`).
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Inverse of [`Pose::transform_point`].
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }
}

/// Marker present while the host reports a manual grab on the entity.
///
/// Follow systems leave grabbed entities where the hand puts them.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Grabbed;
