//! Collision zones: invisible proxy volumes that follow a parent entity and
//! raise a one-shot trigger action when something starts overlapping them.
//!
//! Zones are scene entities of kind
//! [`AtomKind::CollisionTrigger`](crate::components::sceneid::AtomKind). Their
//! names come from fixed templates filled with the parent's uid, so an
//! existing zone can be found again by name before a new one is created.
//!
//! # Related
//!
//! - [`crate::systems::collisionzone`] – provisioning, follow and overlap systems

use bevy_ecs::prelude::{Component, Entity};
use glam::Vec3;
use smallvec::SmallVec;

use crate::components::triggeraction::TriggerAction;

pub const INJECTOR_ZONE_TEMPLATE: &str = "MI_collision_{object_id}";
pub const INJECTOR_LOAD_ZONE_TEMPLATE: &str = "MI_collision_{object_id}_load";
pub const CASE_ZONE_TEMPLATE: &str = "MI_case_collision_{object_id}#{number}";
pub const LID_HANDLE_TEMPLATE: &str = "Lid_{object_id}";

/// Fill a zone name template with the owner uid and, if present, a slot number.
pub fn zone_name(template: &str, object_id: &str, number: Option<usize>) -> String {
    let name = template.replace("{object_id}", object_id);
    match number {
        Some(n) => name.replace("{number}", &n.to_string()),
        None => name,
    }
}

/// A proxy volume rigidly attached to `parent` at `offset`.
///
/// The volume is a cube of edge `size` centered on the zone's pose.
#[derive(Component, Debug, Clone)]
pub struct CollisionZone {
    pub parent: Entity,
    pub size: f32,
    pub offset: Vec3,
    /// Actions fired when an entity starts overlapping the zone.
    pub start_actions: Vec<TriggerAction>,
    /// Entities currently intersecting the volume, updated once per frame.
    pub overlapping: SmallVec<[Entity; 4]>,
}

impl CollisionZone {
    pub fn new(parent: Entity, size: f32, offset: Vec3) -> Self {
        Self {
            parent,
            size,
            offset,
            start_actions: Vec::new(),
            overlapping: SmallVec::new(),
        }
    }

    /// Write the outbound action. The first start action slot is reused if it
    /// already exists, so running this twice leaves a single action.
    pub fn wire(&mut self, action: TriggerAction) {
        match self.start_actions.first_mut() {
            Some(first) => *first = action,
            None => self.start_actions.push(action),
        }
    }

    /// World-space (min, max) of the volume centered at `center`.
    pub fn bounds(&self, center: Vec3) -> (Vec3, Vec3) {
        let half = Vec3::splat(self.size.abs() * 0.5);
        (center - half, center + half)
    }
}

/// Marker for hidden, non-interactive scene helpers.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Hidden;

/// Marker requesting zone provisioning for its owner. Removed once the zones
/// exist; inserted again after every scene save.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PendingZones;

/// Nullable reference to a zone entity.
///
/// The referenced zone may be torn down at any time (scene save, parent
/// destroyed); callers resolve it through a query and treat a miss as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneHandle(pub Option<Entity>);

impl ZoneHandle {
    pub fn get(&self) -> Option<Entity> {
        self.0
    }
    pub fn set(&mut self, entity: Entity) {
        self.0 = Some(entity);
    }
    pub fn clear(&mut self) -> Option<Entity> {
        self.0.take()
    }
}

/// Everything needed to look up or create one zone.
#[derive(Debug, Clone)]
pub struct ZoneSpec {
    pub name: String,
    pub size: f32,
    pub offset: Vec3,
    pub action: TriggerAction,
}
