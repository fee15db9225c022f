//! Scene construction helpers.
//!
//! Each helper spawns one atom with the components its role needs and
//! registers it under its uid in the
//! [`SceneRegistry`](crate::resources::sceneregistry::SceneRegistry).
//! Injectors and Cases are spawned with
//! [`PendingZones`](crate::components::collisionzone::PendingZones), so their
//! zones appear on the first frame after the scene has finished loading.

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::components::attributes::AttributeBanks;
use crate::components::blend::InjectionBlend;
use crate::components::boxcollider::BoxCollider;
use crate::components::case::{COLLISION_FIELD, Case, IDLE_COLLISION, LID_ELEMENT, PendingLid, lid_hinge};
use crate::components::collisionzone::PendingZones;
use crate::components::indicator::Indicator;
use crate::components::injector::Injector;
use crate::components::load::LoadResource;
use crate::components::pose::Pose;
use crate::components::sceneid::{AtomKind, SceneElements, SceneId};
use crate::components::signals::Signals;
use crate::resources::sceneregistry::SceneRegistry;

pub const PERSON_COLLIDER_SIZE: Vec3 = Vec3::new(0.5, 1.7, 0.3);
pub const PERSON_COLLIDER_OFFSET: Vec3 = Vec3::new(0.0, 0.85, 0.0);
pub const INJECTOR_COLLIDER_SIZE: Vec3 = Vec3::new(0.03, 0.06, 0.2);
pub const LOAD_COLLIDER_EDGE: f32 = 0.04;

fn register(world: &mut World, uid: &str, entity: Entity) {
    world.resource_mut::<SceneRegistry>().insert(uid, entity);
}

/// A target with attribute banks and a body-sized collider.
pub fn spawn_person(world: &mut World, uid: &str, pose: Pose, banks: AttributeBanks) -> Entity {
    let collider = BoxCollider {
        boxes: Default::default(),
    }
    .with_box(PERSON_COLLIDER_SIZE, PERSON_COLLIDER_OFFSET);
    let entity = world
        .spawn((SceneId::new(uid, AtomKind::Person), pose, banks, collider))
        .id();
    register(world, uid, entity);
    entity
}

pub fn spawn_injector(world: &mut World, uid: &str, pose: Pose) -> Entity {
    let entity = world
        .spawn((
            SceneId::prop(uid),
            pose,
            Injector::new(),
            InjectionBlend::new(),
            Signals::default(),
            BoxCollider::new(INJECTOR_COLLIDER_SIZE),
            PendingZones,
        ))
        .id();
    register(world, uid, entity);
    entity
}

pub fn spawn_load(world: &mut World, uid: &str, pose: Pose, load: LoadResource, color: [f32; 3]) -> Entity {
    let entity = world
        .spawn((
            SceneId::prop(uid),
            pose,
            load,
            Indicator::new(color),
            BoxCollider::cube(LOAD_COLLIDER_EDGE),
        ))
        .id();
    register(world, uid, entity);
    entity
}

/// A Case with its lid element.
pub fn spawn_case(world: &mut World, uid: &str, pose: Pose) -> Entity {
    let lid = world.spawn(Pose::new(lid_hinge(&pose), pose.rotation)).id();
    spawn_case_with_elements(world, uid, pose, SceneElements::default().with(LID_ELEMENT, lid))
}

/// A Case built from the given asset elements. The lid element is looked up
/// once the scene has finished loading.
pub fn spawn_case_with_elements(
    world: &mut World,
    uid: &str,
    pose: Pose,
    elements: SceneElements,
) -> Entity {
    let entity = world
        .spawn((
            SceneId::prop(uid),
            pose,
            Case::new(),
            Signals::default().with_scalar(COLLISION_FIELD, IDLE_COLLISION),
            elements,
            PendingZones,
            PendingLid,
        ))
        .id();
    register(world, uid, entity);
    entity
}

/// A plain prop with collision geometry and no role.
pub fn spawn_prop(world: &mut World, uid: &str, pose: Pose, collider: BoxCollider) -> Entity {
    let entity = world.spawn((SceneId::prop(uid), pose, collider)).id();
    register(world, uid, entity);
    entity
}
