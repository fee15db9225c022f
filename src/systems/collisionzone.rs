//! Collision zone systems.
//!
//! - provisioning: [`provision_injector_zones`], [`provision_case_zones`]
//!   build the zones of every owner marked
//!   [`PendingZones`](crate::components::collisionzone::PendingZones), once
//!   the scene has finished loading
//! - [`zone_follow_system`] keeps every zone rigidly attached to its parent
//! - [`zone_overlap_detector`] refreshes the overlap set of each zone and
//!   fires its start actions whenever an entity starts overlapping it
//! - [`cleanup_orphan_zones`] removes zones whose parent is gone
//!
//! Zones are looked up by name before being created, so running
//! provisioning again (after a save, or over a scene that already holds the
//! zones) never creates duplicates.

use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemParam;
use log::{debug, info};
use smallvec::SmallVec;

use crate::components::boxcollider::BoxCollider;
use crate::components::case::{Case, CaseSlot, compute_lid_angle, lid_tip};
use crate::components::collisionzone::{
    CollisionZone, Hidden, LID_HANDLE_TEMPLATE, PendingZones, ZoneHandle, ZoneSpec, zone_name,
};
use crate::components::injector::Injector;
use crate::components::pose::Pose;
use crate::components::sceneid::{AtomKind, SceneId};
use crate::events::grab::GrabPhase;
use crate::events::trigger::TriggerActionEvent;
use crate::resources::attachments::{AttachmentTracker, GrabAction};
use crate::resources::mechanicsconfig::MechanicsConfig;
use crate::resources::sceneregistry::SceneRegistry;

/// Zone creation primitive: lookup by name, create on miss.
#[derive(SystemParam)]
pub struct ZoneProvisioner<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub registry: ResMut<'w, SceneRegistry>,
    pub zones: Query<'w, 's, &'static mut CollisionZone>,
}

impl ZoneProvisioner<'_, '_> {
    /// Return the zone named `spec.name`, creating it if the scene has none.
    ///
    /// A new zone is hidden, scaled to `spec.size`, placed at the parent's
    /// current pose and wired with `spec.action`. An existing zone keeps its
    /// wiring and is only re-bound to `parent`.
    pub fn get_or_create(&mut self, parent: Entity, parent_pose: &Pose, spec: &ZoneSpec) -> Entity {
        if let Some(existing) = self.registry.lookup(&spec.name) {
            match self.zones.get_mut(existing) {
                Ok(mut zone) => {
                    zone.parent = parent;
                    zone.offset = spec.offset;
                }
                Err(_) => {
                    // Scene atom without zone state yet (just spawned, or
                    // restored bare from a saved scene).
                    let mut zone = CollisionZone::new(parent, spec.size, spec.offset);
                    zone.wire(spec.action.clone());
                    if let Ok(mut entity_commands) = self.commands.get_entity(existing) {
                        entity_commands.try_insert_if_new(zone);
                        entity_commands.try_insert(Hidden);
                    }
                }
            }
            debug!("reusing zone '{}'", spec.name);
            return existing;
        }

        let mut zone = CollisionZone::new(parent, spec.size, spec.offset);
        zone.wire(spec.action.clone());
        let entity = self
            .commands
            .spawn((
                SceneId::new(spec.name.clone(), AtomKind::CollisionTrigger),
                Pose::new(parent_pose.transform_point(spec.offset), Default::default()),
                zone,
                Hidden,
            ))
            .id();
        self.registry.insert(spec.name.clone(), entity);
        debug!("created zone '{}'", spec.name);
        entity
    }
}

/// Current overlap set of the zone behind `handle`. A stale or empty
/// handle yields nothing.
pub fn poll_overlaps(zones: &Query<&CollisionZone>, handle: ZoneHandle) -> SmallVec<[Entity; 4]> {
    handle
        .get()
        .and_then(|zone| zones.get(zone).ok())
        .map(|zone| zone.overlapping.clone())
        .unwrap_or_default()
}

pub fn provision_injector_zones(
    mut provisioner: ZoneProvisioner,
    config: Res<MechanicsConfig>,
    mut injectors: Query<(Entity, &SceneId, &Pose, &mut Injector), With<PendingZones>>,
) {
    if !provisioner.registry.is_ready() {
        return;
    }
    for (entity, id, pose, mut injector) in injectors.iter_mut() {
        let run = Injector::run_zone_spec(&id.uid, config.run_zone_size);
        let load = Injector::load_zone_spec(&id.uid, config.load_zone_size);
        let run_zone = provisioner.get_or_create(entity, pose, &run);
        let load_zone = provisioner.get_or_create(entity, pose, &load);
        injector.run_zone.set(run_zone);
        injector.load_zone.set(load_zone);
        provisioner.commands.entity(entity).remove::<PendingZones>();
        info!("Injector '{}' zones ready", id.uid);
    }
}

/// Build the slot zones and the lid handle of every pending Case.
///
/// The handle's `LidRelease` listener is registered once per handle and
/// survives save cycles.
pub fn provision_case_zones(
    mut provisioner: ZoneProvisioner,
    config: Res<MechanicsConfig>,
    mut tracker: ResMut<AttachmentTracker>,
    mut cases: Query<(Entity, &SceneId, &Pose, &mut Case), With<PendingZones>>,
    poses: Query<&Pose, Without<Case>>,
) {
    if !provisioner.registry.is_ready() {
        return;
    }
    for (entity, id, pose, mut case) in cases.iter_mut() {
        for slot in CaseSlot::all() {
            let spec = slot.zone_spec(&id.uid, config.slot_zone_size);
            let zone = provisioner.get_or_create(entity, pose, &spec);
            case.zones[slot.index()].set(zone);
        }

        let handle_name = zone_name(LID_HANDLE_TEMPLATE, &id.uid, None);
        let handle = match provisioner.registry.lookup(&handle_name) {
            Some(handle) => {
                if let Ok(handle_pose) = poses.get(handle) {
                    let previous = case.lid_angle;
                    case.lid_angle = compute_lid_angle(pose, handle_pose.position, previous);
                }
                handle
            }
            None => {
                let handle = provisioner
                    .commands
                    .spawn((
                        SceneId::new(handle_name.clone(), AtomKind::CustomAsset),
                        Pose::at(lid_tip(pose, case.lid_angle)),
                    ))
                    .id();
                provisioner.registry.insert(handle_name, handle);
                handle
            }
        };

        let registered = case.lid_handle == Some(handle)
            && case
                .lid_listener
                .is_some_and(|listener| tracker.has_listener(handle, listener));
        if !registered {
            let listener = tracker.add_listener(
                handle,
                GrabPhase::End,
                GrabAction::LidRelease { case: entity },
                false,
            );
            case.lid_listener = Some(listener);
        }
        case.lid_handle = Some(handle);

        provisioner.commands.entity(entity).remove::<PendingZones>();
        info!("Case '{}' zones ready", id.uid);
    }
}

/// Place every zone at `parentPosition + parentRotation * offset`.
pub fn zone_follow_system(
    mut zones: Query<(&CollisionZone, &mut Pose)>,
    parents: Query<&Pose, Without<CollisionZone>>,
) {
    for (zone, mut pose) in zones.iter_mut() {
        if let Ok(parent) = parents.get(zone.parent) {
            pose.position = parent.transform_point(zone.offset);
        }
    }
}

/// Refresh overlap sets and fire start actions.
///
/// Overlap is tested against the collision geometry of every entity except
/// the zone's own parent. An entity with several boxes is reported once.
/// The actions fire once per frame in which at least one entity entered,
/// so an occupant that stays inside does not mask a newcomer.
pub fn zone_overlap_detector(
    mut commands: Commands,
    mut zones: Query<(&mut CollisionZone, &Pose)>,
    colliders: Query<(Entity, &Pose, &BoxCollider), Without<CollisionZone>>,
) {
    for (mut zone, pose) in zones.iter_mut() {
        let (min, max) = zone.bounds(pose.position);
        let found: SmallVec<[Entity; 4]> = colliders
            .iter()
            .filter(|(entity, _, _)| *entity != zone.parent)
            .filter(|(_, collider_pose, collider)| collider.overlaps(collider_pose, min, max))
            .map(|(entity, _, _)| entity)
            .collect();

        let entered = found.iter().any(|e| !zone.overlapping.contains(e));
        if entered {
            for action in zone.start_actions.iter() {
                commands.trigger(TriggerActionEvent::from(action.clone()));
            }
        }
        zone.overlapping = found;
    }
}

/// Despawn zones whose parent no longer exists and drop handles pointing at
/// zones that are gone.
pub fn cleanup_orphan_zones(
    mut commands: Commands,
    mut registry: ResMut<SceneRegistry>,
    zones: Query<(Entity, &CollisionZone)>,
    existing: Query<()>,
    mut injectors: Query<&mut Injector>,
    mut cases: Query<&mut Case>,
) {
    for (entity, zone) in zones.iter() {
        if existing.get(zone.parent).is_err() {
            debug!("parent of zone {:?} is gone", entity);
            registry.forget(entity);
            commands.entity(entity).despawn();
        }
    }

    let stale = |handle: &ZoneHandle| handle.get().is_some_and(|zone| zones.get(zone).is_err());
    for mut injector in injectors.iter_mut() {
        if stale(&injector.run_zone) {
            injector.run_zone.clear();
        }
        if stale(&injector.load_zone) {
            injector.load_zone.clear();
        }
    }
    for mut case in cases.iter_mut() {
        for handle in case.zones.iter_mut() {
            if stale(handle) {
                handle.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::triggeraction::{TriggerAction, TriggerValue};
    use bevy_ecs::observer::On;
    use glam::Vec3;

    #[derive(Resource, Default)]
    struct Fired(u32);

    fn zone_world() -> (World, Schedule) {
        let mut world = World::new();
        world.init_resource::<Fired>();
        world.add_observer(|_trigger: On<TriggerActionEvent>, mut fired: ResMut<Fired>| {
            fired.0 += 1;
        });
        let parent = world
            .spawn((Pose::at(Vec3::new(0.0, 5.0, 0.0)), BoxCollider::cube(0.1)))
            .id();
        let mut zone = CollisionZone::new(parent, 1.0, Vec3::ZERO);
        zone.wire(TriggerAction::new("Case#1", "Case", "collision", TriggerValue::Float(1.0)));
        world.spawn((zone, Pose::at(Vec3::ZERO)));

        let mut schedule = Schedule::default();
        schedule.add_systems(zone_overlap_detector);
        (world, schedule)
    }

    #[test]
    fn test_zone_fires_for_each_newcomer() {
        let (mut world, mut schedule) = zone_world();
        schedule.run(&mut world);
        assert_eq!(world.resource::<Fired>().0, 0);

        world.spawn((Pose::at(Vec3::new(0.2, 0.0, 0.0)), BoxCollider::cube(0.1)));
        schedule.run(&mut world);
        assert_eq!(world.resource::<Fired>().0, 1);

        // staying inside does not fire again
        schedule.run(&mut world);
        assert_eq!(world.resource::<Fired>().0, 1);

        // a second entity entering a non-empty zone does
        world.spawn((Pose::at(Vec3::new(-0.2, 0.0, 0.0)), BoxCollider::cube(0.1)));
        schedule.run(&mut world);
        assert_eq!(world.resource::<Fired>().0, 2);

        let mut zones = world.query::<&CollisionZone>();
        assert_eq!(zones.single(&world).unwrap().overlapping.len(), 2);
    }
}
