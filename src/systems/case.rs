//! Case systems.
//!
//! - [`case_collision_system`] docks whatever entered a slot zone into the
//!   nearest free slot
//! - [`lid_follow_system`] poses the lid element and parks the lid handle
//!   on the lid tip
//! - [`initialize_pending_cases`] resolves the lid element once the scene is
//!   loaded; a Case without one is a structural error

use bevy_ecs::prelude::*;
use log::{debug, info};
use smallvec::{SmallVec, smallvec};

use crate::components::case::{
    COLLISION_FIELD, Case, CaseSlot, IDLE_COLLISION, LID_ELEMENT, PendingLid, compute_lid_angle,
    lid_hinge, lid_rotation, lid_tip,
};
use crate::components::collisionzone::CollisionZone;
use crate::components::injector::Injector;
use crate::components::load::LoadResource;
use crate::components::pose::{Grabbed, Pose};
use crate::components::sceneid::{SceneElements, SceneId};
use crate::components::signals::Signals;
use crate::error::MechanicsError;
use crate::resources::attachments::{AttachmentTracker, DockPoint, DockSlot};
use crate::resources::sceneregistry::SceneRegistry;
use crate::systems::collisionzone::poll_overlaps;

/// Drain the `collision` writes of every Case and dock what entered the
/// signalled slots: an Injector in slot 0, Loads in slots 1..=6.
///
/// Only entities docked nowhere are candidates, so a stored occupant that
/// also overlaps a neighbouring zone stays in its slot. A candidate reached
/// by several signalled zones takes the nearest free slot, or the nearest
/// slot when all of them are taken.
pub fn case_collision_system(
    mut tracker: ResMut<AttachmentTracker>,
    mut cases: Query<(Entity, &Case, &Pose, &mut Signals)>,
    zones: Query<&CollisionZone>,
    poses: Query<&Pose>,
    injectors: Query<(), With<Injector>>,
    loads: Query<(), With<LoadResource>>,
) {
    for (entity, case, case_pose, mut signals) in cases.iter_mut() {
        let received = signals.drain_scalar(COLLISION_FIELD);
        if received.is_empty() {
            continue;
        }
        signals.set_scalar(COLLISION_FIELD, IDLE_COLLISION);

        let mut signalled: SmallVec<[CaseSlot; 4]> = SmallVec::new();
        for value in received {
            match CaseSlot::from_index(value as usize).filter(|_| value >= 0.0) {
                Some(slot) if !signalled.contains(&slot) => signalled.push(slot),
                Some(_) => {}
                None => debug!("case {:?}: no slot {}", entity, value),
            }
        }

        let mut candidates: Vec<(Entity, SmallVec<[CaseSlot; 4]>)> = Vec::new();
        for slot in signalled {
            for candidate in poll_overlaps(&zones, case.zone(slot)) {
                let fits = match slot {
                    CaseSlot::Injector => injectors.contains(candidate),
                    CaseSlot::Load(_) => loads.contains(candidate),
                };
                if !fits || tracker.link(candidate).is_some() {
                    continue;
                }
                match candidates.iter_mut().find(|(c, _)| *c == candidate) {
                    Some((_, reach)) => reach.push(slot),
                    None => candidates.push((candidate, smallvec![slot])),
                }
            }
        }

        for (occupant, reach) in candidates {
            let Ok(position) = poses.get(occupant).map(|p| p.position) else {
                continue;
            };
            let free = |slot: &CaseSlot| {
                tracker
                    .occupant_at(DockPoint::new(entity, DockSlot::Case(*slot)))
                    .is_none()
            };
            let distance = |slot: &CaseSlot| {
                case_pose
                    .transform_point(slot.zone_offset())
                    .distance_squared(position)
            };
            let Some(slot) = reach.iter().copied().min_by(|a, b| {
                free(b)
                    .cmp(&free(a))
                    .then(distance(a).total_cmp(&distance(b)))
            }) else {
                continue;
            };
            let point = DockPoint::new(entity, DockSlot::Case(slot));
            tracker.attach(occupant, point, slot.placement_offset(), slot.orientation());
            info!("{:?} stored in slot {} of case {:?}", occupant, slot.index(), entity);
        }
    }
}

/// Pose the lid from the current angle and keep the handle on its tip.
pub fn lid_follow_system(
    cases: Query<(&Pose, &Case)>,
    mut poses: Query<&mut Pose, Without<Case>>,
    grabbed: Query<(), With<Grabbed>>,
) {
    for (case_pose, case) in cases.iter() {
        if let Some(lid) = case.lid {
            if let Ok(mut pose) = poses.get_mut(lid) {
                pose.position = lid_hinge(case_pose);
                pose.rotation = lid_rotation(case_pose, case.lid_angle);
            }
        }
        if let Some(handle) = case.lid_handle {
            if grabbed.contains(handle) {
                continue;
            }
            if let Ok(mut pose) = poses.get_mut(handle) {
                pose.position = lid_tip(case_pose, case.lid_angle);
            }
        }
    }
}

/// Resolve the lid element of Cases still marked [`PendingLid`].
///
/// Does nothing while the scene is loading. A Case whose elements lack the
/// lid loses its pending marker and the first such failure is returned.
pub fn initialize_pending_cases(world: &mut World) -> Result<(), MechanicsError> {
    if world.resource::<SceneRegistry>().loading {
        return Ok(());
    }

    let mut pending = world.query_filtered::<
        (Entity, &SceneId, Option<&SceneElements>),
        (With<Case>, With<PendingLid>),
    >();
    let found: Vec<(Entity, String, Option<Entity>)> = pending
        .iter(world)
        .map(|(entity, id, elements)| {
            (
                entity,
                id.uid.clone(),
                elements.and_then(|e| e.find(LID_ELEMENT)),
            )
        })
        .collect();

    let mut first_error = None;
    for (entity, uid, lid) in found {
        world.entity_mut(entity).remove::<PendingLid>();
        let Some(lid) = lid else {
            first_error.get_or_insert(MechanicsError::MissingSceneElement {
                uid,
                element: LID_ELEMENT.to_string(),
            });
            continue;
        };

        let case_pose = world.get::<Pose>(entity).copied().unwrap_or_default();
        let handle_position = world
            .get::<Case>(entity)
            .and_then(|case| case.lid_handle)
            .and_then(|handle| world.get::<Pose>(handle))
            .map(|pose| pose.position);
        if let Some(mut case) = world.get_mut::<Case>(entity) {
            case.lid = Some(lid);
            if let Some(position) = handle_position {
                case.lid_angle = compute_lid_angle(&case_pose, position, case.lid_angle);
            }
        }
        info!("case '{}' lid ready", uid);
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
