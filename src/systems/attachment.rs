//! Docked occupant systems.
//!
//! Every link held by the
//! [`AttachmentTracker`](crate::resources::attachments::AttachmentTracker)
//! teleports its occupant to the carrier's docking point once per fixed
//! step. Links are processed carriers-first, so a Load docked on an Injector
//! that is itself stored in a Case lands on the Injector's updated pose.
//!
//! # Related
//!
//! - [`crate::events::grab`] – grabbing an occupant releases it

use bevy_ecs::prelude::*;
use log::debug;
use rustc_hash::FxHashMap;

use crate::components::pose::{Grabbed, Pose};
use crate::resources::attachments::{AttachmentLink, AttachmentTracker};

/// Links ordered so that a carrier's own link comes before the links of
/// what it carries.
pub fn links_by_depth(tracker: &AttachmentTracker) -> Vec<AttachmentLink> {
    let carrier_of: FxHashMap<Entity, Entity> = tracker
        .links()
        .map(|link| (link.occupant, link.point.carrier))
        .collect();
    let depth = |mut entity: Entity| {
        let mut depth = 0usize;
        while let Some(carrier) = carrier_of.get(&entity) {
            depth += 1;
            entity = *carrier;
            if depth > carrier_of.len() {
                break;
            }
        }
        depth
    };
    let mut links: Vec<AttachmentLink> = tracker.links().copied().collect();
    links.sort_by_key(|link| (depth(link.occupant), link.occupant));
    links
}

/// Teleport each docked occupant to its docking point.
///
/// Position is `carrierPosition + carrierRotation * offset`, rotation is
/// `carrierRotation * orientation`. Grabbed occupants are left alone.
pub fn docked_follow_system(
    tracker: Res<AttachmentTracker>,
    mut poses: Query<&mut Pose>,
    grabbed: Query<(), With<Grabbed>>,
) {
    for link in links_by_depth(&tracker) {
        if grabbed.contains(link.occupant) {
            continue;
        }
        let Ok(carrier) = poses.get(link.point.carrier).map(|p| *p) else {
            continue;
        };
        if let Ok(mut pose) = poses.get_mut(link.occupant) {
            pose.position = carrier.transform_point(link.offset);
            pose.rotation = carrier.rotation * link.orientation;
        }
    }
}

/// Drop links whose occupant or carrier has been despawned.
pub fn prune_attachments(mut tracker: ResMut<AttachmentTracker>, existing: Query<()>) {
    let dead: Vec<Entity> = tracker
        .links()
        .filter(|link| existing.get(link.occupant).is_err() || existing.get(link.point.carrier).is_err())
        .map(|link| link.occupant)
        .collect();
    for occupant in dead {
        debug!("dropping link of {:?}", occupant);
        tracker.detach(occupant);
    }
}
