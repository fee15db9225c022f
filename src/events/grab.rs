//! Manual grab signals.
//!
//! The host raises [`GrabEvent`] when the user picks an entity up (`Start`)
//! or lets go of it (`End`). The observer keeps the [`Grabbed`] marker in
//! sync and fires whatever listeners the
//! [`AttachmentTracker`](crate::resources::attachments::AttachmentTracker)
//! holds for that entity and phase.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

use crate::components::case::{Case, compute_lid_angle};
use crate::components::pose::{Grabbed, Pose};
use crate::resources::attachments::{AttachmentTracker, GrabAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrabPhase {
    Start,
    End,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct GrabEvent {
    pub entity: Entity,
    pub phase: GrabPhase,
}

impl GrabEvent {
    pub fn start(entity: Entity) -> Self {
        Self {
            entity,
            phase: GrabPhase::Start,
        }
    }

    pub fn end(entity: Entity) -> Self {
        Self {
            entity,
            phase: GrabPhase::End,
        }
    }
}

/// Apply a grab signal.
///
/// - `Start` marks the entity [`Grabbed`] so follow systems leave it alone; a
///   docked occupant is released by its `Undock` listener.
/// - `End` clears the marker; a lid handle's `LidRelease` listener
///   recomputes the lid angle from where the handle was dropped.
pub fn observe_grab(
    trigger: On<GrabEvent>,
    mut commands: Commands,
    mut tracker: ResMut<AttachmentTracker>,
    poses: Query<&Pose>,
    mut cases: Query<&mut Case>,
) {
    let GrabEvent { entity, phase } = *trigger.event();

    if let Ok(mut entity_commands) = commands.get_entity(entity) {
        match phase {
            GrabPhase::Start => {
                entity_commands.try_insert(Grabbed);
            }
            GrabPhase::End => {
                entity_commands.try_remove::<Grabbed>();
            }
        }
    }

    for action in tracker.handle_grab(entity, phase) {
        match action {
            GrabAction::Undock => {}
            GrabAction::LidRelease { case } => {
                let (Ok(handle_pose), Ok(case_pose)) = (poses.get(entity), poses.get(case)) else {
                    debug!("lid release for {:?}: handle or case has no pose", case);
                    continue;
                };
                let Ok(mut case_state) = cases.get_mut(case) else {
                    continue;
                };
                let angle =
                    compute_lid_angle(case_pose, handle_pose.position, case_state.lid_angle);
                debug!("lid of {:?} at {:.1} degrees", case, angle);
                case_state.lid_angle = angle;
            }
        }
    }
}
