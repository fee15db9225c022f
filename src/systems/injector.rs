//! Injector systems.
//!
//! An Injector reacts to two signals written by its zones:
//!
//! - `attach`: something entered the load zone. The first overlapping Load
//!   that is docked nowhere else is docked on the Injector, replacing any
//!   Load docked before.
//! - `run`: something entered the run zone. If the first overlapping target
//!   with attribute banks is found and the docked Load still has content,
//!   the Load is consumed and its deltas are queued on the Injector's blend.
//!
//! Both flags are reset as soon as they are read.

use bevy_ecs::prelude::*;
use glam::Quat;
use log::{debug, info};

use crate::components::attributes::AttributeBanks;
use crate::components::blend::InjectionBlend;
use crate::components::collisionzone::CollisionZone;
use crate::components::injector::{ATTACH_FIELD, DOCKED_LOAD_OFFSET, Injector, RUN_FIELD};
use crate::components::load::LoadResource;
use crate::components::signals::Signals;
use crate::components::triggeraction::TriggerAction;
use crate::events::loadused::LoadUsedEvent;
use crate::events::trigger::TriggerActionEvent;
use crate::resources::attachments::{AttachmentTracker, DockPoint, DockSlot};
use crate::resources::worldtime::WorldTime;
use crate::systems::collisionzone::poll_overlaps;

/// Consume `load` against `target` and queue the result on `blend`.
///
/// Returns `None` without touching anything when the Load is empty.
/// Otherwise the deltas are sampled from the target's current values, the
/// Load is marked used and its side-effect actions are returned.
pub fn consume_load(
    load: &mut LoadResource,
    target: Entity,
    banks: &AttributeBanks,
    blend: &mut InjectionBlend,
    now: f32,
) -> Option<Vec<TriggerAction>> {
    if load.is_empty() {
        return None;
    }
    let amounts = load.resolve(target, banks);
    let actions = load.use_load();
    blend.stack(now, load.duration(), &amounts);
    Some(actions)
}

pub fn injector_attach_system(
    mut tracker: ResMut<AttachmentTracker>,
    mut injectors: Query<(Entity, &Injector, &mut Signals)>,
    zones: Query<&CollisionZone>,
    loads: Query<(), With<LoadResource>>,
) {
    for (entity, injector, mut signals) in injectors.iter_mut() {
        if !signals.take_flag(ATTACH_FIELD) {
            continue;
        }
        let Some(load) = poll_overlaps(&zones, injector.load_zone)
            .into_iter()
            .find(|candidate| loads.contains(*candidate) && tracker.link(*candidate).is_none())
        else {
            debug!("injector {:?}: no load in reach", entity);
            continue;
        };
        let point = DockPoint::new(entity, DockSlot::InjectorLoad);
        tracker.attach(load, point, DOCKED_LOAD_OFFSET, Quat::IDENTITY);
        info!("load {:?} docked on injector {:?}", load, entity);
    }
}

pub fn injector_run_system(
    mut commands: Commands,
    time: Res<WorldTime>,
    tracker: Res<AttachmentTracker>,
    mut injectors: Query<(Entity, &Injector, &mut Signals, &mut InjectionBlend)>,
    zones: Query<&CollisionZone>,
    mut loads: Query<&mut LoadResource>,
    targets: Query<&AttributeBanks>,
) {
    for (entity, injector, mut signals, mut blend) in injectors.iter_mut() {
        if !signals.take_flag(RUN_FIELD) {
            continue;
        }
        let Some(target) = poll_overlaps(&zones, injector.run_zone)
            .into_iter()
            .find(|candidate| targets.contains(*candidate))
        else {
            continue;
        };
        let Some(load_entity) = tracker.occupant_at(DockPoint::new(entity, DockSlot::InjectorLoad))
        else {
            debug!("injector {:?}: nothing docked", entity);
            continue;
        };
        let (Ok(mut load), Ok(banks)) = (loads.get_mut(load_entity), targets.get(target)) else {
            continue;
        };

        let Some(actions) = consume_load(&mut load, target, banks, &mut blend, time.fixed_elapsed)
        else {
            debug!("injector {:?}: load {:?} is empty", entity, load_entity);
            continue;
        };
        for action in actions {
            commands.trigger(TriggerActionEvent::from(action));
        }
        commands.trigger(LoadUsedEvent {
            load: load_entity,
            injector: entity,
            target,
            emptied: load.is_empty(),
        });
    }
}
