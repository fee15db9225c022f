//! Scene save notifications.
//!
//! The host does not keep transient zone geometry across a save, so every
//! zone is torn down on [`BeforeSceneSaveEvent`] and requested again on
//! [`SceneSavedEvent`]. Rebuilding goes through lookup-before-create and
//! never duplicates a zone.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::info;

use crate::components::case::Case;
use crate::components::collisionzone::{CollisionZone, PendingZones};
use crate::components::injector::Injector;
use crate::resources::sceneregistry::SceneRegistry;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct BeforeSceneSaveEvent;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SceneSavedEvent;

/// Despawn every zone and clear every handle pointing at one.
pub fn observe_before_scene_save(
    _trigger: On<BeforeSceneSaveEvent>,
    mut commands: Commands,
    mut registry: ResMut<SceneRegistry>,
    zones: Query<Entity, With<CollisionZone>>,
    mut injectors: Query<&mut Injector>,
    mut cases: Query<&mut Case>,
) {
    let mut count = 0;
    for zone in zones.iter() {
        registry.forget(zone);
        commands.entity(zone).despawn();
        count += 1;
    }
    for mut injector in injectors.iter_mut() {
        injector.run_zone.clear();
        injector.load_zone.clear();
    }
    for mut case in cases.iter_mut() {
        for handle in case.zones.iter_mut() {
            handle.clear();
        }
    }
    info!("Tore down {} collision zones before save", count);
}

/// Ask every zone owner to provision its zones again.
pub fn observe_scene_saved(
    _trigger: On<SceneSavedEvent>,
    mut commands: Commands,
    owners: Query<Entity, Or<(With<Injector>, With<Case>)>>,
) {
    for owner in owners.iter() {
        commands.entity(owner).insert(PendingZones);
    }
}
