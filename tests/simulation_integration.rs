//! Driver-level integration tests: zone lifecycle, docking, injection, the
//! Case and the save cycle, all through `Simulation::tick`.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};

use morphinjection::components::attributes::{Attribute, AttributeBanks};
use morphinjection::components::blend::InjectionBlend;
use morphinjection::components::case::{
    Case, CaseSlot, LID_ELEMENT, LID_OFFSET, lid_hinge, lid_rotation, lid_tip,
};
use morphinjection::components::collisionzone::{CollisionZone, Hidden};
use morphinjection::components::indicator::Indicator;
use morphinjection::components::injector::{DOCKED_LOAD_OFFSET, Injector, LOAD_ZONE_OFFSET};
use morphinjection::components::load::{LoadDelta, LoadResource};
use morphinjection::components::pose::{Grabbed, Pose};
use morphinjection::components::sceneid::{AtomKind, SceneElements, SceneId};
use morphinjection::error::MechanicsError;
use morphinjection::resources::attachments::{AttachmentTracker, DockPoint, DockSlot};
use morphinjection::resources::mechanicsconfig::MechanicsConfig;
use morphinjection::resources::sceneregistry::SceneRegistry;
use morphinjection::scene::{
    spawn_case, spawn_case_with_elements, spawn_injector, spawn_load, spawn_person,
};
use morphinjection::simulation::Simulation;

const DT: f32 = 0.02;

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() < eps
}

fn run(sim: &mut Simulation, frames: u32) {
    for _ in 0..frames {
        sim.tick(DT).unwrap();
    }
}

fn zone_count(sim: &mut Simulation) -> usize {
    let world = sim.world_mut();
    let mut zones = world.query::<&CollisionZone>();
    zones.iter(world).count()
}

fn pose_of(sim: &Simulation, entity: Entity) -> Pose {
    *sim.world().get::<Pose>(entity).unwrap()
}

fn set_pose(sim: &mut Simulation, entity: Entity, pose: Pose) {
    *sim.world_mut().get_mut::<Pose>(entity).unwrap() = pose;
}

fn tracker(sim: &Simulation) -> &AttachmentTracker {
    sim.world().resource::<AttachmentTracker>()
}

fn smile(sim: &Simulation, person: Entity) -> f32 {
    sim.world()
        .get::<AttributeBanks>(person)
        .and_then(|b| b.value_by_name("Smile"))
        .unwrap()
}

struct InjectorScene {
    sim: Simulation,
    person: Entity,
    injector: Entity,
    load: Entity,
}

fn injector_scene() -> InjectorScene {
    let mut sim = Simulation::new(MechanicsConfig::new());
    let world = sim.world_mut();
    let banks = AttributeBanks::new()
        .with(0, Attribute::new("Smile", 0.0))
        .with(2, Attribute::new("Breath", 0.5));
    let person = spawn_person(world, "Person", Pose::default(), banks);
    let injector = spawn_injector(world, "Injector#1", Pose::at(Vec3::new(2.0, 1.0, 0.0)));
    let load = spawn_load(
        world,
        "Load#1",
        Pose::at(Vec3::new(4.0, 1.0, 0.0)),
        LoadResource::new(1.0).with_delta(LoadDelta::increment("Smile", 0.6)),
        [1.0, 0.5, 0.0],
    );
    InjectorScene {
        sim,
        person,
        injector,
        load,
    }
}

fn dock_load(scene: &mut InjectorScene) {
    let injector_pose = pose_of(&scene.sim, scene.injector);
    set_pose(
        &mut scene.sim,
        scene.load,
        Pose::at(injector_pose.transform_point(LOAD_ZONE_OFFSET)),
    );
    run(&mut scene.sim, 1);
}

// =============================================================================
// Zone lifecycle
// =============================================================================

#[test]
fn zones_wait_for_scene_load() {
    let mut scene = injector_scene();
    run(&mut scene.sim, 5);
    assert_eq!(zone_count(&mut scene.sim), 0);

    scene.sim.initialize();
    run(&mut scene.sim, 1);
    assert_eq!(zone_count(&mut scene.sim), 2);

    let registry = scene.sim.world().resource::<SceneRegistry>();
    assert_eq!(
        registry.names_with_prefix("MI_collision_Injector#1"),
        vec!["MI_collision_Injector#1", "MI_collision_Injector#1_load"]
    );
    let injector = scene.sim.world().get::<Injector>(scene.injector).unwrap();
    let run_zone = injector.run_zone.get().unwrap();
    assert!(scene.sim.world().get::<Hidden>(run_zone).is_some());
}

#[test]
fn save_cycle_rebuilds_without_duplicates() {
    let mut scene = injector_scene();
    scene.sim.initialize();
    run(&mut scene.sim, 1);

    for _ in 0..3 {
        let saved = scene.sim.save_scene();
        assert_eq!(zone_count(&mut scene.sim), 0);
        assert!(saved["Load#1"]["Inc#Smile"].is_number());

        run(&mut scene.sim, 1);
        assert_eq!(zone_count(&mut scene.sim), 2);
        let registry = scene.sim.world().resource::<SceneRegistry>();
        assert_eq!(registry.names_with_prefix("MI_").len(), 2);
    }
}

#[test]
fn existing_zone_is_reused() {
    let mut scene = injector_scene();
    let world = scene.sim.world_mut();
    let restored = world
        .spawn((
            SceneId::new("MI_collision_Injector#1", AtomKind::CollisionTrigger),
            Pose::default(),
        ))
        .id();
    world
        .resource_mut::<SceneRegistry>()
        .insert("MI_collision_Injector#1", restored);

    scene.sim.initialize();
    run(&mut scene.sim, 2);

    assert_eq!(zone_count(&mut scene.sim), 2);
    let injector = scene.sim.world().get::<Injector>(scene.injector).unwrap();
    assert_eq!(injector.run_zone.get(), Some(restored));
    let zone = scene.sim.world().get::<CollisionZone>(restored).unwrap();
    assert_eq!(zone.parent, scene.injector);
    assert_eq!(zone.start_actions.len(), 1);
}

#[test]
fn zones_follow_their_parent() {
    let mut scene = injector_scene();
    scene.sim.initialize();
    run(&mut scene.sim, 1);

    let moved = Pose::new(Vec3::new(-1.0, 2.0, 3.0), Quat::from_rotation_y(1.2));
    set_pose(&mut scene.sim, scene.injector, moved);
    run(&mut scene.sim, 1);

    let injector = scene.sim.world().get::<Injector>(scene.injector).unwrap();
    let load_zone = injector.load_zone.get().unwrap();
    let zone_pose = pose_of(&scene.sim, load_zone);
    assert!((zone_pose.position - moved.transform_point(LOAD_ZONE_OFFSET)).length() < 1e-5);
}

#[test]
fn orphan_zones_are_removed() {
    let mut scene = injector_scene();
    scene.sim.initialize();
    run(&mut scene.sim, 1);

    scene.sim.world_mut().despawn(scene.injector);
    run(&mut scene.sim, 1);

    assert_eq!(zone_count(&mut scene.sim), 0);
    let registry = scene.sim.world().resource::<SceneRegistry>();
    assert!(registry.lookup("MI_collision_Injector#1").is_none());
    assert!(registry.lookup("MI_collision_Injector#1_load").is_none());
}

// =============================================================================
// Injector docking and injection
// =============================================================================

#[test]
fn load_docks_and_rides_with_injector() {
    let mut scene = injector_scene();
    scene.sim.initialize();
    run(&mut scene.sim, 1);
    dock_load(&mut scene);

    let point = DockPoint::new(scene.injector, DockSlot::InjectorLoad);
    assert_eq!(tracker(&scene.sim).occupant_at(point), Some(scene.load));
    assert_eq!(tracker(&scene.sim).listener_count(scene.load), 1);

    let moved = Pose::new(Vec3::new(0.0, 3.0, -2.0), Quat::from_rotation_x(0.4));
    set_pose(&mut scene.sim, scene.injector, moved);
    run(&mut scene.sim, 1);

    let load_pose = pose_of(&scene.sim, scene.load);
    assert!((load_pose.position - moved.transform_point(DOCKED_LOAD_OFFSET)).length() < 1e-5);
    assert!(load_pose.rotation.abs_diff_eq(moved.rotation, 1e-5));
}

#[test]
fn grabbing_docked_load_releases_it() {
    let mut scene = injector_scene();
    scene.sim.initialize();
    run(&mut scene.sim, 1);
    dock_load(&mut scene);

    scene.sim.grab_start(scene.load);
    assert!(scene.sim.world().get::<Grabbed>(scene.load).is_some());
    assert!(tracker(&scene.sim).link(scene.load).is_none());
    assert_eq!(tracker(&scene.sim).listener_count(scene.load), 0);

    // a released load stays where the hand left it
    set_pose(&mut scene.sim, scene.load, Pose::at(Vec3::new(9.0, 0.0, 0.0)));
    scene.sim.grab_end(scene.load);
    assert!(scene.sim.world().get::<Grabbed>(scene.load).is_none());
    run(&mut scene.sim, 2);
    assert_eq!(pose_of(&scene.sim, scene.load).position, Vec3::new(9.0, 0.0, 0.0));
}

#[test]
fn injection_blends_load_into_target() {
    let mut scene = injector_scene();
    scene.sim.initialize();
    run(&mut scene.sim, 1);
    dock_load(&mut scene);

    set_pose(&mut scene.sim, scene.injector, Pose::at(Vec3::new(0.0, 1.2, 0.1)));
    run(&mut scene.sim, 1);
    assert!(scene.sim.world().get::<LoadResource>(scene.load).unwrap().is_empty());

    set_pose(&mut scene.sim, scene.injector, Pose::at(Vec3::new(2.0, 1.0, 0.0)));
    run(&mut scene.sim, 10);
    let partial = smile(&scene.sim, scene.person);
    assert!(partial > 0.0 && partial < 0.6);

    run(&mut scene.sim, 60);
    assert!(approx_eq(smile(&scene.sim, scene.person), 0.6, 0.02));
    let blend = scene.sim.world().get::<InjectionBlend>(scene.injector).unwrap();
    assert!(blend.queued.is_empty());

    let indicator = scene.sim.world().get::<Indicator>(scene.load).unwrap();
    assert!(indicator.current[0] < indicator.base[0]);
}

#[test]
fn empty_load_injection_is_noop() {
    let mut scene = injector_scene();
    scene
        .sim
        .world_mut()
        .get_mut::<LoadResource>(scene.load)
        .unwrap()
        .set_empty(true);
    scene.sim.initialize();
    run(&mut scene.sim, 1);
    dock_load(&mut scene);

    set_pose(&mut scene.sim, scene.injector, Pose::at(Vec3::new(0.0, 1.2, 0.1)));
    run(&mut scene.sim, 30);

    assert_eq!(smile(&scene.sim, scene.person), 0.0);
    assert!(scene.sim.world().get::<LoadResource>(scene.load).unwrap().is_empty());
    let blend = scene.sim.world().get::<InjectionBlend>(scene.injector).unwrap();
    assert!(blend.queued.is_empty());
    assert_eq!(blend.total_duration, 0.0);
}

// =============================================================================
// Case
// =============================================================================

fn case_scene() -> (Simulation, Entity, Entity, Entity) {
    let mut config = MechanicsConfig::new();
    config.slot_zone_size = 0.05;
    case_scene_with(config)
}

fn case_scene_with(config: MechanicsConfig) -> (Simulation, Entity, Entity, Entity) {
    let mut sim = Simulation::new(config);
    let world = sim.world_mut();
    let case_pose = Pose::new(Vec3::new(-3.0, 0.5, 0.0), Quat::from_rotation_y(0.5));
    let case = spawn_case(world, "Case#1", case_pose);
    let injector = spawn_injector(world, "Injector#1", Pose::at(Vec3::new(2.0, 1.0, 0.0)));
    let load = spawn_load(
        world,
        "Load#1",
        Pose::at(Vec3::new(4.0, 1.0, 0.0)),
        LoadResource::new(10.0).with_delta(LoadDelta::increment("Smile", 0.2)),
        [1.0, 1.0, 1.0],
    );
    sim.initialize();
    sim.tick(DT).unwrap();
    (sim, case, injector, load)
}

#[test]
fn case_provisions_slots_and_lid() {
    let (mut sim, case, _, _) = case_scene();
    let registry = sim.world().resource::<SceneRegistry>();
    assert_eq!(registry.names_with_prefix("MI_case_collision_Case#1#").len(), 7);
    let handle = registry.lookup("Lid_Case#1").unwrap();

    let state = sim.world().get::<Case>(case).unwrap();
    assert_eq!(state.lid_handle, Some(handle));
    assert!(state.lid.is_some());
    assert_eq!(tracker(&sim).listener_count(handle), 1);
    assert_eq!(zone_count(&mut sim), 9);
}

#[test]
fn injector_and_load_dock_into_slots() {
    let (mut sim, case, injector, load) = case_scene();
    let case_pose = pose_of(&sim, case);

    set_pose(
        &mut sim,
        injector,
        Pose::at(case_pose.transform_point(CaseSlot::Injector.zone_offset())),
    );
    run(&mut sim, 1);
    let slot0 = DockPoint::new(case, DockSlot::Case(CaseSlot::Injector));
    assert_eq!(tracker(&sim).occupant_at(slot0), Some(injector));

    let slot = CaseSlot::Load(2);
    set_pose(&mut sim, load, Pose::at(case_pose.transform_point(slot.zone_offset())));
    run(&mut sim, 1);
    let point = DockPoint::new(case, DockSlot::Case(slot));
    assert_eq!(tracker(&sim).occupant_at(point), Some(load));

    // both ride along when the case moves
    let moved = Pose::new(Vec3::new(1.0, 0.0, 1.0), Quat::from_rotation_y(-0.3));
    set_pose(&mut sim, case, moved);
    run(&mut sim, 1);

    let injector_pose = pose_of(&sim, injector);
    assert!(
        (injector_pose.position - moved.transform_point(CaseSlot::Injector.placement_offset()))
            .length()
            < 1e-5
    );
    assert!(
        injector_pose
            .rotation
            .abs_diff_eq(moved.rotation * CaseSlot::Injector.orientation(), 1e-5)
    );
    let load_pose = pose_of(&sim, load);
    assert!((load_pose.position - moved.transform_point(slot.placement_offset())).length() < 1e-5);
    assert!(
        load_pose
            .rotation
            .abs_diff_eq(moved.rotation * slot.orientation(), 1e-5)
    );
}

fn spare_load(sim: &mut Simulation, n: usize) -> Entity {
    spawn_load(
        sim.world_mut(),
        &format!("Load#{}", n + 10),
        Pose::at(Vec3::new(10.0 + n as f32, 1.0, 0.0)),
        LoadResource::new(5.0).with_delta(LoadDelta::increment("Smile", 0.1)),
        [1.0, 1.0, 1.0],
    )
}

fn drop_in_slot(sim: &mut Simulation, case: Entity, load: Entity, slot: CaseSlot) {
    let case_pose = pose_of(sim, case);
    set_pose(sim, load, Pose::at(case_pose.transform_point(slot.zone_offset())));
}

fn slot_of(sim: &Simulation, entity: Entity) -> Option<DockSlot> {
    tracker(sim).link(entity).map(|link| link.point.slot)
}

#[test]
fn loads_keep_their_slots_with_default_zones() {
    let (mut sim, case, _, _) = case_scene_with(MechanicsConfig::new());
    let stored: Vec<(Entity, CaseSlot)> = (0..6u8)
        .map(|n| (spare_load(&mut sim, n as usize), CaseSlot::Load(n)))
        .collect();

    for (i, (load, slot)) in stored.iter().enumerate() {
        drop_in_slot(&mut sim, case, *load, *slot);
        run(&mut sim, 3);
        // earlier loads overlap the new zone but stay where they are
        for (earlier, earlier_slot) in &stored[..=i] {
            assert_eq!(slot_of(&sim, *earlier), Some(DockSlot::Case(*earlier_slot)));
        }
    }

    run(&mut sim, 10);
    for (load, slot) in &stored {
        let point = DockPoint::new(case, DockSlot::Case(*slot));
        assert_eq!(tracker(&sim).occupant_at(point), Some(*load));
    }
}

#[test]
fn single_load_docks_in_the_slot_it_was_dropped_in() {
    let (mut sim, case, _, load) = case_scene_with(MechanicsConfig::new());
    drop_in_slot(&mut sim, case, load, CaseSlot::Load(0));
    for _ in 0..10 {
        run(&mut sim, 1);
        assert_eq!(slot_of(&sim, load), Some(DockSlot::Case(CaseSlot::Load(0))));
    }
}

#[test]
fn loads_dropped_in_the_same_frame_all_dock() {
    let pairs = [
        (CaseSlot::Load(0), CaseSlot::Load(3)),
        // neighbours: each load also overlaps the other one's zone
        (CaseSlot::Load(0), CaseSlot::Load(1)),
    ];
    for (first_slot, second_slot) in pairs {
        let (mut sim, case, _, _) = case_scene_with(MechanicsConfig::new());
        let first = spare_load(&mut sim, 0);
        let second = spare_load(&mut sim, 1);
        drop_in_slot(&mut sim, case, first, first_slot);
        drop_in_slot(&mut sim, case, second, second_slot);
        run(&mut sim, 5);
        assert_eq!(slot_of(&sim, first), Some(DockSlot::Case(first_slot)));
        assert_eq!(slot_of(&sim, second), Some(DockSlot::Case(second_slot)));
    }
}

#[test]
fn lid_follows_handle_release() {
    let (mut sim, case, _, _) = case_scene();
    let case_pose = pose_of(&sim, case);
    let handle = sim.world().get::<Case>(case).unwrap().lid_handle.unwrap();

    sim.grab_start(handle);
    set_pose(
        &mut sim,
        handle,
        Pose::at(case_pose.transform_point(LID_OFFSET + Vec3::new(0.0, 0.3, 0.0))),
    );
    run(&mut sim, 2);
    // still held: the handle is not snapped back
    assert!(sim.world().get::<Grabbed>(handle).is_some());
    assert!(approx_eq(sim.world().get::<Case>(case).unwrap().lid_angle, 0.0, 1e-4));

    sim.grab_end(handle);
    let state = sim.world().get::<Case>(case).unwrap();
    assert!(approx_eq(state.lid_angle, 90.0, 1e-2));
    let lid = state.lid.unwrap();

    run(&mut sim, 1);
    let handle_pose = pose_of(&sim, handle);
    assert!((handle_pose.position - lid_tip(&case_pose, 90.0)).length() < 1e-4);
    let lid_pose = pose_of(&sim, lid);
    assert!((lid_pose.position - lid_hinge(&case_pose)).length() < 1e-5);
    assert!(lid_pose.rotation.abs_diff_eq(lid_rotation(&case_pose, 90.0), 1e-5));
}

#[test]
fn lid_listener_survives_save_cycles() {
    let (mut sim, case, _, _) = case_scene();
    let handle = sim.world().get::<Case>(case).unwrap().lid_handle.unwrap();

    for _ in 0..3 {
        sim.save_scene();
        run(&mut sim, 1);
    }

    let registry = sim.world().resource::<SceneRegistry>();
    assert_eq!(registry.lookup("Lid_Case#1"), Some(handle));
    assert_eq!(tracker(&sim).listener_count(handle), 1);
    assert_eq!(zone_count(&mut sim), 9);
}

#[test]
fn case_without_lid_is_a_structural_error() {
    let mut sim = Simulation::new(MechanicsConfig::new());
    spawn_case_with_elements(
        sim.world_mut(),
        "Case#2",
        Pose::default(),
        SceneElements::default(),
    );

    // nothing is checked while the scene is loading
    assert!(sim.tick(DT).is_ok());

    sim.initialize();
    let err = sim.tick(DT).unwrap_err();
    assert_eq!(
        err,
        MechanicsError::MissingSceneElement {
            uid: "Case#2".to_string(),
            element: LID_ELEMENT.to_string(),
        }
    );
    assert!(sim.tick(DT).is_ok());
}

#[test]
fn shutdown_clears_links_and_listeners() {
    let (mut sim, case, injector, _) = case_scene();
    let case_pose = pose_of(&sim, case);
    set_pose(
        &mut sim,
        injector,
        Pose::at(case_pose.transform_point(CaseSlot::Injector.zone_offset())),
    );
    run(&mut sim, 1);
    let handle = sim.world().get::<Case>(case).unwrap().lid_handle.unwrap();

    sim.shutdown();
    assert!(tracker(&sim).is_empty());
    assert_eq!(tracker(&sim).listener_count(handle), 0);
    assert_eq!(tracker(&sim).listener_count(injector), 0);
    run(&mut sim, 2);
    assert_eq!(zone_count(&mut sim), 0);
}
