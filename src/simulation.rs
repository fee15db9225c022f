//! Host-agnostic driver.
//!
//! [`Simulation`] owns the ECS world and two schedules: a fixed-rate one for
//! spatial follow and a per-frame one for blending, zone bookkeeping and
//! docking. The host calls [`Simulation::initialize`] once the scene has
//! finished loading, then [`Simulation::tick`] every frame.
//!
//! # Tick
//!
//! 1. Accumulate `dt`; run the fixed schedule once per whole fixed step,
//!    advancing the fixed clock before each run.
//! 2. Advance the frame clock by `dt` and run the frame schedule.
//! 3. Resolve the lid of pending Cases (structural errors surface here).

use bevy_ecs::prelude::*;
use log::info;
use serde_json::{Map, Value};

use crate::components::case::Case;
use crate::components::collisionzone::PendingZones;
use crate::components::load::LoadResource;
use crate::components::sceneid::SceneId;
use crate::error::MechanicsError;
use crate::events::grab::{GrabEvent, observe_grab};
use crate::events::loadused::observe_load_used;
use crate::events::scenesave::{
    BeforeSceneSaveEvent, SceneSavedEvent, observe_before_scene_save, observe_scene_saved,
};
use crate::events::trigger::observe_trigger_action;
use crate::resources::attachments::AttachmentTracker;
use crate::resources::mechanicsconfig::MechanicsConfig;
use crate::resources::sceneregistry::SceneRegistry;
use crate::resources::worldtime::WorldTime;
use crate::systems::attachment::{docked_follow_system, prune_attachments};
use crate::systems::blend::injection_blend_system;
use crate::systems::case::{case_collision_system, initialize_pending_cases, lid_follow_system};
use crate::systems::collisionzone::{
    cleanup_orphan_zones, provision_case_zones, provision_injector_zones, zone_follow_system,
    zone_overlap_detector,
};
use crate::systems::indicator::load_indicator_system;
use crate::systems::injector::{injector_attach_system, injector_run_system};
use crate::systems::time::{update_fixed_time, update_world_time};

pub struct Simulation {
    world: World,
    fixed: Schedule,
    frame: Schedule,
    accumulator: f32,
}

impl Simulation {
    pub fn new(config: MechanicsConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default().with_time_scale(1.0));
        world.insert_resource(SceneRegistry::new());
        world.insert_resource(AttachmentTracker::new());
        world.insert_resource(config);

        world.spawn(Observer::new(observe_trigger_action));
        world.spawn(Observer::new(observe_grab));
        world.spawn(Observer::new(observe_load_used));
        world.spawn(Observer::new(observe_before_scene_save));
        world.spawn(Observer::new(observe_scene_saved));
        world.flush();

        let mut fixed = Schedule::default();
        fixed.add_systems((docked_follow_system, zone_follow_system, lid_follow_system).chain());

        let mut frame = Schedule::default();
        frame.add_systems(
            (
                injection_blend_system,
                prune_attachments,
                cleanup_orphan_zones,
                provision_injector_zones,
                provision_case_zones,
                zone_overlap_detector,
                injector_attach_system,
                injector_run_system,
                case_collision_system,
                load_indicator_system,
            )
                .chain(),
        );

        Self {
            world,
            fixed,
            frame,
            accumulator: 0.0,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Mark the scene as loaded. Zone provisioning and lid lookup start on
    /// the next tick.
    pub fn initialize(&mut self) {
        self.world.resource_mut::<SceneRegistry>().loading = false;
        info!("Scene loaded");
    }

    /// Advance the simulation by one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Result<(), MechanicsError> {
        let step = self.world.resource::<MechanicsConfig>().fixed_timestep;
        self.accumulator += dt;
        while self.accumulator >= step {
            self.accumulator -= step;
            self.step_fixed(step);
        }

        update_world_time(&mut self.world, dt);
        self.frame.run(&mut self.world);
        self.world.clear_trackers();

        initialize_pending_cases(&mut self.world)
    }

    fn step_fixed(&mut self, step: f32) {
        update_fixed_time(&mut self.world, step);
        self.fixed.run(&mut self.world);
    }

    pub fn grab_start(&mut self, entity: Entity) {
        self.world.trigger(GrabEvent::start(entity));
        self.world.flush();
    }

    pub fn grab_end(&mut self, entity: Entity) {
        self.world.trigger(GrabEvent::end(entity));
        self.world.flush();
    }

    /// Save cycle: tear every zone down, snapshot the persisted parameters
    /// of each Load keyed by uid, then request the zones again.
    pub fn save_scene(&mut self) -> Value {
        self.world.trigger(BeforeSceneSaveEvent);
        self.world.flush();

        let mut loads = self.world.query::<(&SceneId, &LoadResource)>();
        let snapshot: Map<String, Value> = loads
            .iter(&self.world)
            .map(|(id, load)| (id.uid.clone(), load.to_json()))
            .collect();

        self.world.trigger(SceneSavedEvent);
        self.world.flush();
        info!("Saved {} loads", snapshot.len());
        Value::Object(snapshot)
    }

    /// Tear down every zone, link and listener. Owners are not rebuilt.
    pub fn shutdown(&mut self) {
        self.world.trigger(BeforeSceneSaveEvent);
        self.world.flush();

        let mut pending = self.world.query_filtered::<Entity, With<PendingZones>>();
        let owners: Vec<Entity> = pending.iter(&self.world).collect();
        for owner in owners {
            self.world.entity_mut(owner).remove::<PendingZones>();
        }

        let mut cases = self.world.query::<&mut Case>();
        for mut case in cases.iter_mut(&mut self.world) {
            case.lid_listener = None;
        }
        self.world.resource_mut::<AttachmentTracker>().clear();
        info!("Simulation shut down");
    }
}
