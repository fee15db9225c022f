//! Headless morph injection demo.
//!
//! Builds a small scene (a Person, an Injector, a Load and a Case), then
//! scripts one full round: the Load is docked on the Injector, injected into
//! the Person, the Injector is stored in the Case, the lid is opened and the
//! scene goes through a save cycle. Attribute values are logged while the
//! blend runs.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --frames 900 --dt 0.016
//! ```

use bevy_ecs::entity::Entity;
use clap::Parser;
use glam::{Quat, Vec3};
use log::{error, info, warn};
use std::path::PathBuf;

use morphinjection::components::attributes::{Attribute, AttributeBanks};
use morphinjection::components::case::{Case, CaseSlot, LID_OFFSET};
use morphinjection::components::injector::LOAD_ZONE_OFFSET;
use morphinjection::components::load::{LoadDelta, LoadResource};
use morphinjection::components::pose::Pose;
use morphinjection::error::MechanicsError;
use morphinjection::resources::mechanicsconfig::MechanicsConfig;
use morphinjection::scene::{spawn_case, spawn_injector, spawn_load, spawn_person};
use morphinjection::simulation::Simulation;

/// Morph injection headless demo
#[derive(Parser)]
#[command(version, about = "Runs a scripted injection scene and logs the blend.")]
struct Cli {
    /// INI file with mechanics tunables.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Frames to run while the blend plays.
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Frame delta in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
}

const WATCHED: [&str; 3] = ["Smile", "Brow Up", "Breath"];

fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MechanicsConfig::with_path(path),
        None => MechanicsConfig::new(),
    };
    let config_result = if cli.config.is_some() {
        config.load_from_file()
    } else {
        Ok(())
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.clone()),
    )
    .init();
    if let Err(e) = config_result {
        warn!("{}; using defaults", e);
        config = MechanicsConfig::new();
    }

    if let Err(e) = run(config, cli.frames, cli.dt) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: MechanicsConfig, frames: u32, dt: f32) -> Result<(), MechanicsError> {
    let mut sim = Simulation::new(config);
    let world = sim.world_mut();

    let banks = AttributeBanks::new()
        .with(0, Attribute::new("Smile", 0.0))
        .with(0, Attribute::new("Brow Up", 0.2))
        .with(1, Attribute::new("Belly", 0.0).hidden())
        .with(2, Attribute::new("Breath", 0.5));
    let person = spawn_person(world, "Person", Pose::default(), banks);
    let injector = spawn_injector(world, "Injector#1", Pose::at(Vec3::new(2.0, 1.0, 0.0)));
    let load = spawn_load(
        world,
        "Load#1",
        Pose::at(Vec3::new(4.0, 1.0, 0.0)),
        LoadResource::new(5.0)
            .with_delta(LoadDelta::increment("Smile", 0.6))
            .with_delta(LoadDelta::set_target("Breath", 1.0))
            .with_delta(LoadDelta::increment("Brow Up", -0.2)),
        [0.2, 0.8, 0.3],
    );
    let case_pose = Pose::new(Vec3::new(-3.0, 0.5, 0.0), Quat::from_rotation_y(0.5));
    let case = spawn_case(world, "Case#1", case_pose);

    sim.initialize();
    advance(&mut sim, 3, dt)?;

    // Bring the Load to the Injector's load socket.
    sim.grab_start(load);
    let injector_pose = pose_of(&sim, injector);
    set_pose(&mut sim, load, Pose::at(injector_pose.transform_point(LOAD_ZONE_OFFSET)));
    sim.grab_end(load);
    advance(&mut sim, 2, dt)?;

    // Touch the Person with the Injector tip.
    sim.grab_start(injector);
    set_pose(&mut sim, injector, Pose::at(Vec3::new(0.0, 1.2, 0.1)));
    advance(&mut sim, 2, dt)?;
    set_pose(&mut sim, injector, Pose::at(Vec3::new(2.0, 1.0, 0.0)));
    sim.grab_end(injector);

    for frame in 0..frames {
        sim.tick(dt)?;
        if frame % 60 == 0 {
            log_attributes(&sim, person);
        }
    }
    log_attributes(&sim, person);

    // Store the Injector in the Case.
    sim.grab_start(injector);
    let slot_position = case_pose.transform_point(CaseSlot::Injector.zone_offset());
    set_pose(&mut sim, injector, Pose::at(slot_position));
    sim.grab_end(injector);
    advance(&mut sim, 3, dt)?;
    info!("injector now at {:?}", pose_of(&sim, injector).position);

    // Lift the lid handle straight up above the hinge.
    if let Some(handle) = sim.world().get::<Case>(case).and_then(|c| c.lid_handle) {
        sim.grab_start(handle);
        let above_hinge = case_pose.transform_point(LID_OFFSET + Vec3::new(0.0, 0.4, 0.0));
        set_pose(&mut sim, handle, Pose::at(above_hinge));
        sim.grab_end(handle);
        advance(&mut sim, 2, dt)?;
        if let Some(state) = sim.world().get::<Case>(case) {
            info!("lid opened to {:.1} degrees", state.lid_angle);
        }
    }

    let saved = sim.save_scene();
    info!("saved loads: {}", saved);
    advance(&mut sim, 2, dt)?;

    sim.shutdown();
    Ok(())
}

fn advance(sim: &mut Simulation, frames: u32, dt: f32) -> Result<(), MechanicsError> {
    for _ in 0..frames {
        sim.tick(dt)?;
    }
    Ok(())
}

fn pose_of(sim: &Simulation, entity: Entity) -> Pose {
    sim.world().get::<Pose>(entity).copied().unwrap_or_default()
}

fn set_pose(sim: &mut Simulation, entity: Entity, pose: Pose) {
    if let Some(mut current) = sim.world_mut().get_mut::<Pose>(entity) {
        *current = pose;
    }
}

fn log_attributes(sim: &Simulation, person: Entity) {
    let Some(banks) = sim.world().get::<AttributeBanks>(person) else {
        return;
    };
    let values: Vec<String> = WATCHED
        .iter()
        .filter_map(|name| banks.value_by_name(name).map(|v| format!("{}={:.3}", name, v)))
        .collect();
    info!("{}", values.join(" "));
}
