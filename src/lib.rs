//! Morph injection mechanics.
//!
//! An Injector docks a Load cartridge, and when it touches a target it
//! consumes the Load and blends the Load's attribute deltas onto the target
//! over the Load's duration. A Case stores one Injector and six Loads in
//! fixed slots and has a hinged lid driven by a grabbable handle.
//!
//! Everything runs on a `bevy_ecs` world driven by
//! [`simulation::Simulation`].

pub mod components;
pub mod error;
pub mod events;
pub mod resources;
pub mod scene;
pub mod simulation;
pub mod systems;
