//! ECS components for scene atoms.
//!
//! Submodules overview:
//! - [`attributes`] – the three attribute banks of a target
//! - [`blend`] – pending deltas and countdown of an Injector's blend
//! - [`boxcollider`] – collision geometry used by overlap polling
//! - [`case`] – Case slots, lid geometry and lid angle derivation
//! - [`collisionzone`] – proxy volumes, their names and handles
//! - [`indicator`] – charge color of a Load
//! - [`injector`] – Injector zone handles and constants
//! - [`load`] – Load content, persistence and consumption
//! - [`pose`] – world position and rotation
//! - [`sceneid`] – unique scene id, atom kind and asset elements
//! - [`signals`] – externally addressable fields written by trigger actions
//! - [`triggeraction`] – outbound actions and their JSON shape

pub mod attributes;
pub mod blend;
pub mod boxcollider;
pub mod case;
pub mod collisionzone;
pub mod indicator;
pub mod injector;
pub mod load;
pub mod pose;
pub mod sceneid;
pub mod signals;
pub mod triggeraction;
