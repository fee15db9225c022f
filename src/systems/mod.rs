//! Systems that drive the mechanics.
//!
//! Frame schedule, in order:
//! 1. [`blend::injection_blend_system`]
//! 2. [`attachment::prune_attachments`] and [`collisionzone::cleanup_orphan_zones`]
//! 3. [`collisionzone::provision_injector_zones`] and [`collisionzone::provision_case_zones`]
//! 4. [`collisionzone::zone_overlap_detector`]
//! 5. [`injector::injector_attach_system`], then [`injector::injector_run_system`]
//! 6. [`case::case_collision_system`]
//! 7. [`indicator::load_indicator_system`]
//!
//! Fixed schedule, in order:
//! 1. [`attachment::docked_follow_system`]
//! 2. [`collisionzone::zone_follow_system`]
//! 3. [`case::lid_follow_system`]
//!
//! [`case::initialize_pending_cases`] and the functions in [`time`] are run
//! directly by the [`Simulation`](crate::simulation::Simulation) driver.
pub mod attachment;
pub mod blend;
pub mod case;
pub mod collisionzone;
pub mod indicator;
pub mod injector;
pub mod time;
