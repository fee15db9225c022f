//! ECS resources made available to systems.
//!
//! Overview
//! - `attachments` – docking links and grab listeners
//! - `mechanicsconfig` – tunables loaded from an INI file
//! - `sceneregistry` – atom lookup by unique name and the scene loading flag
//! - `worldtime` – frame clock and fixed clock
pub mod attachments;
pub mod mechanicsconfig;
pub mod sceneregistry;
pub mod worldtime;
