//! Mechanics configuration resource.
//!
//! Tunables loaded from an INI file. Every key is optional; anything missing
//! keeps its default.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! fixed_timestep = 0.02
//!
//! [injector]
//! run_zone_size = 0.02
//! load_zone_size = 0.1
//!
//! [case]
//! slot_zone_size = 0.15
//!
//! [logging]
//! filter = info
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::{Path, PathBuf};

use crate::components::case::SLOT_ZONE_SIZE;
use crate::components::injector::{LOAD_ZONE_SIZE, RUN_ZONE_SIZE};
use crate::error::MechanicsError;

const DEFAULT_FIXED_TIMESTEP: f32 = 0.02;
const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_CONFIG_PATH: &str = "./morphinjection.ini";
/// Smallest accepted fixed step, in seconds.
const MIN_FIXED_TIMESTEP: f32 = 0.001;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MechanicsConfig {
    /// Seconds per fixed (physics) step.
    pub fixed_timestep: f32,
    /// Edge of the Injector's run zone.
    pub run_zone_size: f32,
    /// Edge of the Injector's load zone.
    pub load_zone_size: f32,
    /// Edge of each Case slot zone.
    pub slot_zone_size: f32,
    /// `env_logger` filter used by the binary when `RUST_LOG` is unset.
    pub log_filter: String,
    pub config_path: PathBuf,
}

impl Default for MechanicsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MechanicsConfig {
    pub fn new() -> Self {
        Self {
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            run_zone_size: RUN_ZONE_SIZE,
            load_zone_size: LOAD_ZONE_SIZE,
            slot_zone_size: SLOT_ZONE_SIZE,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load values from [`Self::config_path`].
    pub fn load_from_file(&mut self) -> Result<(), MechanicsError> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| MechanicsError::Config(format!("failed to load {:?}: {}", self.config_path, e)))?;
        self.apply(&config)?;
        info!(
            "Loaded config: fixed_timestep={}, run_zone={}, load_zone={}, slot_zone={}, log={}",
            self.fixed_timestep,
            self.run_zone_size,
            self.load_zone_size,
            self.slot_zone_size,
            self.log_filter
        );
        Ok(())
    }

    /// Load values from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), MechanicsError> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| MechanicsError::Config(format!("failed to parse config: {}", e)))?;
        self.apply(&config)
    }

    fn apply(&mut self, config: &Ini) -> Result<(), MechanicsError> {
        // [simulation]
        if let Some(step) = read_float(config, "simulation", "fixed_timestep")? {
            if step.is_nan() || step < MIN_FIXED_TIMESTEP {
                return Err(MechanicsError::Config(format!(
                    "simulation.fixed_timestep must be at least {}, got {}",
                    MIN_FIXED_TIMESTEP, step
                )));
            }
            self.fixed_timestep = step;
        }

        // [injector]
        if let Some(size) = read_size(config, "injector", "run_zone_size")? {
            self.run_zone_size = size;
        }
        if let Some(size) = read_size(config, "injector", "load_zone_size")? {
            self.load_zone_size = size;
        }

        // [case]
        if let Some(size) = read_size(config, "case", "slot_zone_size")? {
            self.slot_zone_size = size;
        }

        // [logging]
        if let Some(filter) = config.get("logging", "filter") {
            self.log_filter = filter;
        }
        Ok(())
    }

    /// Save the current values to [`Self::config_path`].
    pub fn save_to_file(&self) -> Result<(), MechanicsError> {
        self.save_to(&self.config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), MechanicsError> {
        let mut config = Ini::new();
        config.set("simulation", "fixed_timestep", Some(self.fixed_timestep.to_string()));
        config.set("injector", "run_zone_size", Some(self.run_zone_size.to_string()));
        config.set("injector", "load_zone_size", Some(self.load_zone_size.to_string()));
        config.set("case", "slot_zone_size", Some(self.slot_zone_size.to_string()));
        config.set("logging", "filter", Some(self.log_filter.clone()));
        config
            .write(path)
            .map_err(|e| MechanicsError::Config(format!("failed to save {:?}: {}", path, e)))?;
        info!("Saved config to {:?}", path);
        Ok(())
    }
}

fn read_float(config: &Ini, section: &str, key: &str) -> Result<Option<f32>, MechanicsError> {
    config
        .getfloat(section, key)
        .map(|v| v.map(|f| f as f32))
        .map_err(|e| MechanicsError::Config(format!("{}.{}: {}", section, key, e)))
}

fn read_size(config: &Ini, section: &str, key: &str) -> Result<Option<f32>, MechanicsError> {
    match read_float(config, section, key)? {
        Some(size) if size > 0.0 && size.is_finite() => Ok(Some(size)),
        Some(size) => Err(MechanicsError::Config(format!(
            "{}.{} must be positive, got {}",
            section, key, size
        ))),
        None => Ok(None),
    }
}
