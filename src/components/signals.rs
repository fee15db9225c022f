// Receiving fields written by trigger actions

use bevy_ecs::prelude::Component;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Externally addressable fields of an entity.
///
/// Trigger actions write literal values here: booleans become flags, numbers
/// become scalars. The owning system reads and resets them.
///
/// Several writers may hit the same scalar within one frame (every slot zone
/// of a case writes `collision`), so scalar writes are also queued in arrival
/// order until drained.
#[derive(Debug, Clone, Component, Default)]
pub struct Signals {
    pub scalars: FxHashMap<String, f32>,
    pub flags: FxHashSet<String>,
    pub received: FxHashMap<String, SmallVec<[f32; 4]>>,
}

impl Signals {
    pub fn with_scalar(mut self, key: impl Into<String>, value: f32) -> Self {
        self.set_scalar(key, value);
        self
    }
    pub fn set_scalar(&mut self, key: impl Into<String>, value: f32) {
        self.scalars.insert(key.into(), value);
    }
    /// Store a scalar and queue the write.
    pub fn push_scalar(&mut self, key: impl Into<String>, value: f32) {
        let key = key.into();
        self.received.entry(key.clone()).or_default().push(value);
        self.scalars.insert(key, value);
    }
    /// Every queued write of `key` since the last drain, oldest first.
    pub fn drain_scalar(&mut self, key: &str) -> SmallVec<[f32; 4]> {
        self.received.remove(key).unwrap_or_default()
    }
    pub fn get_scalar(&self, key: &str) -> Option<f32> {
        self.scalars.get(key).copied()
    }
    pub fn set_flag(&mut self, key: impl Into<String>) {
        self.flags.insert(key.into());
    }
    pub fn clear_flag(&mut self, key: &str) {
        self.flags.remove(key);
    }
    pub fn has_flag(&self, key: &str) -> bool {
        self.flags.contains(key)
    }
    /// Reads a flag and resets it in one step. Returns whether it was set.
    pub fn take_flag(&mut self, key: &str) -> bool {
        self.flags.remove(key)
    }
}
