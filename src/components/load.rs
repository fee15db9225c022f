//! Load cartridges.
//!
//! A [`LoadResource`] is the content of one cartridge: a list of attribute
//! modifications, a blend duration and the consumption state. Injectors read
//! it when they hit a target and mark it used.
//!
//! # Delta modes
//!
//! - [`LoadDelta::Increment`] adds a fixed magnitude to the attribute.
//! - [`LoadDelta::SetTarget`] moves the attribute to an absolute value. The
//!   amount is the difference sampled once, at consumption time.
//!
//! # Persistence
//!
//! Each delta is stored under a key made of a 4-character mode tag (`Inc#` or
//! `Set#`) followed by the attribute display name. `duration`, `unlimited`
//! and `empty` are stored under their own names; the remaining reserved keys
//! belong to the host and are skipped.

use bevy_ecs::prelude::{Component, Entity};
use log::{debug, warn};
use serde_json::{Map, Value};

use crate::components::attributes::{AttributeBanks, AttributeRef};
use crate::components::triggeraction::TriggerAction;

pub const INCREMENT_TAG: &str = "Inc#";
pub const SET_TARGET_TAG: &str = "Set#";
pub const DEFAULT_DURATION: f32 = 10.0;
pub const MIN_DURATION: f32 = 0.1;
pub const MAX_DURATION: f32 = 120.0;
/// Bounds of a delta magnitude.
pub const MIN_MAGNITUDE: f32 = -1.0;
pub const MAX_MAGNITUDE: f32 = 1.0;

/// Persisted keys that never describe a delta.
pub const RESERVED_KEYS: [&str; 8] = [
    "duration",
    "unlimited",
    "empty",
    "color",
    "image",
    "id",
    "label",
    "pluginLabel",
];

fn clamp_magnitude(magnitude: f32) -> f32 {
    if magnitude.is_nan() {
        0.0
    } else {
        magnitude.clamp(MIN_MAGNITUDE, MAX_MAGNITUDE)
    }
}

/// One configured attribute modification. The magnitude is kept within
/// [`MIN_MAGNITUDE`, `MAX_MAGNITUDE`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadDelta {
    Increment { name: String, magnitude: f32 },
    SetTarget { name: String, magnitude: f32 },
}

impl LoadDelta {
    pub fn increment(name: impl Into<String>, magnitude: f32) -> Self {
        LoadDelta::Increment {
            name: name.into(),
            magnitude: clamp_magnitude(magnitude),
        }
    }

    pub fn set_target(name: impl Into<String>, magnitude: f32) -> Self {
        LoadDelta::SetTarget {
            name: name.into(),
            magnitude: clamp_magnitude(magnitude),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LoadDelta::Increment { name, .. } | LoadDelta::SetTarget { name, .. } => name,
        }
    }

    pub fn magnitude(&self) -> f32 {
        match self {
            LoadDelta::Increment { magnitude, .. } | LoadDelta::SetTarget { magnitude, .. } => {
                *magnitude
            }
        }
    }

    fn magnitude_mut(&mut self) -> &mut f32 {
        match self {
            LoadDelta::Increment { magnitude, .. } | LoadDelta::SetTarget { magnitude, .. } => {
                magnitude
            }
        }
    }

    /// Persisted key: mode tag + display name.
    pub fn key(&self) -> String {
        match self {
            LoadDelta::Increment { name, .. } => format!("{}{}", INCREMENT_TAG, name),
            LoadDelta::SetTarget { name, .. } => format!("{}{}", SET_TARGET_TAG, name),
        }
    }

    /// Parse a persisted key. Returns `None` for keys without a mode tag.
    pub fn from_key(key: &str, magnitude: f32) -> Option<Self> {
        if let Some(name) = key.strip_prefix(INCREMENT_TAG) {
            Some(LoadDelta::increment(name, magnitude))
        } else {
            key.strip_prefix(SET_TARGET_TAG)
                .map(|name| LoadDelta::set_target(name, magnitude))
        }
    }

    /// Amount to blend onto an attribute whose value is `current` right now.
    pub fn amount(&self, current: f32) -> f32 {
        match self {
            LoadDelta::Increment { magnitude, .. } => *magnitude,
            LoadDelta::SetTarget { magnitude, .. } => *magnitude - current,
        }
    }
}

/// Value of one exposed parameter of a persisted Load.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Float(f32),
    Text(String),
}

/// An exposed (named) parameter of a persisted Load.
#[derive(Debug, Clone, PartialEq)]
pub struct StorableParam {
    pub name: String,
    pub value: ParamValue,
}

impl StorableParam {
    pub fn new(name: impl Into<String>, value: ParamValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct LoadResource {
    empty: bool,
    unlimited: bool,
    duration: f32,
    deltas: Vec<LoadDelta>,
    /// Actions fired every time the Load is used, empty or not.
    pub on_use: Vec<TriggerAction>,
}

impl Default for LoadResource {
    fn default() -> Self {
        Self {
            empty: false,
            unlimited: false,
            duration: DEFAULT_DURATION,
            deltas: Vec::new(),
            on_use: Vec::new(),
        }
    }
}

impl LoadResource {
    pub fn new(duration: f32) -> Self {
        let mut load = Self::default();
        load.set_duration(duration);
        load
    }

    pub fn with_delta(mut self, delta: LoadDelta) -> Self {
        let name = delta.name().to_string();
        if !self.add_delta(delta) {
            debug!("with_delta: '{}' already configured, ignored", name);
        }
        self
    }

    pub fn with_unlimited(mut self, unlimited: bool) -> Self {
        self.set_unlimited(unlimited);
        self
    }

    pub fn with_on_use(mut self, action: TriggerAction) -> Self {
        self.on_use.push(action);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn is_unlimited(&self) -> bool {
        self.unlimited
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn deltas(&self) -> &[LoadDelta] {
        &self.deltas
    }

    /// Set the blend duration, clamped to [`MIN_DURATION`, `MAX_DURATION`].
    pub fn set_duration(&mut self, seconds: f32) {
        self.duration = if seconds.is_finite() {
            seconds.clamp(MIN_DURATION, MAX_DURATION)
        } else {
            DEFAULT_DURATION
        };
    }

    /// Set the empty flag directly (user edit or restore). An unlimited Load
    /// can't be marked empty.
    pub fn set_empty(&mut self, empty: bool) {
        self.empty = empty && !self.unlimited;
    }

    /// Turning unlimited on refills an empty Load.
    pub fn set_unlimited(&mut self, unlimited: bool) {
        self.unlimited = unlimited;
        if unlimited && self.empty {
            self.empty = false;
        }
    }

    /// Add a delta. Returns false when the attribute is already configured.
    pub fn add_delta(&mut self, mut delta: LoadDelta) -> bool {
        if self.find(delta.name()).is_some() {
            warn!("{} already added", delta.name());
            return false;
        }
        let magnitude = delta.magnitude_mut();
        *magnitude = clamp_magnitude(*magnitude);
        self.deltas.push(delta);
        true
    }

    /// Change the magnitude of an existing delta, clamped to
    /// [`MIN_MAGNITUDE`, `MAX_MAGNITUDE`]. Returns false on a miss.
    pub fn set_magnitude(&mut self, name: &str, magnitude: f32) -> bool {
        match self.deltas.iter_mut().find(|d| d.name() == name) {
            Some(d) => {
                *d.magnitude_mut() = clamp_magnitude(magnitude);
                true
            }
            None => false,
        }
    }

    pub fn remove_delta(&mut self, name: &str) -> Option<LoadDelta> {
        let pos = self.deltas.iter().position(|d| d.name() == name)?;
        Some(self.deltas.remove(pos))
    }

    pub fn find(&self, name: &str) -> Option<&LoadDelta> {
        self.deltas.iter().find(|d| d.name() == name)
    }

    /// Mark the Load as used. Sets `empty` unless the Load is unlimited and
    /// returns the side-effect actions, which fire on every use.
    pub fn use_load(&mut self) -> Vec<TriggerAction> {
        if !self.unlimited {
            self.empty = true;
        }
        self.on_use.clone()
    }

    /// Resolve the configured names against the target's visible attributes.
    /// Names that don't resolve are skipped.
    pub fn affected_attributes(&self, target: Entity, banks: &AttributeBanks) -> Vec<AttributeRef> {
        let index = banks.visible_index(target);
        self.deltas
            .iter()
            .filter_map(|d| index.get(d.name()).copied())
            .collect()
    }

    /// Amount to blend onto `attr`, sampled from its current value.
    /// `None` if the attribute is unknown or not configured in this Load.
    pub fn delta_for(&self, attr: &AttributeRef, banks: &AttributeBanks) -> Option<f32> {
        let attribute = banks.get(attr)?;
        let delta = self.find(&attribute.display_name)?;
        Some(delta.amount(attribute.value))
    }

    /// Snapshot of every (attribute, amount) pair this Load applies to a target.
    pub fn resolve(&self, target: Entity, banks: &AttributeBanks) -> Vec<(AttributeRef, f32)> {
        self.affected_attributes(target, banks)
            .into_iter()
            .filter_map(|attr| self.delta_for(&attr, banks).map(|amount| (attr, amount)))
            .collect()
    }

    /// Rebuild a Load from its exposed parameters. Unknown parameters are
    /// ignored and a parameter with an unexpected value type is dropped on
    /// its own.
    pub fn from_params(params: &[StorableParam]) -> Self {
        let mut load = Self::default();
        for param in params {
            match (param.name.as_str(), &param.value) {
                ("empty", ParamValue::Bool(b)) => load.empty = *b,
                ("unlimited", ParamValue::Bool(b)) => load.unlimited = *b,
                ("duration", ParamValue::Float(f)) => load.set_duration(*f),
                (name, ParamValue::Float(f)) => {
                    if let Some(delta) = LoadDelta::from_key(name, *f) {
                        load.add_delta(delta);
                    }
                }
                (name, _) => debug!("from_params: skipping parameter '{}'", name),
            }
        }
        if load.unlimited {
            load.empty = false;
        }
        load
    }

    /// Exposed parameters of this Load, the inverse of [`LoadResource::from_params`].
    pub fn to_params(&self) -> Vec<StorableParam> {
        let mut params = vec![
            StorableParam::new("empty", ParamValue::Bool(self.empty)),
            StorableParam::new("unlimited", ParamValue::Bool(self.unlimited)),
            StorableParam::new("duration", ParamValue::Float(self.duration)),
        ];
        params.extend(
            self.deltas
                .iter()
                .map(|d| StorableParam::new(d.key(), ParamValue::Float(d.magnitude()))),
        );
        params
    }

    /// Persisted form under the key convention.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("duration".into(), Value::from(self.duration));
        map.insert("unlimited".into(), Value::from(self.unlimited));
        map.insert("empty".into(), Value::from(self.empty));
        for d in &self.deltas {
            map.insert(d.key(), Value::from(d.magnitude()));
        }
        Value::Object(map)
    }

    /// Restore from a persisted object. Values may be native JSON or the
    /// host's stringified literals. Entries that don't parse are dropped.
    pub fn from_json(value: &Value) -> Self {
        let mut load = Self::default();
        let Some(map) = value.as_object() else {
            debug!("from_json: not an object, using defaults");
            return load;
        };

        if let Some(b) = map.get("unlimited").and_then(json_bool) {
            load.unlimited = b;
        }
        if let Some(b) = map.get("empty").and_then(json_bool) {
            load.empty = b && !load.unlimited;
        }
        if let Some(f) = map.get("duration").and_then(json_f32) {
            load.set_duration(f);
        }

        for (key, v) in map {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let Some(magnitude) = json_f32(v) else {
                debug!("from_json: '{}' has no numeric value, skipped", key);
                continue;
            };
            if let Some(delta) = LoadDelta::from_key(key, magnitude) {
                load.add_delta(delta);
            }
        }
        load
    }
}

fn json_f32(v: &Value) -> Option<f32> {
    match v {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::String(s) => s.trim().parse::<f32>().ok(),
        _ => None,
    }
}

fn json_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse::<bool>().ok(),
        _ => None,
    }
}
