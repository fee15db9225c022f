//! Scene registry resource.
//!
//! Stands in for the host's global atom registry: it maps unique scene ids to
//! entities and reports whether the host is still loading the scene. Zone
//! provisioning and lid lookup wait until `loading` is false and re-check
//! every frame until then.

use bevy_ecs::prelude::{Entity, Resource};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Resource)]
pub struct SceneRegistry {
    by_name: FxHashMap<String, Entity>,
    /// True while the host is loading the scene.
    pub loading: bool,
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self {
            by_name: FxHashMap::default(),
            loading: true,
        }
    }
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        !self.loading
    }

    pub fn insert(&mut self, name: impl Into<String>, entity: Entity) {
        self.by_name.insert(name.into(), entity);
    }

    pub fn lookup(&self, name: &str) -> Option<Entity> {
        self.by_name.get(name).copied()
    }

    /// Remove a name. Returns the entity it pointed at.
    pub fn remove(&mut self, name: &str) -> Option<Entity> {
        self.by_name.remove(name)
    }

    /// Remove every name pointing at `entity`.
    pub fn forget(&mut self, entity: Entity) {
        self.by_name.retain(|_, e| *e != entity);
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Names starting with `prefix`, sorted.
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .by_name
            .keys()
            .filter(|n| n.starts_with(prefix))
            .map(|n| n.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
