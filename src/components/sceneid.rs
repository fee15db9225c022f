//! Scene identity of an entity.
//!
//! The host scene addresses entities ("atoms") by a unique string id. Zone and
//! handle names are derived from it, and trigger actions name their receiver
//! by it. The [`SceneRegistry`](crate::resources::sceneregistry::SceneRegistry)
//! resource maps ids back to entities.

use bevy_ecs::prelude::{Component, Entity};
use rustc_hash::FxHashMap;

/// Broad atom type as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AtomKind {
    /// A character with attribute banks.
    Person,
    /// Invisible trigger volume.
    CollisionTrigger,
    /// Generic asset, used for lid handles.
    CustomAsset,
    /// Anything else (injectors, loads and cases are props with scripts).
    Prop,
}

#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct SceneId {
    pub uid: String,
    pub kind: AtomKind,
}

impl SceneId {
    pub fn new(uid: impl Into<String>, kind: AtomKind) -> Self {
        Self {
            uid: uid.into(),
            kind,
        }
    }

    pub fn prop(uid: impl Into<String>) -> Self {
        Self::new(uid, AtomKind::Prop)
    }
}

/// Named sub-elements of an asset (for example the lid of a case).
#[derive(Component, Clone, Debug, Default)]
pub struct SceneElements {
    pub elements: FxHashMap<String, Entity>,
}

impl SceneElements {
    pub fn with(mut self, name: impl Into<String>, entity: Entity) -> Self {
        self.elements.insert(name.into(), entity);
        self
    }

    pub fn find(&self, name: &str) -> Option<Entity> {
        self.elements.get(name).copied()
    }
}
