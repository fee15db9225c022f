//! Attribute banks of a target entity.
//!
//! A target (a Person) exposes its tunable attributes through three ordered
//! banks. Only attributes marked visible take part in name resolution, and
//! the display name is the resolution key: when the same name appears more
//! than once, the first visible occurrence (bank order, then slot order) wins.
//!
//! Attribute values are written only by the blend engine
//! ([`crate::systems::blend`]); everything else reads them.

use bevy_ecs::prelude::{Component, Entity};
use rustc_hash::FxHashMap;

pub const BANK_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub display_name: String,
    pub value: f32,
    pub visible: bool,
}

impl Attribute {
    pub fn new(display_name: impl Into<String>, value: f32) -> Self {
        Self {
            display_name: display_name.into(),
            value,
            visible: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Identity of one attribute on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeRef {
    pub target: Entity,
    pub bank: u8,
    pub index: u32,
}

#[derive(Component, Debug, Clone, Default)]
pub struct AttributeBanks {
    pub banks: [Vec<Attribute>; BANK_COUNT],
}

impl AttributeBanks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append an attribute to `bank`. Out of range banks are ignored.
    pub fn with(mut self, bank: usize, attribute: Attribute) -> Self {
        if let Some(b) = self.banks.get_mut(bank) {
            b.push(attribute);
        }
        self
    }

    /// Union of the visible attributes of all banks, keyed by display name.
    pub fn visible_index(&self, target: Entity) -> FxHashMap<&str, AttributeRef> {
        let mut index = FxHashMap::default();
        for (bank, attributes) in self.banks.iter().enumerate() {
            for (i, attribute) in attributes.iter().enumerate() {
                if !attribute.visible {
                    continue;
                }
                index
                    .entry(attribute.display_name.as_str())
                    .or_insert(AttributeRef {
                        target,
                        bank: bank as u8,
                        index: i as u32,
                    });
            }
        }
        index
    }

    pub fn get(&self, attr: &AttributeRef) -> Option<&Attribute> {
        self.banks
            .get(attr.bank as usize)
            .and_then(|b| b.get(attr.index as usize))
    }

    pub fn value(&self, attr: &AttributeRef) -> Option<f32> {
        self.get(attr).map(|a| a.value)
    }

    /// Write a value back to the authoritative store. Returns false on a miss.
    pub fn set_value(&mut self, attr: &AttributeRef, value: f32) -> bool {
        match self
            .banks
            .get_mut(attr.bank as usize)
            .and_then(|b| b.get_mut(attr.index as usize))
        {
            Some(a) => {
                a.value = value;
                true
            }
            None => false,
        }
    }

    /// Value of the first visible attribute with the given display name.
    pub fn value_by_name(&self, name: &str) -> Option<f32> {
        self.banks
            .iter()
            .flatten()
            .find(|a| a.visible && a.display_name == name)
            .map(|a| a.value)
    }

    /// Every distinct visible display name, in bank order.
    pub fn visible_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for a in self.banks.iter().flatten().filter(|a| a.visible) {
            if !names.contains(&a.display_name.as_str()) {
                names.push(a.display_name.as_str());
            }
        }
        names
    }
}
