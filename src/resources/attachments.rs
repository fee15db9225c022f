//! Attachment tracker resource.
//!
//! Owns every docking link (which occupant sits at which docking point) and
//! every grab listener registration. A docking point holds at most one
//! occupant and an occupant holds at most one link.
//!
//! # Link lifecycle
//!
//! 1. [`AttachmentTracker::attach`] tears down the occupant's previous link
//!    (removing its listener) and displaces whoever sat at the target point.
//! 2. It then installs the new link and exactly one single-use `Undock`
//!    listener on the occupant's grab-start signal.
//! 3. When the occupant is grabbed, [`AttachmentTracker::handle_grab`] fires
//!    the listener, which removes itself and the link.
//!
//! Lid handles use the same registry with a persistent `LidRelease` listener
//! on grab end.

use bevy_ecs::prelude::{Entity, Resource};
use glam::{Quat, Vec3};
use log::debug;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::components::case::CaseSlot;
use crate::events::grab::GrabPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// What a grab listener does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabAction {
    /// Detach the grabbed occupant from its docking point.
    Undock,
    /// Recompute the lid angle of `case`.
    LidRelease { case: Entity },
}

#[derive(Debug, Clone, Copy)]
struct Listener {
    id: ListenerId,
    phase: GrabPhase,
    action: GrabAction,
    once: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DockSlot {
    /// The cartridge socket of an Injector.
    InjectorLoad,
    /// A slot of a Case.
    Case(CaseSlot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DockPoint {
    pub carrier: Entity,
    pub slot: DockSlot,
}

impl DockPoint {
    pub fn new(carrier: Entity, slot: DockSlot) -> Self {
        Self { carrier, slot }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachmentLink {
    pub occupant: Entity,
    pub point: DockPoint,
    /// Position at the point, in the carrier's local frame.
    pub offset: Vec3,
    /// Orientation relative to the carrier.
    pub orientation: Quat,
    pub listener: ListenerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// The occupant was free and is now docked.
    Attached,
    /// The occupant moved here from another point.
    Moved { from: DockPoint },
    /// The occupant already sat at this point.
    Unchanged,
}

#[derive(Debug, Default, Resource)]
pub struct AttachmentTracker {
    links: FxHashMap<Entity, AttachmentLink>,
    occupants: FxHashMap<DockPoint, Entity>,
    listeners: FxHashMap<Entity, SmallVec<[Listener; 2]>>,
    next_id: u64,
}

impl AttachmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== LISTENERS ====================

    pub fn add_listener(
        &mut self,
        entity: Entity,
        phase: GrabPhase,
        action: GrabAction,
        once: bool,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(entity).or_default().push(Listener {
            id,
            phase,
            action,
            once,
        });
        id
    }

    /// Remove a listener by identity. Returns false if it was not registered.
    pub fn remove_listener(&mut self, entity: Entity, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(&entity) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| l.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.remove(&entity);
        }
        removed
    }

    pub fn has_listener(&self, entity: Entity, id: ListenerId) -> bool {
        self.listeners
            .get(&entity)
            .is_some_and(|list| list.iter().any(|l| l.id == id))
    }

    pub fn listener_count(&self, entity: Entity) -> usize {
        self.listeners.get(&entity).map_or(0, |l| l.len())
    }

    /// Fire the listeners registered on `entity` for `phase`.
    ///
    /// Single-use listeners are removed before their action runs. `Undock`
    /// is applied here; the fired actions are returned for the caller to run
    /// the rest.
    pub fn handle_grab(&mut self, entity: Entity, phase: GrabPhase) -> SmallVec<[GrabAction; 2]> {
        let mut fired: SmallVec<[GrabAction; 2]> = SmallVec::new();
        if let Some(list) = self.listeners.get_mut(&entity) {
            list.retain(|l| {
                if l.phase != phase {
                    return true;
                }
                fired.push(l.action);
                !l.once
            });
            if list.is_empty() {
                self.listeners.remove(&entity);
            }
        }
        if fired.contains(&GrabAction::Undock) {
            if let Some(link) = self.detach(entity) {
                debug!("{:?} released from {:?}", entity, link.point);
            }
        }
        fired
    }

    // ==================== LINKS ====================

    /// Dock `occupant` at `point`.
    pub fn attach(
        &mut self,
        occupant: Entity,
        point: DockPoint,
        offset: Vec3,
        orientation: Quat,
    ) -> AttachOutcome {
        if let Some(link) = self.links.get(&occupant) {
            if link.point == point {
                return AttachOutcome::Unchanged;
            }
        }

        if let Some(previous_occupant) = self.occupants.get(&point).copied() {
            debug!("{:?} displaced from {:?}", previous_occupant, point);
            self.detach(previous_occupant);
        }

        let outcome = match self.detach(occupant) {
            Some(old) => AttachOutcome::Moved { from: old.point },
            None => AttachOutcome::Attached,
        };

        let listener = self.add_listener(occupant, GrabPhase::Start, GrabAction::Undock, true);
        self.links.insert(
            occupant,
            AttachmentLink {
                occupant,
                point,
                offset,
                orientation,
                listener,
            },
        );
        self.occupants.insert(point, occupant);
        outcome
    }

    /// Remove the occupant's link and its release listener.
    pub fn detach(&mut self, occupant: Entity) -> Option<AttachmentLink> {
        let link = self.links.remove(&occupant)?;
        self.occupants.remove(&link.point);
        self.remove_listener(occupant, link.listener);
        Some(link)
    }

    pub fn link(&self, occupant: Entity) -> Option<&AttachmentLink> {
        self.links.get(&occupant)
    }

    pub fn occupant_at(&self, point: DockPoint) -> Option<Entity> {
        self.occupants.get(&point).copied()
    }

    pub fn links(&self) -> impl Iterator<Item = &AttachmentLink> {
        self.links.values()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Drop everything involving `entity`: its own link, the links of
    /// anything docked on it and its listeners.
    pub fn forget(&mut self, entity: Entity) {
        self.detach(entity);
        let carried: Vec<Entity> = self
            .links
            .values()
            .filter(|l| l.point.carrier == entity)
            .map(|l| l.occupant)
            .collect();
        for occupant in carried {
            self.detach(occupant);
        }
        self.listeners.remove(&entity);
    }

    /// Remove every link and listener.
    pub fn clear(&mut self) {
        self.links.clear();
        self.occupants.clear();
        self.listeners.clear();
    }
}
