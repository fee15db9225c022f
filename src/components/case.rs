//! Storage case with one Injector slot, six Load slots and a hinged lid.
//!
//! All slot offsets are fixed, expressed in the case's local frame and
//! derived from the lid hinge point ([`LID_OFFSET`]). Slot index 0 is the
//! Injector slot, 1..=6 are the Load slots; each slot has a collision zone
//! wired to the case's `collision` field with its index as the literal.
//!
//! The lid angle comes from where the user left the lid handle: see
//! [`compute_lid_angle`].

use bevy_ecs::prelude::{Component, Entity};
use glam::{EulerRot, Quat, Vec3};

use crate::components::collisionzone::{CASE_ZONE_TEMPLATE, ZoneHandle, ZoneSpec, zone_name};
use crate::components::pose::Pose;
use crate::components::triggeraction::{TriggerAction, TriggerValue};
use crate::resources::attachments::ListenerId;

pub const COLLISION_FIELD: &str = "collision";
pub const RECEIVER_NAME: &str = "Case";
/// Value of the `collision` field while no slot is signalling.
pub const IDLE_COLLISION: f32 = -1.0;
/// Name of the lid element inside the case asset.
pub const LID_ELEMENT: &str = "GunCase_Lid";

pub const LID_LENGTH: f32 = 0.45;
pub const LID_MAX_ROTATION: f32 = 130.0;
/// Lid hinge, relative to the case origin.
pub const LID_OFFSET: Vec3 = Vec3::new(0.0, 0.14, -0.2);
pub const SLOT_ZONE_SIZE: f32 = 0.15;
pub const LOAD_SLOT_COUNT: usize = 6;

/// Injector placement, relative to the slot reference point.
const INJECTOR_PLACEMENT_DELTA: Vec3 = Vec3::new(0.006, -0.015, -0.025);
/// Load slot centers, relative to the slot reference point.
const LOAD_SLOT_DELTAS: [Vec3; LOAD_SLOT_COUNT] = [
    Vec3::new(0.193, -0.014, -0.025),
    Vec3::new(0.193, -0.014, 0.055),
    Vec3::new(0.193, -0.014, -0.103),
    Vec3::new(-0.193, -0.014, -0.025),
    Vec3::new(-0.193, -0.014, 0.055),
    Vec3::new(-0.193, -0.014, -0.103),
];

/// Slot reference point: halfway along the closed lid.
pub fn slot_reference() -> Vec3 {
    LID_OFFSET + Vec3::new(0.0, 0.0, LID_LENGTH / 2.0)
}

/// Unity-style Euler angles in degrees (applied Z, then X, then Y).
fn euler_degrees(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        y.to_radians(),
        x.to_radians(),
        z.to_radians(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseSlot {
    Injector,
    /// Load slot, 0-based.
    Load(u8),
}

impl CaseSlot {
    /// Slot from its signal index (0 = Injector, 1..=6 = Loads).
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(CaseSlot::Injector),
            n if n <= LOAD_SLOT_COUNT => Some(CaseSlot::Load((n - 1) as u8)),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            CaseSlot::Injector => 0,
            CaseSlot::Load(n) => *n as usize + 1,
        }
    }

    pub fn all() -> impl Iterator<Item = CaseSlot> {
        (0..=LOAD_SLOT_COUNT).filter_map(CaseSlot::from_index)
    }

    /// Center of the slot's collision zone, case-local.
    pub fn zone_offset(&self) -> Vec3 {
        match self {
            CaseSlot::Injector => slot_reference(),
            CaseSlot::Load(n) => slot_reference() + LOAD_SLOT_DELTAS[*n as usize],
        }
    }

    /// Where an occupant of this slot is placed, case-local.
    pub fn placement_offset(&self) -> Vec3 {
        match self {
            CaseSlot::Injector => slot_reference() + INJECTOR_PLACEMENT_DELTA,
            CaseSlot::Load(_) => self.zone_offset(),
        }
    }

    /// Fixed orientation of an occupant relative to the case.
    pub fn orientation(&self) -> Quat {
        match self {
            CaseSlot::Injector => euler_degrees(180.0, -90.0, 90.0),
            CaseSlot::Load(_) => euler_degrees(-90.0, 90.0, 0.0),
        }
    }

    pub fn zone_spec(&self, uid: &str, size: f32) -> ZoneSpec {
        ZoneSpec {
            name: zone_name(CASE_ZONE_TEMPLATE, uid, Some(self.index())),
            size,
            offset: self.zone_offset(),
            action: TriggerAction::new(
                uid,
                RECEIVER_NAME,
                COLLISION_FIELD,
                TriggerValue::Float(self.index() as f32),
            ),
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Case {
    /// Zones indexed by slot index.
    pub zones: [ZoneHandle; LOAD_SLOT_COUNT + 1],
    pub lid: Option<Entity>,
    pub lid_handle: Option<Entity>,
    pub lid_listener: Option<ListenerId>,
    /// Current lid opening in degrees, 0 = closed.
    pub lid_angle: f32,
}

impl Default for Case {
    fn default() -> Self {
        Self {
            zones: [ZoneHandle::default(); LOAD_SLOT_COUNT + 1],
            lid: None,
            lid_handle: None,
            lid_listener: None,
            lid_angle: 0.0,
        }
    }
}

impl Case {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zone(&self, slot: CaseSlot) -> ZoneHandle {
        self.zones[slot.index()]
    }
}

/// Marker: lid lookup still to do once the scene has finished loading.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PendingLid;

/// Lid hinge in world space.
pub fn lid_hinge(case_pose: &Pose) -> Vec3 {
    case_pose.transform_point(LID_OFFSET)
}

/// World rotation of the lid opened by `angle` degrees.
pub fn lid_rotation(case_pose: &Pose, angle: f32) -> Quat {
    case_pose.rotation * Quat::from_rotation_x((-angle).to_radians())
}

/// World position of the lid tip, where the handle rests.
pub fn lid_tip(case_pose: &Pose, angle: f32) -> Vec3 {
    lid_hinge(case_pose) + lid_rotation(case_pose, angle) * Vec3::new(0.0, 0.0, LID_LENGTH)
}

/// Clamp a signed raw angle into [0, MAX].
///
/// Negative angles down to -90 mean the handle was pushed below the closed
/// lid and snap shut; further down means it wrapped around behind the hinge
/// and snaps fully open.
pub fn clamp_lid_angle(raw: f32) -> f32 {
    if raw < 0.0 {
        if raw >= -90.0 { 0.0 } else { LID_MAX_ROTATION }
    } else {
        raw.min(LID_MAX_ROTATION)
    }
}

/// Lid angle for a handle at `handle_position`.
///
/// The hinge-to-handle displacement is taken into the case frame, projected
/// on the plane orthogonal to the hinge axis (local x) and compared with the
/// closed-lid vector. Upward displacement gives positive angles. A zero
/// projection keeps `previous`.
pub fn compute_lid_angle(case_pose: &Pose, handle_position: Vec3, previous: f32) -> f32 {
    let closed = Vec3::new(0.0, 0.0, LID_LENGTH);
    let displacement = case_pose.inverse_transform_point(handle_position) - LID_OFFSET;
    let on_plane = Vec3::new(0.0, displacement.y, displacement.z);
    let div = closed.length() * on_plane.length();
    if div == 0.0 {
        return previous;
    }
    let cos = (closed.dot(on_plane) / div).clamp(-1.0, 1.0);
    let mut angle = cos.acos().to_degrees();
    if on_plane.y < 0.0 {
        angle = -angle;
    }
    clamp_lid_angle(angle)
}
