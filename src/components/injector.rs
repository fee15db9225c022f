//! Injector: the dispenser that carries one Load and consumes it against a
//! target it touches.
//!
//! An Injector owns two collision zones:
//! - the run zone at the needle tip, wired to the `run` field
//! - the load zone at the cartridge socket, wired to the `attach` field
//!
//! The docked Load itself is tracked by the
//! [`AttachmentTracker`](crate::resources::attachments::AttachmentTracker).

use bevy_ecs::prelude::Component;
use glam::Vec3;

use crate::components::collisionzone::{
    INJECTOR_LOAD_ZONE_TEMPLATE, INJECTOR_ZONE_TEMPLATE, ZoneHandle, ZoneSpec, zone_name,
};
use crate::components::triggeraction::{TriggerAction, TriggerValue};

pub const RUN_FIELD: &str = "run";
pub const ATTACH_FIELD: &str = "attach";
pub const RECEIVER_NAME: &str = "Injector";

pub const RUN_ZONE_SIZE: f32 = 0.02;
pub const LOAD_ZONE_SIZE: f32 = 0.1;
pub const RUN_ZONE_OFFSET: Vec3 = Vec3::new(0.0, 0.048, -0.12);
pub const LOAD_ZONE_OFFSET: Vec3 = Vec3::new(0.0, 0.09, -0.04);
/// Where a docked Load rides, slightly above the load zone center.
pub const DOCKED_LOAD_OFFSET: Vec3 = Vec3::new(0.0, 0.1, -0.04);

#[derive(Component, Debug, Clone, Default)]
pub struct Injector {
    pub run_zone: ZoneHandle,
    pub load_zone: ZoneHandle,
}

impl Injector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_zone_spec(uid: &str, size: f32) -> ZoneSpec {
        ZoneSpec {
            name: zone_name(INJECTOR_ZONE_TEMPLATE, uid, None),
            size,
            offset: RUN_ZONE_OFFSET,
            action: TriggerAction::new(uid, RECEIVER_NAME, RUN_FIELD, TriggerValue::Bool(true)),
        }
    }

    pub fn load_zone_spec(uid: &str, size: f32) -> ZoneSpec {
        ZoneSpec {
            name: zone_name(INJECTOR_LOAD_ZONE_TEMPLATE, uid, None),
            size,
            offset: LOAD_ZONE_OFFSET,
            action: TriggerAction::new(uid, RECEIVER_NAME, ATTACH_FIELD, TriggerValue::Bool(true)),
        }
    }
}
