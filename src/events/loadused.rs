//! Notification raised every time a Load is consumed.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::info;

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct LoadUsedEvent {
    pub load: Entity,
    pub injector: Entity,
    pub target: Entity,
    /// Whether the Load is empty after this use.
    pub emptied: bool,
}

pub fn observe_load_used(trigger: On<LoadUsedEvent>) {
    let event = trigger.event();
    info!(
        "load {:?} injected into {:?} by {:?}{}",
        event.load,
        event.target,
        event.injector,
        if event.emptied { " (now empty)" } else { "" }
    );
}
