//! Trigger action delivery.
//!
//! A [`TriggerActionEvent`] carries one outbound action raised by a
//! collision zone or by a used Load. The observer resolves the receiving
//! atom by name and writes the literal into its [`Signals`].
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

use crate::components::signals::Signals;
use crate::components::triggeraction::{TriggerAction, TriggerValue};
use crate::resources::sceneregistry::SceneRegistry;

#[derive(Event, Debug, Clone)]
pub struct TriggerActionEvent {
    pub action: TriggerAction,
}

impl From<TriggerAction> for TriggerActionEvent {
    fn from(action: TriggerAction) -> Self {
        Self { action }
    }
}

/// Write the action's literal into the receiver.
///
/// `Bool(true)` raises the named flag, `Bool(false)` lowers it and
/// `Float(v)` stores and queues the scalar. An unknown receiver atom, or one without
/// [`Signals`], is a no-op.
pub fn observe_trigger_action(
    trigger: On<TriggerActionEvent>,
    registry: Res<SceneRegistry>,
    mut receivers: Query<&mut Signals>,
) {
    let action = &trigger.event().action;
    let Some(entity) = registry.lookup(&action.receiver_atom) else {
        debug!("trigger target '{}' not found", action.receiver_atom);
        return;
    };
    let Ok(mut signals) = receivers.get_mut(entity) else {
        debug!("trigger target '{}' has no signals", action.receiver_atom);
        return;
    };
    write_literal(&mut signals, &action.receiver_target, action.value);
}

pub(crate) fn write_literal(signals: &mut Signals, field: &str, value: TriggerValue) {
    match value {
        TriggerValue::Bool(true) => signals.set_flag(field),
        TriggerValue::Bool(false) => signals.clear_flag(field),
        TriggerValue::Float(v) => signals.push_scalar(field, v),
    }
}
