//! Blend engine system: the only writer of attribute values.
use bevy_ecs::prelude::*;

use crate::components::attributes::AttributeBanks;
use crate::components::blend::InjectionBlend;
use crate::resources::worldtime::WorldTime;

/// Advance every running blend by one frame.
///
/// The deadline is checked against the fixed clock; the amount applied is
/// proportional to the frame delta. Targets that vanished are skipped.
pub fn injection_blend_system(
    time: Res<WorldTime>,
    mut blends: Query<&mut InjectionBlend>,
    mut targets: Query<&mut AttributeBanks>,
) {
    for mut blend in blends.iter_mut() {
        if blend.queued.is_empty() && blend.total_duration == 0.0 {
            continue;
        }
        for (attr, amount) in blend.step(time.fixed_elapsed, time.delta) {
            let Ok(mut banks) = targets.get_mut(attr.target) else {
                continue;
            };
            if let Some(current) = banks.value(&attr) {
                banks.set_value(&attr, current + amount);
            }
        }
    }
}
