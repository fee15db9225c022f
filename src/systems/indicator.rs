use bevy_ecs::prelude::*;

use crate::components::indicator::Indicator;
use crate::components::load::LoadResource;
use crate::resources::worldtime::WorldTime;

/// Fade the indicator of empty Loads toward black; charged Loads show their
/// configured color.
pub fn load_indicator_system(
    time: Res<WorldTime>,
    mut loads: Query<(&LoadResource, &mut Indicator)>,
) {
    for (load, mut indicator) in loads.iter_mut() {
        if load.is_empty() {
            if !indicator.is_black() {
                indicator.fade(time.delta);
            }
        } else if indicator.current != indicator.base {
            indicator.restore();
        }
    }
}
