//! Clock update functions.
//!
//! Both clocks live on [`WorldTime`](crate::resources::worldtime::WorldTime).
//! The driver advances the fixed clock once per physics step and the frame
//! clock once per frame, applying `time_scale` to both.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Advance the frame clock by the unscaled frame delta `dt`.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    let scaled_dt = dt * wt.time_scale;
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.frame_count += 1;
}

/// Advance the fixed clock by one unscaled step.
pub fn update_fixed_time(world: &mut World, step: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    let scaled_step = step * wt.time_scale;
    wt.fixed_elapsed += scaled_step;
    wt.fixed_delta = scaled_step;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clocks_advance_independently() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default().with_time_scale(2.0));
        update_fixed_time(&mut world, 0.02);
        update_world_time(&mut world, 0.5);
        let wt = world.resource::<WorldTime>();
        assert!((wt.fixed_elapsed - 0.04).abs() < 1e-6);
        assert!((wt.elapsed - 1.0).abs() < 1e-6);
        assert_eq!(wt.frame_count, 1);
    }
}
