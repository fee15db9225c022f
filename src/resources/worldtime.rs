use bevy_ecs::prelude::Resource;

/// Simulation clocks.
///
/// Two clocks run side by side: the frame clock (`elapsed`/`delta`), advanced
/// once per rendered frame, and the fixed clock (`fixed_elapsed`/
/// `fixed_delta`), advanced once per physics step. Spatial follow runs on the
/// fixed clock; attribute blending steps with the frame delta.
#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    pub elapsed: f32,
    pub delta: f32,
    pub fixed_elapsed: f32,
    pub fixed_delta: f32,
    pub time_scale: f32,
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            fixed_elapsed: 0.0,
            fixed_delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}
