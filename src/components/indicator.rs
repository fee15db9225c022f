//! Charge indicator of a Load.
//!
//! While the Load is charged the indicator shows its configured color. Once
//! the Load is empty the color fades toward black over
//! [`FADE_SECONDS`] seconds per full channel.

use bevy_ecs::prelude::Component;

pub const FADE_SECONDS: f32 = 3.0;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Indicator {
    /// Configured RGB color (0..1 per channel).
    pub base: [f32; 3],
    /// Color currently shown.
    pub current: [f32; 3],
}

impl Indicator {
    pub fn new(base: [f32; 3]) -> Self {
        Self {
            base,
            current: base,
        }
    }

    pub fn is_black(&self) -> bool {
        self.current.iter().all(|c| *c <= 0.0)
    }

    /// Step the fade toward black by `dt` seconds.
    pub fn fade(&mut self, dt: f32) {
        let step = dt / FADE_SECONDS;
        for c in self.current.iter_mut() {
            *c = (*c - step).max(0.0);
        }
    }

    pub fn restore(&mut self) {
        self.current = self.base;
    }
}
