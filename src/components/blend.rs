//! Timed attribute blending state owned by an Injector.
//!
//! Every consumption adds its per-attribute amounts to a pending queue and
//! extends one shared countdown. While the countdown runs, each frame moves
//! every queued attribute by `amount / total_duration * frame_delta`.
//!
//! Stacking rules:
//! - amounts for the same attribute accumulate, they never replace each other
//! - `deadline = max(deadline, now) + duration` and the durations add up, so
//!   overlapping consumptions produce one slower, longer blend
//!
//! The deadline lives on the fixed (physics) clock while the per-frame step
//! uses the frame delta. The driver advances both clocks together, so they
//! only drift apart by less than one fixed step.
//!
//! # Related
//!
//! - [`crate::systems::blend::injection_blend_system`] – applies the steps

use bevy_ecs::prelude::Component;
use rustc_hash::FxHashMap;

use crate::components::attributes::AttributeRef;

#[derive(Component, Debug, Clone, Default)]
pub struct InjectionBlend {
    /// Total amount still to distribute per attribute.
    pub queued: FxHashMap<AttributeRef, f32>,
    /// Fixed-clock time at which the blend ends.
    pub deadline: f32,
    /// Sum of the durations of every Load in the current blend.
    pub total_duration: f32,
}

impl InjectionBlend {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the deadline has not been passed.
    pub fn is_running(&self, now: f32) -> bool {
        !self.queued.is_empty() && now <= self.deadline
    }

    /// Register one consumption at fixed-clock time `now`.
    ///
    /// A blend whose deadline already passed is discarded first.
    pub fn stack(&mut self, now: f32, duration: f32, amounts: &[(AttributeRef, f32)]) {
        if now > self.deadline {
            self.clear();
        }
        self.total_duration += duration;
        self.deadline = self.deadline.max(now) + duration;
        for (attr, amount) in amounts {
            *self.queued.entry(*attr).or_insert(0.0) += *amount;
        }
    }

    /// Per-frame step. Returns the increment to add to each queued attribute
    /// for a frame of length `frame_delta`, or nothing once the deadline has
    /// passed (in which case the queue is cleared).
    pub fn step(&mut self, now: f32, frame_delta: f32) -> Vec<(AttributeRef, f32)> {
        if now > self.deadline || self.total_duration <= 0.0 {
            self.clear();
            return Vec::new();
        }
        let mut steps: Vec<(AttributeRef, f32)> = self
            .queued
            .iter()
            .map(|(attr, total)| (*attr, total / self.total_duration * frame_delta))
            .collect();
        steps.sort_by(|a, b| a.0.cmp(&b.0));
        steps
    }

    pub fn clear(&mut self) {
        self.queued.clear();
        self.total_duration = 0.0;
    }
}
