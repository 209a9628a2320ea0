#![forbid(unsafe_code)]

//! Callback payload delivered to gesture callbacks and predicates.

use web_time::Instant;

use crate::event::{InputSource, Modifiers, RawInput};
use crate::kinematics::Kinematics;

/// Which callback a [`GestureDetail`] is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailKind {
    /// Capture attempt (`can_start`) or `on_start`.
    Start,
    /// `on_move`.
    Move,
    /// `on_end`, and `on_not_captured`.
    End,
}

/// Kinematics snapshot plus the raw event that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureDetail {
    pub kind: DetailKind,
    /// True while contacts are still down.
    pub is_tracking: bool,
    pub source: InputSource,
    pub start_x: f64,
    pub start_y: f64,
    pub current_x: f64,
    pub current_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    /// Distance units per millisecond.
    pub velocity_x: f64,
    /// Distance units per millisecond.
    pub velocity_y: f64,
    pub touch_count: usize,
    pub scale: f64,
    /// Degrees.
    pub rotation: f64,
    pub start_time: Instant,
    pub current_time: Instant,
    /// Modifiers of the event that produced this payload.
    pub modifiers: Modifiers,
    pub raw_event: RawInput,
}

impl GestureDetail {
    /// Build a payload from a kinematics snapshot.
    #[must_use]
    pub fn new(
        kind: DetailKind,
        is_tracking: bool,
        source: InputSource,
        kinematics: &Kinematics,
        raw_event: &RawInput,
    ) -> Self {
        Self {
            kind,
            is_tracking,
            source,
            start_x: kinematics.start.x,
            start_y: kinematics.start.y,
            current_x: kinematics.current.x,
            current_y: kinematics.current.y,
            delta_x: kinematics.delta_x,
            delta_y: kinematics.delta_y,
            velocity_x: kinematics.velocity_x,
            velocity_y: kinematics.velocity_y,
            touch_count: kinematics.touch_count,
            scale: kinematics.scale,
            rotation: kinematics.rotation,
            start_time: kinematics.start_time,
            current_time: kinematics.current_time,
            modifiers: raw_event.modifiers(),
            raw_event: raw_event.clone(),
        }
    }

    /// Same snapshot, relabeled for another callback.
    #[must_use]
    pub fn with_kind(mut self, kind: DetailKind) -> Self {
        self.kind = kind;
        self
    }

    /// Euclidean distance from the start centroid.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.delta_x.hypot(self.delta_y)
    }

    /// Milliseconds since the session started.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.current_time
            .saturating_duration_since(self.start_time)
            .as_secs_f64()
            * 1000.0
    }
}
