#![forbid(unsafe_code)]

//! Raw pointer input, as delivered by the host event dispatcher.
//!
//! # Design Notes
//!
//! - A pointing device (mouse, pen) reports one position per event.
//! - A touch stream reports the touches that *changed* in each event. Hosts
//!   that also know which touches are still down attach that list, and the
//!   normalizer drops any tracked touch missing from it, which recovers from
//!   a lost release.
//! - Every event carries the host timestamp so that velocity is computed
//!   from input time, not from processing time.

use bitflags::bitflags;
use web_time::Instant;

use crate::geometry::Point;

/// Host-assigned identifier of one physical touch.
pub type TouchId = u64;

/// Which input stream an event belongs to.
///
/// The arbiter keeps at most one live session per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputSource {
    /// The single pointing device (mouse or pen).
    Pointer,
    /// The multi-touch stream.
    Touch,
}

/// Lifecycle phase of a raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputPhase {
    /// Contact began (button pressed, finger landed).
    Start,
    /// Contact moved.
    Move,
    /// Contact released.
    End,
    /// The host interrupted the interaction (blur, lost capture, ...).
    Cancel,
}

impl InputPhase {
    /// Returns true for `End` and `Cancel`.
    #[must_use]
    pub const fn is_release(self) -> bool {
        matches!(self, Self::End | Self::Cancel)
    }
}

bitflags! {
    /// Keyboard modifiers held while the event was reported. Copied into
    /// every [`GestureDetail`](crate::detail::GestureDetail) so predicates
    /// can require, say, a ctrl-drag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
    }
}

/// One touch reported by a touch event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: TouchId,
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    /// Create a touch point.
    #[must_use]
    pub const fn new(id: TouchId, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    /// Position as a [`Point`].
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// An event from the pointing device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: InputPhase,
    pub x: f64,
    pub y: f64,
    pub modifiers: Modifiers,
    pub time: Instant,
}

impl PointerEvent {
    /// Create a pointer event without modifiers.
    #[must_use]
    pub const fn new(phase: InputPhase, x: f64, y: f64, time: Instant) -> Self {
        Self {
            phase,
            x,
            y,
            modifiers: Modifiers::empty(),
            time,
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// An event from the touch stream.
///
/// `changed` lists the touches this event is about: the ones that landed
/// (`Start`), moved (`Move`) or lifted (`End`/`Cancel`). `still_down`, when
/// present, is every touch on the surface after the event.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub phase: InputPhase,
    pub changed: Vec<TouchPoint>,
    pub still_down: Option<Vec<TouchPoint>>,
    pub modifiers: Modifiers,
    pub time: Instant,
}

impl TouchEvent {
    /// Create a touch event without modifiers.
    #[must_use]
    pub fn new(phase: InputPhase, changed: impl Into<Vec<TouchPoint>>, time: Instant) -> Self {
        Self {
            phase,
            changed: changed.into(),
            still_down: None,
            modifiers: Modifiers::empty(),
            time,
        }
    }

    /// Attach the list of touches still down after this event.
    #[must_use]
    pub fn with_still_down(mut self, touches: impl Into<Vec<TouchPoint>>) -> Self {
        self.still_down = Some(touches.into());
        self
    }

    /// Attach modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A raw input event handed to [`Arbiter::dispatch`](crate::arbiter::Arbiter::dispatch).
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Pointer(PointerEvent),
    Touch(TouchEvent),
}

impl RawInput {
    /// Shorthand for a pointer event.
    #[must_use]
    pub fn pointer(phase: InputPhase, x: f64, y: f64, time: Instant) -> Self {
        Self::Pointer(PointerEvent::new(phase, x, y, time))
    }

    /// Shorthand for a touch event.
    #[must_use]
    pub fn touch(phase: InputPhase, changed: impl Into<Vec<TouchPoint>>, time: Instant) -> Self {
        Self::Touch(TouchEvent::new(phase, changed, time))
    }

    /// The stream this event belongs to.
    #[must_use]
    pub const fn source(&self) -> InputSource {
        match self {
            Self::Pointer(_) => InputSource::Pointer,
            Self::Touch(_) => InputSource::Touch,
        }
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> InputPhase {
        match self {
            Self::Pointer(ev) => ev.phase,
            Self::Touch(ev) => ev.phase,
        }
    }

    /// Host timestamp.
    #[must_use]
    pub const fn time(&self) -> Instant {
        match self {
            Self::Pointer(ev) => ev.time,
            Self::Touch(ev) => ev.time,
        }
    }

    /// Modifier keys held during the event.
    #[must_use]
    pub const fn modifiers(&self) -> Modifiers {
        match self {
            Self::Pointer(ev) => ev.modifiers,
            Self::Touch(ev) => ev.modifiers,
        }
    }
}
