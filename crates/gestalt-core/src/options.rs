#![forbid(unsafe_code)]

//! Gesture configuration.
//!
//! [`GestureOptions`] is a plain struct with documented defaults and
//! consuming builder methods. It is validated eagerly by
//! [`Arbiter::create_gesture`](crate::arbiter::Arbiter::create_gesture):
//! out-of-range values are rejected, never clamped.

use std::fmt;
use std::rc::Rc;

use crate::detail::GestureDetail;
use crate::error::{BoxError, GestureError, Result};

/// Callback receiving a gesture payload.
pub type DetailCallback = Rc<dyn Fn(&GestureDetail)>;

/// Capture predicate. `Ok(false)` defers capture to a later sample; `Err`
/// is reported and treated as `Ok(false)`.
pub type CanStartFn = Rc<dyn Fn(&GestureDetail) -> std::result::Result<bool, BoxError>>;

/// Axis filter applied to the activation threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Only horizontal movement counts: `|delta_x|`.
    X,
    /// Only vertical movement counts: `|delta_y|`.
    Y,
    /// Euclidean distance.
    #[default]
    All,
}

impl Direction {
    /// Movement magnitude along this axis filter.
    #[must_use]
    pub fn magnitude(self, delta_x: f64, delta_y: f64) -> f64 {
        match self {
            Self::X => delta_x.abs(),
            Self::Y => delta_y.abs(),
            Self::All => delta_x.hypot(delta_y),
        }
    }
}

/// Configuration of one gesture registration.
#[derive(Clone)]
pub struct GestureOptions {
    /// Display name; `None` generates `gesture-<id>`.
    pub name: Option<String>,
    /// Higher wins arbitration (default: 0).
    pub priority: i32,
    /// Distance the contact must travel before capture (default: 0.0).
    pub threshold: f64,
    /// Axis filter for `threshold` (default: [`Direction::All`]).
    pub direction: Direction,
    /// Inclusive lower touch-count bound (default: 1).
    pub min_touches: usize,
    /// Inclusive upper touch-count bound (default: unbounded).
    pub max_touches: usize,
    /// When false, events this gesture handles ask the host to suppress its
    /// default action (default: true).
    pub passive: bool,
    pub can_start: Option<CanStartFn>,
    pub on_start: Option<DetailCallback>,
    pub on_move: Option<DetailCallback>,
    pub on_end: Option<DetailCallback>,
    /// Fired when another gesture captured a session this one was competing for.
    pub on_not_captured: Option<DetailCallback>,
}

impl Default for GestureOptions {
    fn default() -> Self {
        Self {
            name: None,
            priority: 0,
            threshold: 0.0,
            direction: Direction::All,
            min_touches: 1,
            max_touches: usize::MAX,
            passive: true,
            can_start: None,
            on_start: None,
            on_move: None,
            on_end: None,
            on_not_captured: None,
        }
    }
}

impl fmt::Debug for GestureOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureOptions")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("threshold", &self.threshold)
            .field("direction", &self.direction)
            .field("min_touches", &self.min_touches)
            .field("max_touches", &self.max_touches)
            .field("passive", &self.passive)
            .field("can_start", &self.can_start.is_some())
            .field("on_start", &self.on_start.is_some())
            .field("on_move", &self.on_move.is_some())
            .field("on_end", &self.on_end.is_some())
            .field("on_not_captured", &self.on_not_captured.is_some())
            .finish()
    }
}

impl GestureOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set both touch-count bounds (inclusive).
    #[must_use]
    pub fn with_touch_bounds(mut self, min_touches: usize, max_touches: usize) -> Self {
        self.min_touches = min_touches;
        self.max_touches = max_touches;
        self
    }

    #[must_use]
    pub fn with_passive(mut self, passive: bool) -> Self {
        self.passive = passive;
        self
    }

    /// Infallible capture predicate.
    #[must_use]
    pub fn can_start(mut self, f: impl Fn(&GestureDetail) -> bool + 'static) -> Self {
        self.can_start = Some(Rc::new(move |d: &GestureDetail| Ok::<bool, BoxError>(f(d))));
        self
    }

    /// Fallible capture predicate.
    #[must_use]
    pub fn try_can_start<E>(
        mut self,
        f: impl Fn(&GestureDetail) -> std::result::Result<bool, E> + 'static,
    ) -> Self
    where
        E: Into<BoxError>,
    {
        self.can_start = Some(Rc::new(
            move |d: &GestureDetail| -> std::result::Result<bool, BoxError> {
                f(d).map_err(Into::into)
            },
        ));
        self
    }

    #[must_use]
    pub fn on_start(mut self, f: impl Fn(&GestureDetail) + 'static) -> Self {
        self.on_start = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_move(mut self, f: impl Fn(&GestureDetail) + 'static) -> Self {
        self.on_move = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_end(mut self, f: impl Fn(&GestureDetail) + 'static) -> Self {
        self.on_end = Some(Rc::new(f));
        self
    }

    #[must_use]
    pub fn on_not_captured(mut self, f: impl Fn(&GestureDetail) + 'static) -> Self {
        self.on_not_captured = Some(Rc::new(f));
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found.
    pub fn validate(&self) -> Result<()> {
        if self.name.as_deref().is_some_and(str::is_empty) {
            return Err(GestureError::EmptyName);
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(GestureError::InvalidThreshold {
                threshold: self.threshold,
            });
        }
        if self.min_touches == 0 {
            return Err(GestureError::ZeroMinTouches);
        }
        if self.max_touches < self.min_touches {
            return Err(GestureError::InvalidTouchBounds {
                min: self.min_touches,
                max: self.max_touches,
            });
        }
        Ok(())
    }

    /// Whether `touch_count` lies within the inclusive bounds.
    #[inline]
    #[must_use]
    pub fn admits_touches(&self, touch_count: usize) -> bool {
        (self.min_touches..=self.max_touches).contains(&touch_count)
    }
}

/// Coordinator tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbiterConfig {
    /// Samples kept per session for velocity (default: 8, minimum: 2).
    pub history_capacity: usize,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            history_capacity: crate::kinematics::DEFAULT_HISTORY_CAPACITY,
        }
    }
}
