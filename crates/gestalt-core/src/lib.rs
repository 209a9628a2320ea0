#![forbid(unsafe_code)]

//! Gesture recognition and capture arbitration for pointer and touch input.
//!
//! # Role
//! `gestalt-core` turns raw pointer and touch events into gesture callbacks.
//! Several recognizers may listen on the same or nested surfaces; for every
//! continuous contact session exactly one of them ends up in control.
//!
//! # Primary responsibilities
//! - **Normalization**: pointer and multi-touch events become uniform
//!   samples of stable contact ids ([`normalize`]).
//! - **Kinematics**: centroid, delta, velocity, scale and rotation derived
//!   from a session's samples ([`kinematics`]).
//! - **Gating**: touch-count bounds, axis-filtered threshold and the
//!   `can_start` predicate ([`gating`]).
//! - **Arbitration**: per-session candidate sets, priority resolution with
//!   registration-order tie-break, capture notifications ([`arbiter`]).
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use gestalt_core::{Arbiter, Bounds, Direction, GestureOptions, InputPhase, RawInput};
//! use web_time::Instant;
//!
//! let arbiter = Arbiter::default();
//! let surface = Rc::new(Bounds::from_size(320.0, 240.0));
//! let swipe = arbiter
//!     .create_gesture(
//!         &surface,
//!         GestureOptions::new()
//!             .with_name("swipe")
//!             .with_threshold(10.0)
//!             .with_direction(Direction::X)
//!             .on_end(|d| println!("released at dx={}", d.delta_x)),
//!     )
//!     .unwrap();
//! swipe.init().unwrap();
//!
//! let t = Instant::now();
//! arbiter.dispatch(&RawInput::pointer(InputPhase::Start, 10.0, 10.0, t));
//! let out = arbiter.dispatch(&RawInput::pointer(InputPhase::Move, 30.0, 12.0, t));
//! assert_eq!(out.captured, Some(swipe.id()));
//! ```

pub mod arbiter;
pub mod blocker;
pub mod capture;
pub mod detail;
pub mod error;
pub mod event;
pub mod gating;
pub mod geometry;
pub mod gesture;
pub mod kinematics;
pub mod normalize;
pub mod options;

#[cfg(feature = "tracing-json")]
pub mod logging;

pub use arbiter::{Arbiter, DispatchOutcome, PredicateFault};
pub use blocker::Blocker;
pub use capture::{CaptureNotice, CaptureTransition, Subscription};
pub use detail::{DetailKind, GestureDetail};
pub use error::{BoxError, GestureError, Result};
pub use event::{InputPhase, InputSource, Modifiers, PointerEvent, RawInput, TouchEvent, TouchId, TouchPoint};
pub use geometry::{Bounds, Point, Surface};
pub use gesture::{Gesture, GestureId, GestureState};
pub use kinematics::Kinematics;
pub use options::{ArbiterConfig, Direction, GestureOptions};
