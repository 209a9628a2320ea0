#![forbid(unsafe_code)]

//! Activation gating: decides whether a pending gesture may bid for capture.
//!
//! Three checks run in order on every sample:
//!
//! 1. **Touch count**: outside `[min_touches, max_touches]` disqualifies the
//!    gesture for the rest of the session.
//! 2. **Threshold**: the axis-filtered movement must reach `threshold`.
//! 3. **Predicate**: `can_start`, if present, must return `Ok(true)`. A
//!    `false` or an error only defers; the next sample re-evaluates.
//!
//! The predicate is split out from [`precheck`] so the arbiter can run user
//! code without holding its own state borrowed.

use crate::detail::GestureDetail;
use crate::error::BoxError;
use crate::kinematics::Kinematics;
use crate::options::{CanStartFn, GestureOptions};

/// Outcome of the checks that need no user code.
#[derive(Clone)]
pub enum Precheck {
    /// Touch count out of bounds; remove from the candidate set.
    Disqualified,
    /// Not moved far enough yet.
    BelowThreshold,
    /// Passed; the predicate decides.
    NeedsPredicate(CanStartFn),
    /// Passed and there is no predicate.
    Ready,
}

impl std::fmt::Debug for Precheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disqualified => f.write_str("Disqualified"),
            Self::BelowThreshold => f.write_str("BelowThreshold"),
            Self::NeedsPredicate(_) => f.write_str("NeedsPredicate"),
            Self::Ready => f.write_str("Ready"),
        }
    }
}

/// Outcome of the `can_start` predicate.
#[derive(Debug)]
pub enum PredicateVerdict {
    Satisfied,
    Deferred,
    Faulted(BoxError),
}

/// Whether the axis-filtered movement reached the threshold.
#[inline]
#[must_use]
pub fn threshold_reached(options: &GestureOptions, kinematics: &Kinematics) -> bool {
    options
        .direction
        .magnitude(kinematics.delta_x, kinematics.delta_y)
        >= options.threshold
}

/// Run the touch-count and threshold checks.
#[must_use]
pub fn precheck(options: &GestureOptions, kinematics: &Kinematics) -> Precheck {
    if !options.admits_touches(kinematics.touch_count) {
        return Precheck::Disqualified;
    }
    if !threshold_reached(options, kinematics) {
        return Precheck::BelowThreshold;
    }
    match &options.can_start {
        Some(predicate) => Precheck::NeedsPredicate(predicate.clone()),
        None => Precheck::Ready,
    }
}

/// Invoke a `can_start` predicate.
#[must_use]
pub fn run_predicate(predicate: &CanStartFn, detail: &GestureDetail) -> PredicateVerdict {
    match predicate(detail) {
        Ok(true) => PredicateVerdict::Satisfied,
        Ok(false) => PredicateVerdict::Deferred,
        Err(err) => PredicateVerdict::Faulted(err),
    }
}
