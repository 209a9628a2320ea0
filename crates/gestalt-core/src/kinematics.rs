#![forbid(unsafe_code)]

//! Session kinematics: position, delta, velocity, scale and rotation.
//!
//! Every quantity is derived from the session's start sample (or its
//! multi-touch reference sample) and the latest samples; nothing is
//! accumulated incrementally, so long sessions do not drift.
//!
//! # Invariants
//!
//! 1. `delta` is `current - start`, signed, and never reset while the session lives.
//! 2. Velocity uses only the two most recent samples and is exactly `0.0` when
//!    fewer than two samples exist or no time elapsed between them.
//! 3. With fewer than two contacts, `scale == 1.0` and `rotation == 0.0`.
//! 4. No field is ever NaN for finite input.

use std::collections::VecDeque;

use web_time::Instant;

use crate::event::TouchId;
use crate::geometry::Point;
use crate::normalize::Sample;

/// Default number of samples kept per session.
pub const DEFAULT_HISTORY_CAPACITY: usize = 8;

/// Kinematics snapshot of a session at one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Centroid of the start sample.
    pub start: Point,
    /// Centroid of the current sample.
    pub current: Point,
    pub delta_x: f64,
    pub delta_y: f64,
    /// Instantaneous velocity, distance units per millisecond.
    pub velocity_x: f64,
    /// Instantaneous velocity, distance units per millisecond.
    pub velocity_y: f64,
    pub touch_count: usize,
    /// Mean pairwise contact distance now over the same at the reference sample.
    pub scale: f64,
    /// Signed rotation in degrees, in `(-180, 180]`.
    pub rotation: f64,
    pub start_time: Instant,
    pub current_time: Instant,
}

/// Reference for scale and rotation: the first sample with two or more contacts.
#[derive(Debug, Clone, PartialEq)]
struct MultiTouchReference {
    mean_distance: f64,
    pair: (TouchId, TouchId),
    angle: f64,
}

impl MultiTouchReference {
    fn from_sample(sample: &Sample) -> Option<Self> {
        let mean_distance = sample.mean_pairwise_distance()?;
        let a = sample.contacts[0];
        let b = sample.contacts[1];
        Some(Self {
            mean_distance,
            pair: (a.id, b.id),
            angle: a.position.angle_to(b.position),
        })
    }
}

/// Rolling sample history of one session.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    start: Sample,
    start_centroid: Point,
    reference: Option<MultiTouchReference>,
    recent: VecDeque<Sample>,
    capacity: usize,
}

impl SampleHistory {
    /// Start a history from the session's first sample.
    ///
    /// Returns `None` when the sample has no contacts. `capacity` is clamped
    /// to at least two so velocity always has a previous sample to use.
    #[must_use]
    pub fn new(start: Sample, capacity: usize) -> Option<Self> {
        let start_centroid = start.centroid()?;
        let capacity = capacity.max(2);
        let reference = MultiTouchReference::from_sample(&start);
        let mut recent = VecDeque::with_capacity(capacity);
        recent.push_back(start.clone());
        Some(Self {
            start,
            start_centroid,
            reference,
            recent,
            capacity,
        })
    }

    /// Append a sample. Samples without contacts are ignored.
    pub fn push(&mut self, sample: Sample) {
        if sample.contacts.is_empty() {
            return;
        }
        if self.reference.is_none() {
            self.reference = MultiTouchReference::from_sample(&sample);
        }
        if self.recent.len() == self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(sample);
    }

    /// The session's first sample.
    #[must_use]
    pub fn start(&self) -> &Sample {
        &self.start
    }

    /// The most recent sample.
    #[must_use]
    pub fn latest(&self) -> &Sample {
        self.recent.back().unwrap_or(&self.start)
    }

    /// Number of samples currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    /// Whether the rolling window is empty. Never true after `new`, which
    /// seeds it with the start sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    /// Compute the kinematics at the latest sample.
    #[must_use]
    pub fn kinematics(&self) -> Kinematics {
        let latest = self.latest();
        let current = latest.centroid().unwrap_or(self.start_centroid);
        let (velocity_x, velocity_y) = self.velocity();
        Kinematics {
            start: self.start_centroid,
            current,
            delta_x: current.x - self.start_centroid.x,
            delta_y: current.y - self.start_centroid.y,
            velocity_x,
            velocity_y,
            touch_count: latest.touch_count(),
            scale: self.scale(latest),
            rotation: self.rotation(latest),
            start_time: self.start.time,
            current_time: latest.time,
        }
    }

    fn velocity(&self) -> (f64, f64) {
        let n = self.recent.len();
        if n < 2 {
            return (0.0, 0.0);
        }
        let prev = &self.recent[n - 2];
        let last = &self.recent[n - 1];
        let elapsed_ms = last.time.saturating_duration_since(prev.time).as_secs_f64() * 1000.0;
        if elapsed_ms <= 0.0 {
            return (0.0, 0.0);
        }
        let (Some(a), Some(b)) = (prev.centroid(), last.centroid()) else {
            return (0.0, 0.0);
        };
        ((b.x - a.x) / elapsed_ms, (b.y - a.y) / elapsed_ms)
    }

    fn scale(&self, latest: &Sample) -> f64 {
        let Some(reference) = &self.reference else {
            return 1.0;
        };
        match latest.mean_pairwise_distance() {
            Some(now) if reference.mean_distance > 0.0 => now / reference.mean_distance,
            _ => 1.0,
        }
    }

    fn rotation(&self, latest: &Sample) -> f64 {
        let Some(reference) = &self.reference else {
            return 0.0;
        };
        if latest.touch_count() < 2 {
            return 0.0;
        }
        let (Some(a), Some(b)) = (latest.contact(reference.pair.0), latest.contact(reference.pair.1))
        else {
            return 0.0;
        };
        let angle = a.position.angle_to(b.position);
        normalize_degrees((angle - reference.angle).to_degrees())
    }
}

/// Wrap an angle in degrees into `(-180, 180]`.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
