//! Integration tests for multi-touch kinematics and touch-count gating.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gestalt_core::{
    Arbiter, Bounds, DetailKind, Gesture, GestureDetail, GestureOptions, GestureState, InputPhase,
    RawInput, TouchPoint,
};
use web_time::Instant;

const EPS: f64 = 1e-9;

struct Touches {
    arbiter: Arbiter,
    surface: Rc<Bounds>,
    epoch: Instant,
    ms: RefCell<u64>,
}

impl Touches {
    fn new() -> Self {
        Self {
            arbiter: Arbiter::default(),
            surface: Rc::new(Bounds::from_size(500.0, 500.0)),
            epoch: Instant::now(),
            ms: RefCell::new(0),
        }
    }

    fn send(&self, phase: InputPhase, points: &[(u64, f64, f64)]) -> gestalt_core::DispatchOutcome {
        let t = {
            let mut ms = self.ms.borrow_mut();
            *ms += 16;
            self.epoch + Duration::from_millis(*ms)
        };
        let changed: Vec<TouchPoint> = points
            .iter()
            .map(|&(id, x, y)| TouchPoint::new(id, x, y))
            .collect();
        self.arbiter.dispatch(&RawInput::touch(phase, changed, t))
    }

    /// A live gesture recording every payload it receives.
    fn recorder(&self, options: GestureOptions) -> (Gesture, Rc<RefCell<Vec<GestureDetail>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (s, m, e) = (seen.clone(), seen.clone(), seen.clone());
        let g = self
            .arbiter
            .create_gesture(
                &self.surface,
                options
                    .on_start(move |d| s.borrow_mut().push(d.clone()))
                    .on_move(move |d| m.borrow_mut().push(d.clone()))
                    .on_end(move |d| e.borrow_mut().push(d.clone())),
            )
            .unwrap();
        g.init().unwrap();
        (g, seen)
    }
}

fn last(seen: &Rc<RefCell<Vec<GestureDetail>>>) -> GestureDetail {
    seen.borrow().last().cloned().unwrap()
}

// ── Scale / rotation ────────────────────────────────────────────────────

#[test]
fn unchanged_two_finger_sample_is_identity() {
    let rig = Touches::new();
    let (_g, seen) = rig.recorder(GestureOptions::new().with_touch_bounds(2, 2));
    rig.send(InputPhase::Start, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);
    rig.send(InputPhase::Move, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);

    let d = last(&seen);
    assert_eq!(d.touch_count, 2);
    assert!((d.scale - 1.0).abs() < EPS);
    assert!(d.rotation.abs() < EPS);
    assert_eq!(d.delta_x, 0.0);
    assert_eq!(d.delta_y, 0.0);
}

#[test]
fn pinch_out_doubles_scale() {
    let rig = Touches::new();
    let (_g, seen) = rig.recorder(GestureOptions::new().with_touch_bounds(2, 2));
    rig.send(InputPhase::Start, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);
    rig.send(InputPhase::Move, &[(1, 50.0, 100.0), (2, 250.0, 100.0)]);

    let d = last(&seen);
    assert!((d.scale - 2.0).abs() < EPS, "scale = {}", d.scale);
    assert!(d.rotation.abs() < EPS);
    assert!((d.current_x - 150.0).abs() < EPS, "centroid unchanged");
}

#[test]
fn quarter_turn_reports_ninety_degrees() {
    let rig = Touches::new();
    let (_g, seen) = rig.recorder(GestureOptions::new().with_touch_bounds(2, 2));
    rig.send(InputPhase::Start, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);
    rig.send(InputPhase::Move, &[(2, 100.0, 200.0)]);

    let d = last(&seen);
    assert!((d.rotation - 90.0).abs() < EPS, "rotation = {}", d.rotation);
    assert!((d.scale - 1.0).abs() < EPS);
}

#[test]
fn rotation_wraps_across_half_turn() {
    let rig = Touches::new();
    let (_g, seen) = rig.recorder(GestureOptions::new().with_touch_bounds(2, 2));
    rig.send(InputPhase::Start, &[(1, 100.0, 100.0), (2, 200.0, 110.0)]);
    rig.send(InputPhase::Move, &[(2, 0.0, 90.0)]);

    let d = last(&seen);
    assert!(d.rotation > -180.0 && d.rotation <= 180.0);
    assert!(d.rotation.abs() > 170.0, "rotation = {}", d.rotation);
}

#[test]
fn single_contact_reports_neutral_scale_and_rotation() {
    let rig = Touches::new();
    let (_g, seen) = rig.recorder(GestureOptions::new());
    rig.send(InputPhase::Start, &[(1, 100.0, 100.0)]);
    rig.send(InputPhase::Move, &[(1, 140.0, 130.0)]);
    let d = last(&seen);
    assert_eq!(d.scale, 1.0);
    assert_eq!(d.rotation, 0.0);
    assert_eq!((d.delta_x, d.delta_y), (40.0, 30.0));
}

#[test]
fn rotation_is_zero_once_reference_contact_lifts() {
    let rig = Touches::new();
    let (_g, seen) = rig.recorder(GestureOptions::new().with_touch_bounds(1, 3));
    rig.send(
        InputPhase::Start,
        &[(1, 100.0, 100.0), (2, 200.0, 100.0), (3, 150.0, 200.0)],
    );
    rig.send(InputPhase::End, &[(2, 200.0, 100.0)]);
    let d = last(&seen);
    assert_eq!(d.touch_count, 2);
    assert_eq!(d.rotation, 0.0);
}

#[test]
fn end_payload_carries_release_touch_count() {
    let rig = Touches::new();
    let (_g, seen) = rig.recorder(GestureOptions::new().with_touch_bounds(2, 2));
    rig.send(InputPhase::Start, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);
    let out = rig.send(InputPhase::End, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);
    assert!(out.session_ended);
    let d = last(&seen);
    assert_eq!(d.kind, DetailKind::End);
    assert!(!d.is_tracking);
    assert_eq!(d.touch_count, 2);
}

// ── Touch-count gating ──────────────────────────────────────────────────

#[test]
fn touch_count_disqualification_is_permanent() {
    let rig = Touches::new();
    let (two, two_seen) = rig.recorder(
        GestureOptions::new()
            .with_touch_bounds(2, 2)
            .with_threshold(50.0),
    );
    let (any, _) = rig.recorder(
        GestureOptions::new()
            .with_touch_bounds(1, 5)
            .with_threshold(50.0),
    );

    rig.send(InputPhase::Start, &[(1, 100.0, 100.0), (2, 120.0, 100.0)]);
    assert_eq!(two.state(), GestureState::Pending);

    rig.send(InputPhase::Start, &[(3, 110.0, 130.0)]);
    assert_eq!(two.state(), GestureState::Cancelled);

    rig.send(InputPhase::End, &[(3, 110.0, 130.0)]);
    let out = rig.send(InputPhase::Move, &[(1, 160.0, 100.0), (2, 180.0, 100.0)]);
    assert_eq!(out.captured, Some(any.id()));
    assert!(two_seen.borrow().is_empty());
}

#[test]
fn blocked_candidate_is_still_disqualified_by_touch_count() {
    let rig = Touches::new();
    let (pinch, seen) = rig.recorder(
        GestureOptions::new()
            .with_name("pinch")
            .with_touch_bounds(2, 2)
            .with_threshold(30.0),
    );
    let blocker = rig.arbiter.create_blocker(["pinch"]);

    rig.send(InputPhase::Start, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);
    blocker.block().unwrap();
    rig.send(InputPhase::Start, &[(3, 150.0, 150.0)]);
    assert_eq!(pinch.state(), GestureState::Cancelled);

    rig.send(InputPhase::End, &[(3, 150.0, 150.0)]);
    blocker.unblock().unwrap();
    let out = rig.send(InputPhase::Move, &[(1, 160.0, 100.0), (2, 260.0, 100.0)]);
    assert_eq!(out.captured, None);
    assert_eq!(pinch.state(), GestureState::Cancelled);
    assert!(seen.borrow().is_empty());
}

#[test]
fn initial_touch_count_gates_admission() {
    let rig = Touches::new();
    let (two, _) = rig.recorder(GestureOptions::new().with_touch_bounds(2, 2));

    // Fingers landing one at a time: the session starts with one touch.
    rig.send(InputPhase::Start, &[(1, 100.0, 100.0)]);
    rig.send(InputPhase::Start, &[(2, 200.0, 100.0)]);
    assert_eq!(two.state(), GestureState::Idle);
    rig.send(InputPhase::End, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);

    // Landing together: admitted and captured at once.
    let out = rig.send(InputPhase::Start, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);
    assert_eq!(out.captured, Some(two.id()));
}

#[test]
fn pinch_beats_pan_on_priority() {
    let rig = Touches::new();
    let (pan, _) = rig.recorder(GestureOptions::new().with_threshold(10.0));
    let (pinch, _) = rig.recorder(
        GestureOptions::new()
            .with_touch_bounds(2, 2)
            .with_priority(10)
            .can_start(|d| (d.scale - 1.0).abs() > 0.1),
    );

    rig.send(InputPhase::Start, &[(1, 100.0, 100.0), (2, 200.0, 100.0)]);
    // Spread symmetrically: the centroid stays put, so only the pinch qualifies.
    let out = rig.send(InputPhase::Move, &[(1, 80.0, 100.0), (2, 220.0, 100.0)]);
    assert_eq!(out.captured, Some(pinch.id()));
    assert_eq!(pan.state(), GestureState::Cancelled);
}
