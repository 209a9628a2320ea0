#![no_main]

use std::rc::Rc;
use std::time::Duration;

use arbitrary::Arbitrary;
use gestalt_core::{
    Arbiter, ArbiterConfig, Bounds, Direction, GestureOptions, GestureState, InputPhase, InputSource,
    RawInput, TouchPoint,
};
use libfuzzer_sys::fuzz_target;
use web_time::Instant;

#[derive(Debug, Arbitrary)]
struct Registration {
    priority: i8,
    threshold: u8,
    axis: u8,
    min_touches: u8,
    extra_touches: u8,
    left_half: bool,
    passive: bool,
}

#[derive(Debug, Arbitrary)]
enum Step {
    Pointer { phase: u8, x: i16, y: i16 },
    Touch { phase: u8, touches: Vec<(u8, i16, i16)> },
    Wait(u8),
    Destroy(u8),
    Toggle(u8),
    Block(bool),
}

#[derive(Debug, Arbitrary)]
struct Script {
    history: u8,
    registrations: Vec<Registration>,
    steps: Vec<Step>,
}

fn phase(raw: u8) -> InputPhase {
    match raw % 4 {
        0 => InputPhase::Start,
        1 => InputPhase::Move,
        2 => InputPhase::End,
        _ => InputPhase::Cancel,
    }
}

fuzz_target!(|script: Script| {
    let arbiter = Arbiter::new(ArbiterConfig {
        history_capacity: usize::from(script.history % 16),
    });
    let full = Rc::new(Bounds::new(-500.0, -500.0, 1000.0, 1000.0));
    let left = Rc::new(Bounds::new(-500.0, -500.0, 500.0, 1000.0));

    let mut gestures = Vec::new();
    for (i, r) in script.registrations.iter().take(8).enumerate() {
        let min = usize::from(r.min_touches % 4);
        let options = GestureOptions::new()
            .with_name(if i % 2 == 0 { "even" } else { "odd" })
            .with_priority(i32::from(r.priority))
            .with_threshold(f64::from(r.threshold))
            .with_direction(match r.axis % 3 {
                0 => Direction::X,
                1 => Direction::Y,
                _ => Direction::All,
            })
            .with_touch_bounds(min, min + usize::from(r.extra_touches % 3))
            .with_passive(r.passive)
            .on_move(|d| assert!(d.velocity_x.is_finite() && d.velocity_y.is_finite()))
            .on_end(|d| assert!(!d.is_tracking));
        let surface = if r.left_half { &left } else { &full };
        // min_touches == 0 must be rejected, never clamped.
        match arbiter.create_gesture(surface, options) {
            Ok(g) => {
                assert!(min > 0);
                let _ = g.init();
                gestures.push(g);
            }
            Err(err) => assert!(err.is_config()),
        }
    }

    let blocker = arbiter.create_blocker(["odd"]);
    let mut now = Instant::now();
    for step in script.steps.iter().take(256) {
        match step {
            Step::Pointer { phase: p, x, y } => {
                let before = arbiter.captured_by(InputSource::Pointer);
                let out = arbiter.dispatch(&RawInput::pointer(phase(*p), f64::from(*x), f64::from(*y), now));
                if out.captured.is_some() {
                    assert_eq!(before, None);
                }
            }
            Step::Touch { phase: p, touches } => {
                let changed: Vec<TouchPoint> = touches
                    .iter()
                    .take(6)
                    .map(|&(id, x, y)| TouchPoint::new(u64::from(id % 6), f64::from(x), f64::from(y)))
                    .collect();
                let before = arbiter.captured_by(InputSource::Touch);
                let out = arbiter.dispatch(&RawInput::touch(phase(*p), changed, now));
                if out.captured.is_some() {
                    assert_eq!(before, None);
                }
            }
            Step::Wait(ms) => now += Duration::from_millis(u64::from(*ms)),
            Step::Destroy(i) => {
                if !gestures.is_empty() {
                    let _ = gestures[usize::from(*i) % gestures.len()].destroy();
                }
            }
            Step::Toggle(i) => {
                if !gestures.is_empty() {
                    let g = &gestures[usize::from(*i) % gestures.len()];
                    let _ = g.enable(!g.is_enabled());
                }
            }
            Step::Block(on) => {
                let _ = if *on { blocker.block() } else { blocker.unblock() };
            }
        }

        let active = gestures
            .iter()
            .filter(|g| g.state() == GestureState::Active)
            .count();
        assert!(active <= arbiter.session_count());
        assert!(arbiter.session_count() <= 2);
    }
});
