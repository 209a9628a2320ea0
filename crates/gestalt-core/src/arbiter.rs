#![forbid(unsafe_code)]

//! Capture arbitration.
//!
//! The [`Arbiter`] owns every registration, the live input sessions and the
//! capture slot of each session. Hosts construct one explicitly and feed it
//! raw input through [`Arbiter::dispatch`]; independent arbiters never share
//! state, so tests create one per case.
//!
//! # Sessions
//!
//! At most one session lives per [`InputSource`]. A session starts when the
//! first contact of that source goes down and ends when the last one is
//! released or the host cancels it. At start, every live registration whose
//! surface contains the start centroid and whose touch bounds admit the
//! initial touch count becomes a candidate, in `init()` order.
//!
//! # Resolution
//!
//! Start and move samples are evaluation ticks. On each tick with an empty
//! capture slot, every candidate that passes gating bids. The highest
//! priority wins, ties go to the earliest `init()`, and the remaining
//! candidates are cancelled for the rest of the session. Once a slot is
//! filled, samples go to the holder only. Subscribers hear about the capture
//! and, later, about how the holder let go of it.
//!
//! # Re-entrancy
//!
//! User code (predicates, callbacks, capture observers) never runs while the
//! arbiter's state is borrowed. Bookkeeping for a tick is committed first,
//! so a callback may create, destroy or disable gestures, or panic, without
//! leaving the arbiter inconsistent.

use std::cell::RefCell;
use std::cmp::Reverse;
use std::rc::{Rc, Weak};

use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;
use tracing::{debug, debug_span, error, trace};

use crate::blocker::Blocker;
use crate::capture::{CaptureChannel, CaptureNotice, CaptureTransition, PendingNotice, Subscription};
use crate::detail::{DetailKind, GestureDetail};
use crate::error::{GestureError, Result};
use crate::event::{InputPhase, InputSource, RawInput};
use crate::gating::{self, Precheck, PredicateVerdict};
use crate::geometry::Surface;
use crate::gesture::{Gesture, GestureId, GestureState};
use crate::kinematics::SampleHistory;
use crate::normalize::{NormalizedInput, PointerNormalizer};
use crate::options::{ArbiterConfig, CanStartFn, DetailCallback, GestureOptions};

/// A `can_start` predicate that returned an error during a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateFault {
    pub gesture: GestureId,
    pub name: String,
    pub message: String,
}

/// What happened to one dispatched event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The event carried nothing usable (hover move, unknown touch, ...).
    pub ignored: bool,
    pub session_started: bool,
    pub session_ended: bool,
    /// Gesture that captured the session on this event.
    pub captured: Option<GestureId>,
    /// Gesture whose callback received this event.
    pub delivered_to: Option<GestureId>,
    /// The event went to a non-passive gesture; the host should suppress
    /// its default handling.
    pub prevent_default: bool,
    pub predicate_faults: Vec<PredicateFault>,
}

impl DispatchOutcome {
    fn ignored() -> Self {
        Self {
            ignored: true,
            ..Self::default()
        }
    }
}

/// Arbiter-side record of one gesture.
pub(crate) struct Registration {
    name: String,
    options: GestureOptions,
    surface: Weak<dyn Surface>,
    state: GestureState,
    init_order: Option<u64>,
    enabled: bool,
    session: Option<InputSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureSlot {
    Empty,
    Held(GestureId),
    /// The holder was destroyed or disabled; the session stays captured so
    /// nobody else can take it.
    Abandoned(GestureId),
}

struct Session {
    history: SampleHistory,
    /// Everyone admitted at start, for the state reset at session end.
    participants: SmallVec<[GestureId; 8]>,
    /// Still eligible to capture, in `init()` order. Only ever shrinks.
    candidates: SmallVec<[GestureId; 8]>,
    slot: CaptureSlot,
}

struct BlockerEntry {
    names: AHashSet<String>,
    active: bool,
}

/// A candidate that passed the touch-count and threshold checks.
struct Bidder {
    id: GestureId,
    name: String,
    predicate: Option<CanStartFn>,
}

/// Result of resolving a tick's bids.
struct Resolution {
    notice: CaptureNotice,
    passive: bool,
    on_start: Option<DetailCallback>,
    not_captured: Vec<DetailCallback>,
}

/// User code to run once the borrow is released.
enum Work {
    None,
    Deliver {
        callback: Option<DetailCallback>,
        detail: GestureDetail,
    },
    Gate {
        source: InputSource,
        detail: GestureDetail,
        bidders: Vec<Bidder>,
    },
}

struct Tick {
    outcome: DispatchOutcome,
    work: Work,
    /// Broadcast after `work` runs.
    released: Option<CaptureNotice>,
}

impl Tick {
    fn new(outcome: DispatchOutcome, work: Work) -> Self {
        Self {
            outcome,
            work,
            released: None,
        }
    }
}

pub(crate) struct ArbiterInner {
    config: ArbiterConfig,
    registrations: AHashMap<GestureId, Registration>,
    next_id: u64,
    next_init_order: u64,
    sessions: AHashMap<InputSource, Session>,
    normalizer: PointerNormalizer,
    blockers: AHashMap<u64, BlockerEntry>,
    next_blocker: u64,
    captures: Rc<CaptureChannel>,
}

impl ArbiterInner {
    fn new(config: ArbiterConfig, captures: Rc<CaptureChannel>) -> Self {
        Self {
            config,
            registrations: AHashMap::new(),
            next_id: 1,
            next_init_order: 0,
            sessions: AHashMap::new(),
            normalizer: PointerNormalizer::new(),
            blockers: AHashMap::new(),
            next_blocker: 1,
            captures,
        }
    }

    // --- Registration lifecycle ---

    pub(crate) fn init_gesture(&mut self, id: GestureId, name: &str) -> Result<()> {
        let order = self.next_init_order;
        let reg = self.registration_mut(id, name)?;
        if reg.state == GestureState::Inert {
            reg.state = GestureState::Idle;
            reg.init_order = Some(order);
            self.next_init_order += 1;
            debug!(gesture = %id, name, "gesture initialized");
        }
        Ok(())
    }

    /// Drop a registration. The caller drops the returned record and sends
    /// the notice once the arbiter is no longer borrowed.
    pub(crate) fn remove_gesture(
        &mut self,
        id: GestureId,
        name: &str,
    ) -> Result<(Registration, Option<PendingNotice>)> {
        let reg = self
            .registrations
            .remove(&id)
            .ok_or_else(|| GestureError::AlreadyDestroyed {
                name: name.to_owned(),
            })?;
        let notice = reg
            .session
            .and_then(|source| self.detach(id, source, &reg.name, reg.options.priority));
        debug!(gesture = %id, name, "gesture destroyed");
        Ok((reg, notice))
    }

    pub(crate) fn enable_gesture(
        &mut self,
        id: GestureId,
        name: &str,
        enabled: bool,
    ) -> Result<Option<PendingNotice>> {
        let reg = self.registration_mut(id, name)?;
        if reg.enabled == enabled {
            return Ok(None);
        }
        reg.enabled = enabled;
        let withdraw = if enabled { None } else { reg.session };
        let priority = reg.options.priority;
        let mut notice = None;
        if let Some(source) = withdraw {
            reg.state = GestureState::Cancelled;
            notice = self.detach(id, source, name, priority);
        }
        debug!(gesture = %id, name, enabled, "gesture enable changed");
        Ok(notice)
    }

    pub(crate) fn gesture_enabled(&self, id: GestureId) -> bool {
        self.registrations.get(&id).is_some_and(|r| r.enabled)
    }

    pub(crate) fn gesture_state(&self, id: GestureId) -> GestureState {
        self.registrations
            .get(&id)
            .map_or(GestureState::Destroyed, |r| r.state)
    }

    fn registration_mut(&mut self, id: GestureId, name: &str) -> Result<&mut Registration> {
        self.registrations
            .get_mut(&id)
            .ok_or_else(|| GestureError::AlreadyDestroyed {
                name: name.to_owned(),
            })
    }

    /// Withdraw a gesture from the session it takes part in. Returns the
    /// release notice when it was holding the capture.
    fn detach(
        &mut self,
        id: GestureId,
        source: InputSource,
        name: &str,
        priority: i32,
    ) -> Option<PendingNotice> {
        let session = self.sessions.get_mut(&source)?;
        session.candidates.retain(|c| *c != id);
        if session.slot != CaptureSlot::Held(id) {
            return None;
        }
        session.slot = CaptureSlot::Abandoned(id);
        debug!(gesture = %id, ?source, "capture abandoned; session swallowed until release");
        let notice = CaptureNotice {
            transition: CaptureTransition::Abandoned,
            gesture: id,
            name: name.to_owned(),
            source,
            priority,
            bids: 0,
        };
        Some(PendingNotice::new(self.captures.clone(), notice))
    }

    // --- Blockers ---

    pub(crate) fn add_blocker(&mut self, names: AHashSet<String>) -> u64 {
        let id = self.next_blocker;
        self.next_blocker += 1;
        self.blockers.insert(
            id,
            BlockerEntry {
                names,
                active: false,
            },
        );
        id
    }

    pub(crate) fn set_blocking(&mut self, blocker: u64, active: bool) -> Result<()> {
        let entry = self
            .blockers
            .get_mut(&blocker)
            .ok_or(GestureError::BlockerDestroyed)?;
        entry.active = active;
        trace!(blocker, active, "blocker changed");
        Ok(())
    }

    pub(crate) fn blocking(&self, blocker: u64) -> bool {
        self.blockers.get(&blocker).is_some_and(|b| b.active)
    }

    pub(crate) fn remove_blocker(&mut self, blocker: u64) -> Result<()> {
        self.blockers
            .remove(&blocker)
            .map(drop)
            .ok_or(GestureError::BlockerDestroyed)
    }

    fn is_blocked(&self, name: &str) -> bool {
        self.blockers
            .values()
            .any(|b| b.active && b.names.contains(name))
    }

    // --- Dispatch ---

    /// Apply one raw event to the session state. Runs no user code.
    fn advance(&mut self, input: &RawInput) -> Option<Tick> {
        let Some(NormalizedInput {
            source,
            phase,
            sample,
            ends_session,
        }) = self.normalizer.normalize(input)
        else {
            trace!("event carried no usable contacts; ignored");
            return None;
        };

        let mut outcome = DispatchOutcome::default();
        if !self.sessions.contains_key(&source) {
            if ends_session {
                trace!(?source, ?phase, "release without a live session; ignored");
                return None;
            }
            let session = self.begin_session(source, sample)?;
            self.sessions.insert(source, session);
            outcome.session_started = true;
        } else if let Some(session) = self.sessions.get_mut(&source) {
            session.history.push(sample);
        }

        if ends_session {
            let session = self.sessions.remove(&source)?;
            outcome.session_ended = true;
            return Some(self.end_session(source, phase, session, input, outcome));
        }

        let session = self.sessions.get(&source)?;
        let kinematics = session.history.kinematics();
        let slot = session.slot;
        match slot {
            CaptureSlot::Held(holder) => {
                let reg = self.registrations.get(&holder)?;
                outcome.delivered_to = Some(holder);
                outcome.prevent_default = !reg.options.passive;
                let detail = GestureDetail::new(DetailKind::Move, true, source, &kinematics, input);
                Some(Tick::new(
                    outcome,
                    Work::Deliver {
                        callback: reg.options.on_move.clone(),
                        detail,
                    },
                ))
            }
            CaptureSlot::Abandoned(_) => Some(Tick::new(outcome, Work::None)),
            CaptureSlot::Empty => {
                let bidders = self.gate(source, &kinematics);
                let work = if bidders.is_empty() {
                    Work::None
                } else {
                    Work::Gate {
                        source,
                        detail: GestureDetail::new(DetailKind::Start, true, source, &kinematics, input),
                        bidders,
                    }
                };
                Some(Tick::new(outcome, work))
            }
        }
    }

    fn begin_session(&mut self, source: InputSource, sample: crate::normalize::Sample) -> Option<Session> {
        let touches = sample.touch_count();
        let origin = sample.centroid()?;
        let history = SampleHistory::new(sample, self.config.history_capacity)?;

        let mut admitted: Vec<(u64, GestureId)> = self
            .registrations
            .iter()
            .filter(|(_, reg)| {
                reg.state == GestureState::Idle
                    && reg.enabled
                    && reg.options.admits_touches(touches)
                    && reg.surface.upgrade().is_some_and(|s| s.contains(origin))
            })
            .filter(|(_, reg)| !self.is_blocked(&reg.name))
            .filter_map(|(id, reg)| reg.init_order.map(|order| (order, *id)))
            .collect();
        admitted.sort_unstable();

        let candidates: SmallVec<[GestureId; 8]> = admitted.into_iter().map(|(_, id)| id).collect();
        for id in &candidates {
            if let Some(reg) = self.registrations.get_mut(id) {
                reg.state = GestureState::Pending;
                reg.session = Some(source);
            }
        }
        debug!(?source, touches, candidates = candidates.len(), "session began");
        Some(Session {
            history,
            participants: candidates.clone(),
            candidates,
            slot: CaptureSlot::Empty,
        })
    }

    fn end_session(
        &mut self,
        source: InputSource,
        phase: InputPhase,
        session: Session,
        input: &RawInput,
        mut outcome: DispatchOutcome,
    ) -> Tick {
        for id in &session.participants {
            if let Some(reg) = self.registrations.get_mut(id) {
                if reg.state.in_session() {
                    reg.state = GestureState::Idle;
                }
                reg.session = None;
            }
        }
        debug!(?source, slot = ?session.slot, "session ended");

        let CaptureSlot::Held(holder) = session.slot else {
            return Tick::new(outcome, Work::None);
        };
        let Some(reg) = self.registrations.get(&holder) else {
            return Tick::new(outcome, Work::None);
        };
        outcome.delivered_to = Some(holder);
        outcome.prevent_default = !reg.options.passive;
        let kinematics = session.history.kinematics();
        let transition = if phase == InputPhase::Cancel {
            CaptureTransition::Cancelled
        } else {
            CaptureTransition::Released
        };
        Tick {
            outcome,
            work: Work::Deliver {
                callback: reg.options.on_end.clone(),
                detail: GestureDetail::new(DetailKind::End, false, source, &kinematics, input),
            },
            released: Some(CaptureNotice {
                transition,
                gesture: holder,
                name: reg.name.clone(),
                source,
                priority: reg.options.priority,
                bids: 0,
            }),
        }
    }

    /// Run the checks that need no user code. Disqualified candidates are
    /// removed here; the rest that passed are returned in `init()` order.
    fn gate(&mut self, source: InputSource, kinematics: &crate::kinematics::Kinematics) -> Vec<Bidder> {
        let Some(session) = self.sessions.get(&source) else {
            return Vec::new();
        };
        let mut bidders = Vec::new();
        let mut disqualified: SmallVec<[GestureId; 4]> = SmallVec::new();
        for id in &session.candidates {
            let Some(reg) = self.registrations.get(id) else {
                continue;
            };
            let verdict = gating::precheck(&reg.options, kinematics);
            if matches!(verdict, Precheck::Disqualified) {
                disqualified.push(*id);
                continue;
            }
            // Held back from bidding only; the touch-count check above
            // still applies.
            if !reg.enabled || self.is_blocked(&reg.name) {
                continue;
            }
            match verdict {
                Precheck::Disqualified | Precheck::BelowThreshold => {}
                Precheck::NeedsPredicate(predicate) => bidders.push(Bidder {
                    id: *id,
                    name: reg.name.clone(),
                    predicate: Some(predicate),
                }),
                Precheck::Ready => bidders.push(Bidder {
                    id: *id,
                    name: reg.name.clone(),
                    predicate: None,
                }),
            }
        }

        if !disqualified.is_empty() {
            if let Some(session) = self.sessions.get_mut(&source) {
                session.candidates.retain(|c| !disqualified.contains(c));
            }
            for id in &disqualified {
                if let Some(reg) = self.registrations.get_mut(id) {
                    reg.state = GestureState::Cancelled;
                    debug!(
                        gesture = %id,
                        touches = kinematics.touch_count,
                        min = reg.options.min_touches,
                        max = reg.options.max_touches,
                        "touch count out of bounds; disqualified"
                    );
                }
            }
        }
        bidders
    }

    /// Pick the winner among this tick's bids and cancel everyone else.
    fn resolve(&mut self, source: InputSource, bids: &[GestureId]) -> Option<Resolution> {
        let session = self.sessions.get(&source)?;
        if session.slot != CaptureSlot::Empty {
            return None;
        }
        // Predicates ran unborrowed; re-check what they may have changed.
        let winner = bids
            .iter()
            .copied()
            .filter(|id| session.candidates.contains(id))
            .filter_map(|id| self.registrations.get(&id).map(|reg| (id, reg)))
            .filter(|(_, reg)| {
                reg.state == GestureState::Pending && reg.enabled && !self.is_blocked(&reg.name)
            })
            .max_by_key(|(_, reg)| (reg.options.priority, Reverse(reg.init_order)))
            .map(|(id, _)| id)?;

        let losers: SmallVec<[GestureId; 8]> = session
            .candidates
            .iter()
            .copied()
            .filter(|id| *id != winner)
            .collect();

        let session = self.sessions.get_mut(&source)?;
        session.slot = CaptureSlot::Held(winner);
        session.candidates.clear();

        let mut not_captured = Vec::new();
        for id in &losers {
            if let Some(reg) = self.registrations.get_mut(id) {
                reg.state = GestureState::Cancelled;
                not_captured.extend(reg.options.on_not_captured.clone());
            }
        }

        let reg = self.registrations.get_mut(&winner)?;
        reg.state = GestureState::Active;
        debug!(
            winner = %winner,
            name = %reg.name,
            priority = reg.options.priority,
            bids = bids.len(),
            cancelled = losers.len(),
            "capture resolved"
        );
        Some(Resolution {
            notice: CaptureNotice {
                transition: CaptureTransition::Captured,
                gesture: winner,
                name: reg.name.clone(),
                source,
                priority: reg.options.priority,
                bids: bids.len(),
            },
            passive: reg.options.passive,
            on_start: reg.options.on_start.clone(),
            not_captured,
        })
    }
}

/// Gesture coordinator. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Arbiter {
    inner: Rc<RefCell<ArbiterInner>>,
    captures: Rc<CaptureChannel>,
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new(ArbiterConfig::default())
    }
}

impl std::fmt::Debug for Arbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Arbiter")
            .field("config", &inner.config)
            .field("gestures", &inner.registrations.len())
            .field("sessions", &inner.sessions.len())
            .field("blockers", &inner.blockers.len())
            .finish()
    }
}

impl Arbiter {
    #[must_use]
    pub fn new(config: ArbiterConfig) -> Self {
        let captures = Rc::new(CaptureChannel::new());
        Self {
            inner: Rc::new(RefCell::new(ArbiterInner::new(config, captures.clone()))),
            captures,
        }
    }

    #[must_use]
    pub fn config(&self) -> ArbiterConfig {
        self.inner.borrow().config
    }

    /// Register a gesture on `surface`. The arbiter keeps only a weak
    /// reference to the surface; once the host drops it, the gesture is no
    /// longer admitted to sessions.
    ///
    /// The gesture starts inert; call [`Gesture::init`] to make it live.
    ///
    /// # Errors
    ///
    /// Any configuration error from [`GestureOptions::validate`].
    pub fn create_gesture<S: Surface + 'static>(
        &self,
        surface: &Rc<S>,
        options: GestureOptions,
    ) -> Result<Gesture> {
        options.validate()?;
        let surface: Weak<S> = Rc::downgrade(surface);
        let surface: Weak<dyn Surface> = surface;
        let mut inner = self.inner.borrow_mut();
        let id = GestureId::from_raw(inner.next_id);
        inner.next_id += 1;
        let name = options.name.clone().unwrap_or_else(|| id.to_string());
        inner.registrations.insert(
            id,
            Registration {
                name: name.clone(),
                options,
                surface,
                state: GestureState::Inert,
                init_order: None,
                enabled: true,
                session: None,
            },
        );
        trace!(gesture = %id, name = %name, "gesture created");
        Ok(Gesture::new(id, name, Rc::downgrade(&self.inner)))
    }

    /// Create an inactive blocker for the named gestures.
    pub fn create_blocker<I, N>(&self, names: I) -> Blocker
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let names: AHashSet<String> = names.into_iter().map(Into::into).collect();
        let id = self.inner.borrow_mut().add_blocker(names);
        Blocker::new(id, Rc::downgrade(&self.inner))
    }

    /// Observe captures and releases. Dropping the guard unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&CaptureNotice) + 'static) -> Subscription {
        self.captures.subscribe(callback)
    }

    /// Feed one raw input event through normalization, gating and
    /// arbitration, and run the resulting callbacks.
    pub fn dispatch(&self, input: &RawInput) -> DispatchOutcome {
        let span = debug_span!(
            "gesture.dispatch",
            source = ?input.source(),
            phase = ?input.phase(),
            touches = tracing::field::Empty
        );
        let _guard = span.enter();

        let tick = self.inner.borrow_mut().advance(input);
        let Some(Tick {
            mut outcome,
            work,
            released,
        }) = tick
        else {
            return DispatchOutcome::ignored();
        };

        match work {
            Work::None => {}
            Work::Deliver { callback, detail } => {
                span.record("touches", detail.touch_count);
                if let Some(callback) = callback {
                    callback(&detail);
                }
            }
            Work::Gate {
                source,
                detail,
                bidders,
            } => {
                span.record("touches", detail.touch_count);
                self.arbitrate(source, &detail, bidders, &mut outcome);
            }
        }
        if let Some(notice) = released {
            self.captures.broadcast(&notice);
        }
        outcome
    }

    fn arbitrate(
        &self,
        source: InputSource,
        detail: &GestureDetail,
        bidders: Vec<Bidder>,
        outcome: &mut DispatchOutcome,
    ) {
        let mut bids: SmallVec<[GestureId; 8]> = SmallVec::new();
        for bidder in bidders {
            let verdict = match &bidder.predicate {
                Some(predicate) => gating::run_predicate(predicate, detail),
                None => PredicateVerdict::Satisfied,
            };
            match verdict {
                PredicateVerdict::Satisfied => bids.push(bidder.id),
                PredicateVerdict::Deferred => {
                    trace!(gesture = %bidder.id, "can_start deferred");
                }
                PredicateVerdict::Faulted(err) => {
                    error!(gesture = %bidder.id, name = %bidder.name, error = %err, "can_start predicate failed");
                    outcome.predicate_faults.push(PredicateFault {
                        gesture: bidder.id,
                        name: bidder.name,
                        message: err.to_string(),
                    });
                }
            }
        }
        if bids.is_empty() {
            return;
        }

        let resolution = self.inner.borrow_mut().resolve(source, &bids);
        let Some(resolution) = resolution else {
            return;
        };
        let winner = resolution.notice.gesture;
        outcome.captured = Some(winner);
        outcome.delivered_to = Some(winner);
        outcome.prevent_default = !resolution.passive;

        self.captures.broadcast(&resolution.notice);
        if let Some(on_start) = &resolution.on_start {
            on_start(detail);
        }
        if !resolution.not_captured.is_empty() {
            let lost = detail.clone().with_kind(DetailKind::End);
            for callback in &resolution.not_captured {
                callback(&lost);
            }
        }
    }

    /// Whether any live session is captured (including abandoned captures).
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.inner
            .borrow()
            .sessions
            .values()
            .any(|s| s.slot != CaptureSlot::Empty)
    }

    /// Gesture holding the capture of `source`'s session.
    #[must_use]
    pub fn captured_by(&self, source: InputSource) -> Option<GestureId> {
        match self.inner.borrow().sessions.get(&source)?.slot {
            CaptureSlot::Held(id) => Some(id),
            CaptureSlot::Empty | CaptureSlot::Abandoned(_) => None,
        }
    }

    /// Number of live input sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.inner.borrow().sessions.len()
    }

    /// Number of registrations not yet destroyed.
    #[must_use]
    pub fn gesture_count(&self) -> usize {
        self.inner.borrow().registrations.len()
    }

    /// Whether gestures named `name` are kept from capturing, either by an
    /// active blocker or because such a gesture is disabled.
    #[must_use]
    pub fn is_disabled(&self, name: &str) -> bool {
        let inner = self.inner.borrow();
        inner.is_blocked(name)
            || inner
                .registrations
                .values()
                .any(|r| r.name == name && !r.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{InputPhase, TouchPoint};
    use crate::geometry::Bounds;
    use std::cell::Cell;
    use std::time::Duration;
    use web_time::Instant;

    struct Clock(Instant);

    impl Clock {
        fn new() -> Self {
            Self(Instant::now())
        }

        fn at(&self, ms: u64) -> Instant {
            self.0 + Duration::from_millis(ms)
        }
    }

    fn ptr(phase: InputPhase, x: f64, y: f64, t: Instant) -> RawInput {
        RawInput::pointer(phase, x, y, t)
    }

    fn counter() -> (Rc<Cell<u32>>, impl Fn(&GestureDetail) + 'static) {
        let c = Rc::new(Cell::new(0));
        let c2 = c.clone();
        (c, move |_: &GestureDetail| c2.set(c2.get() + 1))
    }

    fn surface() -> Rc<Bounds> {
        Rc::new(Bounds::from_size(200.0, 200.0))
    }

    #[test]
    fn zero_threshold_captures_on_start() {
        let arbiter = Arbiter::default();
        let s = surface();
        let (starts, on_start) = counter();
        let g = arbiter
            .create_gesture(&s, GestureOptions::new().on_start(on_start))
            .unwrap();
        g.init().unwrap();
        let clock = Clock::new();
        let out = arbiter.dispatch(&ptr(InputPhase::Start, 10.0, 10.0, clock.at(0)));
        assert!(out.session_started);
        assert_eq!(out.captured, Some(g.id()));
        assert_eq!(starts.get(), 1);
        assert_eq!(g.state(), GestureState::Active);
        assert_eq!(arbiter.captured_by(InputSource::Pointer), Some(g.id()));
    }

    #[test]
    fn full_pointer_session_callbacks() {
        let arbiter = Arbiter::default();
        let s = surface();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
        let g = arbiter
            .create_gesture(
                &s,
                GestureOptions::new()
                    .with_threshold(5.0)
                    .on_start(move |d| l1.borrow_mut().push((d.kind, d.delta_x)))
                    .on_move(move |d| l2.borrow_mut().push((d.kind, d.delta_x)))
                    .on_end(move |d| l3.borrow_mut().push((d.kind, d.delta_x))),
            )
            .unwrap();
        g.init().unwrap();
        let clock = Clock::new();
        arbiter.dispatch(&ptr(InputPhase::Start, 10.0, 10.0, clock.at(0)));
        arbiter.dispatch(&ptr(InputPhase::Move, 12.0, 10.0, clock.at(10)));
        arbiter.dispatch(&ptr(InputPhase::Move, 20.0, 10.0, clock.at(20)));
        arbiter.dispatch(&ptr(InputPhase::Move, 30.0, 10.0, clock.at(30)));
        let out = arbiter.dispatch(&ptr(InputPhase::End, 35.0, 10.0, clock.at(40)));
        assert!(out.session_ended);
        assert_eq!(out.delivered_to, Some(g.id()));
        assert_eq!(
            *log.borrow(),
            vec![
                (DetailKind::Start, 10.0),
                (DetailKind::Move, 20.0),
                (DetailKind::End, 25.0),
            ]
        );
        assert_eq!(g.state(), GestureState::Idle);
        assert_eq!(arbiter.session_count(), 0);
    }

    #[test]
    fn outside_surface_is_not_admitted() {
        let arbiter = Arbiter::default();
        let s = Rc::new(Bounds::new(100.0, 100.0, 50.0, 50.0));
        let (starts, on_start) = counter();
        let g = arbiter
            .create_gesture(&s, GestureOptions::new().on_start(on_start))
            .unwrap();
        g.init().unwrap();
        let out = arbiter.dispatch(&ptr(InputPhase::Start, 10.0, 10.0, Instant::now()));
        assert!(out.session_started);
        assert_eq!(out.captured, None);
        assert_eq!(starts.get(), 0);
        assert_eq!(g.state(), GestureState::Idle);
    }

    #[test]
    fn dropped_surface_is_not_admitted() {
        let arbiter = Arbiter::default();
        let s = surface();
        let g = arbiter.create_gesture(&s, GestureOptions::new()).unwrap();
        g.init().unwrap();
        drop(s);
        let out = arbiter.dispatch(&ptr(InputPhase::Start, 10.0, 10.0, Instant::now()));
        assert_eq!(out.captured, None);
    }

    #[test]
    fn inert_gesture_is_not_admitted() {
        let arbiter = Arbiter::default();
        let s = surface();
        let g = arbiter.create_gesture(&s, GestureOptions::new()).unwrap();
        let out = arbiter.dispatch(&ptr(InputPhase::Start, 10.0, 10.0, Instant::now()));
        assert_eq!(out.captured, None);
        assert_eq!(g.state(), GestureState::Inert);
    }

    #[test]
    fn hover_move_is_ignored() {
        let arbiter = Arbiter::default();
        let out = arbiter.dispatch(&ptr(InputPhase::Move, 1.0, 1.0, Instant::now()));
        assert!(out.ignored);
        assert_eq!(arbiter.session_count(), 0);
    }

    #[test]
    fn non_passive_requests_prevent_default() {
        let arbiter = Arbiter::default();
        let s = surface();
        let g = arbiter
            .create_gesture(&s, GestureOptions::new().with_passive(false))
            .unwrap();
        g.init().unwrap();
        let clock = Clock::new();
        assert!(arbiter.dispatch(&ptr(InputPhase::Start, 1.0, 1.0, clock.at(0))).prevent_default);
        assert!(arbiter.dispatch(&ptr(InputPhase::Move, 2.0, 1.0, clock.at(5))).prevent_default);
        assert!(arbiter.dispatch(&ptr(InputPhase::End, 2.0, 1.0, clock.at(9))).prevent_default);
    }

    #[test]
    fn cancel_ends_session_with_on_end() {
        let arbiter = Arbiter::default();
        let s = surface();
        let (ends, on_end) = counter();
        let g = arbiter
            .create_gesture(&s, GestureOptions::new().on_end(on_end))
            .unwrap();
        g.init().unwrap();
        let clock = Clock::new();
        let t = [TouchPoint::new(1, 10.0, 10.0)];
        arbiter.dispatch(&RawInput::touch(InputPhase::Start, t, clock.at(0)));
        let out = arbiter.dispatch(&RawInput::touch(InputPhase::Cancel, t, clock.at(5)));
        assert!(out.session_ended);
        assert_eq!(ends.get(), 1);
        assert_eq!(g.state(), GestureState::Idle);
    }

    #[test]
    fn pointer_and_touch_sessions_are_independent() {
        let arbiter = Arbiter::default();
        let s = surface();
        let a = arbiter.create_gesture(&s, GestureOptions::new()).unwrap();
        let b = arbiter.create_gesture(&s, GestureOptions::new()).unwrap();
        a.init().unwrap();
        b.init().unwrap();
        let clock = Clock::new();
        arbiter.dispatch(&ptr(InputPhase::Start, 10.0, 10.0, clock.at(0)));
        assert_eq!(arbiter.captured_by(InputSource::Pointer), Some(a.id()));
        assert_eq!(b.state(), GestureState::Cancelled);

        // Both still belong to the pointer session, so neither competes here.
        let touch = [TouchPoint::new(1, 20.0, 20.0)];
        let out = arbiter.dispatch(&RawInput::touch(InputPhase::Start, touch, clock.at(1)));
        assert_eq!(arbiter.session_count(), 2);
        assert_eq!(out.captured, None);

        arbiter.dispatch(&ptr(InputPhase::End, 10.0, 10.0, clock.at(2)));
        arbiter.dispatch(&RawInput::touch(InputPhase::End, touch, clock.at(3)));
        let out = arbiter.dispatch(&RawInput::touch(InputPhase::Start, touch, clock.at(4)));
        assert_eq!(out.captured, Some(a.id()));
    }

    #[test]
    fn debug_reports_counts() {
        let arbiter = Arbiter::default();
        let s = surface();
        let _g = arbiter.create_gesture(&s, GestureOptions::new()).unwrap();
        let text = format!("{arbiter:?}");
        assert!(text.contains("gestures: 1"));
    }
}
