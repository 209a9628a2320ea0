#![forbid(unsafe_code)]

//! Capture notification channel.
//!
//! The arbiter broadcasts a [`CaptureNotice`] whenever a session's capture
//! changes hands: when arbitration resolves, and again when the holder lets
//! go. Observers that are not gestures themselves (a scroll container that
//! should stop scrolling, a debug overlay) subscribe here.
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: a [`Subscription`] guard kept forever keeps its
//!   callback alive. Dead entries are pruned lazily on the next broadcast.
//! - **Re-entrant subscribe**: subscribing from inside a notice callback is
//!   allowed; the new subscriber sees the next notice, not the current one.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::event::InputSource;
use crate::gesture::GestureId;

/// What happened to a session's capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureTransition {
    /// The gesture won arbitration.
    Captured,
    /// The last contact lifted while the gesture held the session.
    Released,
    /// The host cancelled the session while the gesture held it.
    Cancelled,
    /// The holder was destroyed or disabled; the session stays captured
    /// until its contacts lift.
    Abandoned,
}

impl CaptureTransition {
    /// True for every transition that frees the holder.
    #[must_use]
    pub const fn is_release(self) -> bool {
        !matches!(self, Self::Captured)
    }
}

/// Capture change broadcast to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureNotice {
    pub transition: CaptureTransition,
    pub gesture: GestureId,
    pub name: String,
    pub source: InputSource,
    pub priority: i32,
    /// Number of gestures that bid on the resolving sample, winner included.
    /// Zero for releases.
    pub bids: usize,
}

/// A notice built under the arbiter borrow, sent once it is released.
pub(crate) struct PendingNotice {
    channel: Rc<CaptureChannel>,
    notice: CaptureNotice,
}

impl PendingNotice {
    pub(crate) fn new(channel: Rc<CaptureChannel>, notice: CaptureNotice) -> Self {
        Self { channel, notice }
    }

    pub(crate) fn send(self) {
        self.channel.broadcast(&self.notice);
    }
}

type NoticeRc = Rc<dyn Fn(&CaptureNotice)>;
type NoticeWeak = Weak<dyn Fn(&CaptureNotice)>;

/// Subscriber list for capture notices.
#[derive(Default)]
pub struct CaptureChannel {
    subscribers: RefCell<Vec<NoticeWeak>>,
}

impl std::fmt::Debug for CaptureChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureChannel")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

impl CaptureChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Dropping the returned guard unsubscribes it.
    pub fn subscribe(&self, callback: impl Fn(&CaptureNotice) + 'static) -> Subscription {
        let strong: NoticeRc = Rc::new(callback);
        self.subscribers.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of registered observers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Deliver a notice to every live observer, in subscription order.
    pub fn broadcast(&self, notice: &CaptureNotice) {
        // Collect first so observers may subscribe re-entrantly.
        let callbacks: Vec<NoticeRc> = {
            let mut subs = self.subscribers.borrow_mut();
            subs.retain(|w| w.strong_count() > 0);
            subs.iter().filter_map(Weak::upgrade).collect()
        };
        for cb in &callbacks {
            cb(notice);
        }
    }
}

/// RAII guard for a capture observer.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
