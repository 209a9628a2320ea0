#![forbid(unsafe_code)]

//! Public per-registration handle.
//!
//! A [`Gesture`] is created inert by
//! [`Arbiter::create_gesture`](crate::arbiter::Arbiter::create_gesture),
//! becomes live on [`init`](Gesture::init) and is permanently inert after
//! [`destroy`](Gesture::destroy). Dropping the handle destroys it, so a
//! registration can never outlive its owner.
//!
//! # State Machine
//!
//! ```text
//! Inert --init--> Idle --session starts--> Pending --+--> Active --session ends--> Idle
//!                                                    +--> Cancelled --session ends--> Idle
//! any --destroy--> Destroyed
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::arbiter::ArbiterInner;
use crate::error::{GestureError, Result};

/// Stable identifier of a gesture registration. Never reused by an arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GestureId(u64);

impl GestureId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gesture-{}", self.0)
    }
}

/// Lifecycle state of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureState {
    /// Created, `init()` not called yet.
    Inert,
    /// Live, not part of any session.
    Idle,
    /// Candidate of a live session, waiting for its gating to pass.
    Pending,
    /// Holds the capture slot of a session.
    Active,
    /// Lost arbitration or was disqualified; waits for the session to end.
    Cancelled,
    /// Permanently inert.
    Destroyed,
}

impl GestureState {
    /// Whether the gesture is taking part in a session.
    #[must_use]
    pub const fn in_session(self) -> bool {
        matches!(self, Self::Pending | Self::Active | Self::Cancelled)
    }
}

/// Handle to one gesture registration.
pub struct Gesture {
    id: GestureId,
    name: String,
    arbiter: Weak<RefCell<ArbiterInner>>,
}

impl fmt::Debug for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gesture")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

impl Gesture {
    pub(crate) fn new(id: GestureId, name: String, arbiter: Weak<RefCell<ArbiterInner>>) -> Self {
        Self { id, name, arbiter }
    }

    #[must_use]
    pub fn id(&self) -> GestureId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start listening. Calling it again on a live gesture keeps its
    /// original registration order.
    ///
    /// # Errors
    ///
    /// [`GestureError::AlreadyDestroyed`] after `destroy()`.
    pub fn init(&self) -> Result<()> {
        let inner = self.upgrade()?;
        let mut inner = inner.borrow_mut();
        inner.init_gesture(self.id, &self.name)
    }

    /// Stop listening for good. If the gesture holds a session's capture,
    /// that session ends for it with no further callbacks.
    ///
    /// # Errors
    ///
    /// [`GestureError::AlreadyDestroyed`] when called twice.
    pub fn destroy(&self) -> Result<()> {
        let inner = self.upgrade()?;
        let (removed, notice) = inner.borrow_mut().remove_gesture(self.id, &self.name)?;
        // Callbacks may own other handles; drop them with the arbiter released.
        drop(removed);
        if let Some(notice) = notice {
            notice.send();
        }
        Ok(())
    }

    /// Enable or disable the gesture. Disabling withdraws it from the session
    /// it is competing for or holding, without `on_end`.
    ///
    /// # Errors
    ///
    /// [`GestureError::AlreadyDestroyed`] after `destroy()`.
    pub fn enable(&self, enabled: bool) -> Result<()> {
        let inner = self.upgrade()?;
        let notice = inner.borrow_mut().enable_gesture(self.id, &self.name, enabled)?;
        if let Some(notice) = notice {
            notice.send();
        }
        Ok(())
    }

    /// Whether the gesture is enabled. False once destroyed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.arbiter
            .upgrade()
            .is_some_and(|inner| inner.borrow().gesture_enabled(self.id))
    }

    /// Current lifecycle state. `Destroyed` once the arbiter is gone.
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.arbiter
            .upgrade()
            .map_or(GestureState::Destroyed, |inner| {
                inner.borrow().gesture_state(self.id)
            })
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.state() == GestureState::Destroyed
    }

    fn upgrade(&self) -> Result<Rc<RefCell<ArbiterInner>>> {
        self.arbiter
            .upgrade()
            .ok_or_else(|| GestureError::AlreadyDestroyed {
                name: self.name.clone(),
            })
    }
}

impl Drop for Gesture {
    fn drop(&mut self) {
        let Some(inner) = self.arbiter.upgrade() else {
            return;
        };
        let removed = match inner.try_borrow_mut() {
            Ok(mut guard) => guard.remove_gesture(self.id, &self.name),
            Err(_) => {
                trace!(gesture = %self.id, "arbiter busy during drop; registration kept");
                return;
            }
        };
        if let Ok((registration, notice)) = removed {
            drop(registration);
            if let Some(notice) = notice {
                notice.send();
            }
        }
    }
}
