#![forbid(unsafe_code)]

//! Gesture blockers.
//!
//! A [`Blocker`] names a set of gestures. While it is blocking, gestures with
//! one of those names are not admitted to new sessions and cannot capture a
//! session they are already competing for. A gesture that already holds a
//! capture keeps it.
//!
//! Blockers start inactive. Dropping the handle destroys the blocker and
//! lifts its block.

use std::cell::RefCell;
use std::rc::Weak;

use tracing::trace;

use crate::arbiter::ArbiterInner;
use crate::error::{GestureError, Result};

/// Handle to one blocker registered on an [`Arbiter`](crate::Arbiter).
pub struct Blocker {
    id: u64,
    arbiter: Weak<RefCell<ArbiterInner>>,
}

impl std::fmt::Debug for Blocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blocker")
            .field("id", &self.id)
            .field("blocking", &self.is_blocked())
            .finish()
    }
}

impl Blocker {
    pub(crate) fn new(id: u64, arbiter: Weak<RefCell<ArbiterInner>>) -> Self {
        Self { id, arbiter }
    }

    /// Start blocking the named gestures.
    ///
    /// # Errors
    ///
    /// [`GestureError::BlockerDestroyed`] after `destroy()`.
    pub fn block(&self) -> Result<()> {
        self.set(true)
    }

    /// Lift the block.
    ///
    /// # Errors
    ///
    /// [`GestureError::BlockerDestroyed`] after `destroy()`.
    pub fn unblock(&self) -> Result<()> {
        self.set(false)
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.arbiter
            .upgrade()
            .is_some_and(|inner| inner.borrow().blocking(self.id))
    }

    /// Remove the blocker for good.
    ///
    /// # Errors
    ///
    /// [`GestureError::BlockerDestroyed`] when called twice.
    pub fn destroy(&self) -> Result<()> {
        let inner = self
            .arbiter
            .upgrade()
            .ok_or(GestureError::BlockerDestroyed)?;
        let mut inner = inner.borrow_mut();
        inner.remove_blocker(self.id)
    }

    fn set(&self, active: bool) -> Result<()> {
        let inner = self
            .arbiter
            .upgrade()
            .ok_or(GestureError::BlockerDestroyed)?;
        let mut inner = inner.borrow_mut();
        inner.set_blocking(self.id, active)
    }
}

impl Drop for Blocker {
    fn drop(&mut self) {
        let Some(inner) = self.arbiter.upgrade() else {
            return;
        };
        match inner.try_borrow_mut() {
            Ok(mut guard) => {
                // Already destroyed explicitly.
                let _ = guard.remove_blocker(self.id);
            }
            Err(_) => trace!(blocker = self.id, "arbiter busy during drop; blocker kept"),
        }
    }
}
