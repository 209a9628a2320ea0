#![forbid(unsafe_code)]

//! Pointer normalization: heterogeneous raw input into uniform samples.
//!
//! A [`Sample`] is a timestamp plus the ordered set of active contacts. The
//! pointing device always contributes exactly one contact with the synthetic
//! id [`POINTER_CONTACT_ID`]; a touch stream contributes one contact per
//! finger, in the order the fingers landed, each keeping its host id for the
//! lifetime of the touch.
//!
//! # Failure Modes
//!
//! Malformed input is never an error. A move with no known contacts, a
//! release of an unknown touch, or pointer motion while no button is held
//! normalizes to `None` and the caller drops the event.

use smallvec::SmallVec;
use tracing::{debug, trace};
use web_time::Instant;

use crate::event::{InputPhase, InputSource, PointerEvent, RawInput, TouchEvent, TouchId};
use crate::geometry::Point;

/// Contact id used for the single pointing-device contact.
pub const POINTER_CONTACT_ID: TouchId = u64::MAX;

/// One active contact in a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: TouchId,
    pub position: Point,
}

impl Contact {
    /// Create a contact.
    #[must_use]
    pub const fn new(id: TouchId, position: Point) -> Self {
        Self { id, position }
    }
}

/// Contact list, inline for the common one/two finger cases.
pub type Contacts = SmallVec<[Contact; 4]>;

/// A uniform input sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: Instant,
    pub contacts: Contacts,
}

impl Sample {
    /// Create a sample.
    #[must_use]
    pub fn new(time: Instant, contacts: impl IntoIterator<Item = Contact>) -> Self {
        Self {
            time,
            contacts: contacts.into_iter().collect(),
        }
    }

    /// Number of active contacts.
    #[inline]
    #[must_use]
    pub fn touch_count(&self) -> usize {
        self.contacts.len()
    }

    /// Mean of all contact positions, `None` when there are no contacts.
    #[must_use]
    pub fn centroid(&self) -> Option<Point> {
        Point::centroid(self.contacts.iter().map(|c| c.position))
    }

    /// Look up a contact by id.
    #[must_use]
    pub fn contact(&self, id: TouchId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// Mean distance over every unordered pair of contacts.
    ///
    /// `None` with fewer than two contacts.
    #[must_use]
    pub fn mean_pairwise_distance(&self) -> Option<f64> {
        let n = self.contacts.len();
        if n < 2 {
            return None;
        }
        let mut total = 0.0;
        let mut pairs = 0_u32;
        for (i, a) in self.contacts.iter().enumerate() {
            for b in &self.contacts[i + 1..] {
                total += a.position.distance(b.position);
                pairs += 1;
            }
        }
        Some(total / f64::from(pairs))
    }
}

/// Result of normalizing one raw event.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedInput {
    pub source: InputSource,
    pub phase: InputPhase,
    /// Contacts after applying the event. When the event releases the last
    /// contact this holds the released contacts at their release positions,
    /// so the final sample of a session is never empty.
    pub sample: Sample,
    /// True when the event leaves no contact down on this source.
    pub ends_session: bool,
}

/// Stateful normalizer tracking which contacts are down on each source.
#[derive(Debug, Clone, Default)]
pub struct PointerNormalizer {
    pointer_down: Option<Point>,
    touches: Contacts,
}

impl PointerNormalizer {
    /// Create a normalizer with nothing down.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn active_contacts(&self, source: InputSource) -> usize {
        match source {
            InputSource::Pointer => usize::from(self.pointer_down.is_some()),
            InputSource::Touch => self.touches.len(),
        }
    }

    /// Normalize a raw event, updating the active contact table.
    pub fn normalize(&mut self, input: &RawInput) -> Option<NormalizedInput> {
        match input {
            RawInput::Pointer(ev) => self.normalize_pointer(ev),
            RawInput::Touch(ev) => self.normalize_touch(ev),
        }
    }

    fn normalize_pointer(&mut self, ev: &PointerEvent) -> Option<NormalizedInput> {
        let pos = Point::new(ev.x, ev.y);
        let contact = [Contact::new(POINTER_CONTACT_ID, pos)];
        match ev.phase {
            InputPhase::Start => {
                // A second press while already down continues the session.
                let phase = if self.pointer_down.is_some() {
                    InputPhase::Move
                } else {
                    InputPhase::Start
                };
                self.pointer_down = Some(pos);
                Some(NormalizedInput {
                    source: InputSource::Pointer,
                    phase,
                    sample: Sample::new(ev.time, contact),
                    ends_session: false,
                })
            }
            InputPhase::Move => {
                if self.pointer_down.is_none() {
                    trace!(x = ev.x, y = ev.y, "pointer move without press ignored");
                    return None;
                }
                self.pointer_down = Some(pos);
                Some(NormalizedInput {
                    source: InputSource::Pointer,
                    phase: InputPhase::Move,
                    sample: Sample::new(ev.time, contact),
                    ends_session: false,
                })
            }
            InputPhase::End | InputPhase::Cancel => {
                if self.pointer_down.take().is_none() {
                    trace!("pointer release without press ignored");
                    return None;
                }
                Some(NormalizedInput {
                    source: InputSource::Pointer,
                    phase: ev.phase,
                    sample: Sample::new(ev.time, contact),
                    ends_session: true,
                })
            }
        }
    }

    fn normalize_touch(&mut self, ev: &TouchEvent) -> Option<NormalizedInput> {
        if let Some(closed) = self.drop_stale_touches(ev) {
            return Some(closed);
        }
        match ev.phase {
            InputPhase::Start => {
                if ev.changed.is_empty() {
                    trace!("touch start without touches ignored");
                    return None;
                }
                let was_idle = self.touches.is_empty();
                for t in &ev.changed {
                    match self.touches.iter_mut().find(|c| c.id == t.id) {
                        Some(existing) => existing.position = t.position(),
                        None => self.touches.push(Contact::new(t.id, t.position())),
                    }
                }
                Some(NormalizedInput {
                    source: InputSource::Touch,
                    phase: if was_idle {
                        InputPhase::Start
                    } else {
                        InputPhase::Move
                    },
                    sample: Sample::new(ev.time, self.touches.iter().copied()),
                    ends_session: false,
                })
            }
            InputPhase::Move => {
                if !self.apply_positions(ev) {
                    trace!(changed = ev.changed.len(), "touch move for unknown touches ignored");
                    return None;
                }
                Some(NormalizedInput {
                    source: InputSource::Touch,
                    phase: InputPhase::Move,
                    sample: Sample::new(ev.time, self.touches.iter().copied()),
                    ends_session: false,
                })
            }
            InputPhase::End => {
                if !self.apply_positions(ev) {
                    trace!(changed = ev.changed.len(), "touch end for unknown touches ignored");
                    return None;
                }
                let before = Sample::new(ev.time, self.touches.iter().copied());
                self.touches
                    .retain(|c| !ev.changed.iter().any(|t| t.id == c.id));
                let ends_session = self.touches.is_empty();
                let sample = if ends_session {
                    before
                } else {
                    Sample::new(ev.time, self.touches.iter().copied())
                };
                Some(NormalizedInput {
                    source: InputSource::Touch,
                    phase: if ends_session {
                        InputPhase::End
                    } else {
                        InputPhase::Move
                    },
                    sample,
                    ends_session,
                })
            }
            InputPhase::Cancel => {
                if self.touches.is_empty() {
                    trace!("touch cancel with no active touches ignored");
                    return None;
                }
                self.apply_positions(ev);
                let sample = Sample::new(ev.time, self.touches.drain(..));
                Some(NormalizedInput {
                    source: InputSource::Touch,
                    phase: InputPhase::Cancel,
                    sample,
                    ends_session: true,
                })
            }
        }
    }

    /// Forget tracked touches the host no longer reports as down. When that
    /// empties the table, the stale session is closed as cancelled; touches
    /// landing in the same event are kept for the next session.
    fn drop_stale_touches(&mut self, ev: &TouchEvent) -> Option<NormalizedInput> {
        let still_down = ev.still_down.as_ref()?;
        let reported = |id: TouchId| {
            still_down.iter().any(|t| t.id == id) || ev.changed.iter().any(|t| t.id == id)
        };
        let stale: Contacts = self
            .touches
            .iter()
            .filter(|c| !reported(c.id))
            .copied()
            .collect();
        if stale.is_empty() {
            return None;
        }
        self.touches.retain(|c| reported(c.id));
        debug!(dropped = stale.len(), remaining = self.touches.len(), "stale touches dropped");
        if !self.touches.is_empty() {
            return None;
        }
        if ev.phase == InputPhase::Start {
            self.touches
                .extend(ev.changed.iter().map(|t| Contact::new(t.id, t.position())));
        }
        Some(NormalizedInput {
            source: InputSource::Touch,
            phase: InputPhase::Cancel,
            sample: Sample::new(ev.time, stale),
            ends_session: true,
        })
    }

    /// Update positions of known touches; returns whether any was known.
    fn apply_positions(&mut self, ev: &TouchEvent) -> bool {
        let mut any_known = false;
        for t in &ev.changed {
            if let Some(existing) = self.touches.iter_mut().find(|c| c.id == t.id) {
                existing.position = t.position();
                any_known = true;
            }
        }
        any_known
    }
}
