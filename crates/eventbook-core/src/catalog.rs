// ABOUTME: The Catalog owns every Event and is the only place event records are mutated.
// ABOUTME: Seat counts change through adjust_seats (called by the Ledger) or a full admin update.

use serde::{Deserialize, Serialize};

use crate::env::IdGenerator;
use crate::error::BookingError;
use crate::model::{Event, EventDraft};
use crate::seed::demo_events;

/// The category selector value that matches every event.
pub const ALL_CATEGORIES: &str = "all";

/// The set of events, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    events: Vec<Event>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap events loaded from storage or an import.
    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Iterate events in storage order. The iterator is `Clone`, so callers
    /// can restart it without touching the catalog again.
    pub fn list(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    /// Validate the draft, assign a fresh id and append the event.
    pub fn create(&mut self, draft: EventDraft, ids: &dyn IdGenerator) -> Result<Event, BookingError> {
        let fields = draft.validate()?;
        let event = fields.with_id(ids.next_id());
        tracing::info!(event_id = %event.id, name = %event.name, "event created");
        self.events.push(event.clone());
        Ok(event)
    }

    /// Replace every non-id attribute of an existing event.
    pub fn update(&mut self, id: &str, draft: EventDraft) -> Result<Event, BookingError> {
        let idx = self.position(id)?;
        let fields = draft.validate()?;
        let event = fields.with_id(id.to_string());
        self.events[idx] = event.clone();
        tracing::info!(event_id = %id, seats = event.available_seats, "event updated");
        Ok(event)
    }

    /// Remove an event. Bookings that reference it are left in place.
    pub fn delete(&mut self, id: &str) -> Result<Event, BookingError> {
        let idx = self.position(id)?;
        let removed = self.events.remove(idx);
        tracing::info!(event_id = %id, "event deleted");
        Ok(removed)
    }

    /// Apply `delta` to an event's available seats, returning the new count.
    /// Fails without mutating if the result would be negative; an increase
    /// saturates at `u32::MAX`.
    pub(crate) fn adjust_seats(&mut self, id: &str, delta: i64) -> Result<u32, BookingError> {
        let idx = self.position(id)?;
        let event = &mut self.events[idx];
        let current = event.available_seats;
        let next = i64::from(current)
            .saturating_add(delta)
            .min(i64::from(u32::MAX));

        if next < 0 {
            return Err(BookingError::InsufficientSeats {
                event_id: id.to_string(),
                requested: delta.unsigned_abs(),
                available: current,
            });
        }
        event.available_seats = u32::try_from(next).unwrap_or(u32::MAX);

        tracing::debug!(event_id = %id, from = current, to = event.available_seats, "seats adjusted");
        Ok(event.available_seats)
    }

    /// Load the demo events if, and only if, the catalog is empty.
    /// Returns whether seeding happened.
    pub fn ensure_seeded(&mut self, ids: &dyn IdGenerator) -> bool {
        if !self.events.is_empty() {
            return false;
        }
        self.events = demo_events(ids);
        tracing::info!(count = self.events.len(), "seeded demo events");
        true
    }

    /// Category selector options: `all`, then each distinct category in the
    /// order it first appears.
    pub fn categories(&self) -> Vec<String> {
        let mut out = vec![ALL_CATEGORIES.to_string()];
        for event in &self.events {
            if !out.iter().skip(1).any(|c| c == &event.category) {
                out.push(event.category.clone());
            }
        }
        out
    }

    pub(crate) fn replace_all(&mut self, events: Vec<Event>) {
        self.events = events;
    }

    fn position(&self, id: &str) -> Result<usize, BookingError> {
        self.events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| BookingError::EventNotFound(id.to_string()))
    }
}
