// ABOUTME: The Ledger owns every Booking and pairs each booking or cancellation with a seat change.
// ABOUTME: It is the only caller of Catalog::adjust_seats, so the two collections cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::booking::Booking;
use crate::catalog::Catalog;
use crate::env::{Clock, IdGenerator};
use crate::error::BookingError;

/// What happened to the event's seats when a booking was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatRestoration {
    /// Seats were returned; carries the event's new available count.
    Restored { available_seats: u32 },
    /// The event was deleted after booking; there is no capacity to restore.
    EventGone,
}

/// Result of a successful cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    pub booking: Booking,
    pub restoration: SeatRestoration,
}

/// The set of bookings, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    bookings: Vec<Booking>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bookings(bookings: Vec<Booking>) -> Self {
        Self { bookings }
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    /// Bookings in insertion order.
    pub fn list(&self) -> &[Booking] {
        &self.bookings
    }

    /// Bookings ordered newest first by creation time.
    pub fn recent_first(&self) -> Vec<&Booking> {
        let mut out: Vec<&Booking> = self.bookings.iter().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    pub fn for_event<'a>(&'a self, event_id: &'a str) -> impl Iterator<Item = &'a Booking> + 'a {
        self.bookings.iter().filter(move |b| b.event_id == event_id)
    }

    /// Reserve `tickets` seats on an event for `customer_name`.
    ///
    /// Checks run in order: event exists, name non-empty, at least one
    /// ticket, enough seats. Nothing is mutated unless every check passes.
    pub fn book(
        &mut self,
        catalog: &mut Catalog,
        event_id: &str,
        customer_name: &str,
        tickets: u32,
        ids: &dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<Booking, BookingError> {
        let event = catalog
            .get(event_id)
            .ok_or_else(|| BookingError::EventNotFound(event_id.to_string()))?;

        let customer_name = customer_name.trim();
        if customer_name.is_empty() {
            return Err(BookingError::validation("customerName", "is required"));
        }
        if tickets < 1 {
            return Err(BookingError::validation("tickets", "must be at least 1"));
        }
        if tickets > event.available_seats {
            return Err(BookingError::InsufficientSeats {
                event_id: event_id.to_string(),
                requested: u64::from(tickets),
                available: event.available_seats,
            });
        }

        let booking = Booking::for_event(
            ids.next_id(),
            event,
            customer_name.to_string(),
            tickets,
            clock.now(),
        );

        // Seats were checked above; this cannot fail.
        let remaining = catalog.adjust_seats(event_id, -i64::from(tickets))?;
        self.bookings.push(booking.clone());

        tracing::info!(
            booking_id = %booking.id,
            event_id = %event_id,
            tickets,
            remaining,
            "booking created"
        );
        Ok(booking)
    }

    /// Remove a booking and give its seats back to the event, if the event
    /// still exists.
    pub fn cancel(
        &mut self,
        catalog: &mut Catalog,
        booking_id: &str,
    ) -> Result<Cancellation, BookingError> {
        let idx = self
            .bookings
            .iter()
            .position(|b| b.id == booking_id)
            .ok_or_else(|| BookingError::BookingNotFound(booking_id.to_string()))?;

        let event_id = self.bookings[idx].event_id.clone();
        let tickets = self.bookings[idx].tickets;

        let restoration = if catalog.get(&event_id).is_some() {
            let available_seats = catalog.adjust_seats(&event_id, i64::from(tickets))?;
            SeatRestoration::Restored { available_seats }
        } else {
            tracing::warn!(
                booking_id = %booking_id,
                event_id = %event_id,
                "cancelling orphaned booking; event no longer exists"
            );
            SeatRestoration::EventGone
        };

        let booking = self.bookings.remove(idx);
        tracing::info!(booking_id = %booking_id, tickets, "booking cancelled");

        Ok(Cancellation {
            booking,
            restoration,
        })
    }

    pub(crate) fn replace_all(&mut self, bookings: Vec<Booking>) {
        self.bookings = bookings;
    }
}
