// ABOUTME: Defines the Booking record: a seat reservation with a snapshot of the event it was made for.
// ABOUTME: The snapshot fields are never re-synced, so a booking stays meaningful after its event changes or is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Event;

/// A confirmed reservation of one or more seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub event_date: String,
    #[serde(default)]
    pub price: u64,
    #[serde(default, alias = "name")]
    pub customer_name: String,
    pub tickets: u32,
    #[serde(alias = "bookedAt")]
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Build a booking against `event`, copying its name, date and price.
    pub(crate) fn for_event(
        id: String,
        event: &Event,
        customer_name: String,
        tickets: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            event_date: event.date.clone(),
            price: event.price,
            customer_name,
            tickets,
            created_at,
        }
    }

    /// Amount paid: ticket count times the price captured at booking time.
    pub fn total(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.tickets))
    }
}
