// ABOUTME: Defines the Event record and the EventDraft input used by admin create and edit.
// ABOUTME: Drafts carry raw signed numbers so negative input can be rejected with a field name.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A bookable event. Serialized with camelCase keys; every field defaults
/// when absent so older or hand-edited snapshots still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub category: String,
    /// ISO calendar date (`YYYY-MM-DD`). Lexicographic order is chronological.
    pub date: String,
    pub price: u64,
    pub available_seats: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Event {
    /// Description text, or the empty string when none was given.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn is_sold_out(&self) -> bool {
        self.available_seats == 0
    }
}

/// Admin-supplied attributes for creating or fully replacing an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub name: String,
    pub category: String,
    pub date: String,
    pub price: i64,
    pub available_seats: i64,
    pub description: Option<String>,
}

/// Validated draft contents, ready to be stamped with an id.
#[derive(Debug)]
pub(crate) struct EventFields {
    name: String,
    category: String,
    date: String,
    price: u64,
    available_seats: u32,
    description: Option<String>,
}

impl EventFields {
    pub(crate) fn with_id(self, id: String) -> Event {
        Event {
            id,
            name: self.name,
            category: self.category,
            date: self.date,
            price: self.price,
            available_seats: self.available_seats,
            description: self.description,
        }
    }
}

impl EventDraft {
    /// Check required text fields and numeric ranges. The date is normalized
    /// to zero-padded ISO form; a blank description becomes `None`.
    pub(crate) fn validate(self) -> Result<EventFields, BookingError> {
        let name = required("name", &self.name)?;
        let category = required("category", &self.category)?;
        let date_text = required("date", &self.date)?;

        let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
            BookingError::validation("date", format!("'{}' is not a YYYY-MM-DD date", date_text))
        })?;

        let price = u64::try_from(self.price)
            .map_err(|_| BookingError::validation("price", "must be a non-negative number"))?;

        if self.available_seats < 0 {
            return Err(BookingError::validation(
                "availableSeats",
                "must be a non-negative number",
            ));
        }
        let available_seats = u32::try_from(self.available_seats)
            .map_err(|_| BookingError::validation("availableSeats", "is too large"))?;

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(EventFields {
            name,
            category,
            date: date.format(DATE_FORMAT).to_string(),
            price,
            available_seats,
            description,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, BookingError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookingError::validation(field, "is required"));
    }
    Ok(trimmed.to_string())
}
