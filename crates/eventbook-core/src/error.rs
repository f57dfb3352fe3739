// ABOUTME: Error type shared by the catalog, ledger and transcoder operations.
// ABOUTME: Every failure is reported synchronously and leaves prior state untouched.

use thiserror::Error;

/// Coarse category of a [`BookingError`], for callers that only need to
/// decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InsufficientSeats,
    Format,
}

/// Errors produced by catalog, ledger and import operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("event not found: {0}")]
    EventNotFound(String),

    #[error("booking not found: {0}")]
    BookingNotFound(String),

    #[error(
        "not enough seats for event {event_id}: requested {requested}, available {available}"
    )]
    InsufficientSeats {
        event_id: String,
        requested: u64,
        available: u32,
    },

    #[error("invalid import: {0}")]
    Format(String),
}

impl BookingError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::EventNotFound(_) | Self::BookingNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientSeats { .. } => ErrorKind::InsufficientSeats,
            Self::Format(_) => ErrorKind::Format,
        }
    }
}
