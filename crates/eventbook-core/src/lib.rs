// ABOUTME: Core library for eventbook: events, bookings, and the rules that keep seat counts consistent.
// ABOUTME: Pure and synchronous; persistence and presentation live in other crates.

pub mod booking;
pub mod catalog;
pub mod env;
pub mod error;
pub mod ledger;
pub mod model;
pub mod query;
pub mod seed;
pub mod transfer;

pub use booking::Booking;
pub use catalog::{ALL_CATEGORIES, Catalog};
pub use env::{Clock, IdGenerator, SequentialIds, SteppingClock, SystemClock, UlidGenerator};
pub use error::{BookingError, ErrorKind};
pub use ledger::{Cancellation, Ledger, SeatRestoration};
pub use model::{Event, EventDraft};
pub use query::{FilterSpec, SortKey, project};
pub use transfer::{
    DocumentFormat, ImportSummary, Snapshot, export_file_name, export_snapshot, import_snapshot,
    parse_document,
};
