// ABOUTME: Persistence layer for eventbook: key-value backends and the BookingDesk service.
// ABOUTME: Provides in-memory, JSON-file and SQLite stores plus environment-driven configuration.

pub mod config;
pub mod desk;
pub mod file;
pub mod kv;
pub mod sqlite;

pub use config::{Backend, ConfigError, EventbookConfig};
pub use desk::{BOOKINGS_KEY, BookingDesk, DeskError, DeskOptions, EVENTS_KEY};
pub use file::FileStore;
pub use kv::{KeyValueStore, MemoryStore, StoreError};
pub use sqlite::SqliteStore;
