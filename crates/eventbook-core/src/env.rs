// ABOUTME: Injected collaborators for identifier generation and the current time.
// ABOUTME: Production uses ULIDs and the system clock; tests swap in deterministic versions.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use ulid::Ulid;

/// Source of fresh, collision-improbable identifiers.
pub trait IdGenerator {
    fn next_id(&self) -> String;
}

/// Source of the current timestamp.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Generates lowercase ULID strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct UlidGenerator;

impl IdGenerator for UlidGenerator {
    fn next_id(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic ids of the form `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

/// A clock that advances by one second on every reading, starting from a
/// fixed instant. Keeps booking timestamps distinct and ordered in tests.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicU64,
}

impl SteppingClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            ticks: AtomicU64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed);
        self.start + chrono::Duration::seconds(tick as i64)
    }
}
