// ABOUTME: BookingDesk owns the catalog, ledger and a key-value store, mirroring state after every mutation.
// ABOUTME: If the mirror write fails, in-memory state is rolled back so callers never observe a half-applied change.

use eventbook_core::{
    Booking, BookingError, Cancellation, Catalog, Clock, DocumentFormat, Event, EventDraft,
    FilterSpec, IdGenerator, ImportSummary, Ledger, Snapshot, SystemClock, UlidGenerator,
    export_snapshot, import_snapshot, project,
};
use serde_json::Value;
use thiserror::Error;

use crate::kv::{KeyValueStore, StoreError};

/// Store key holding the events collection.
pub const EVENTS_KEY: &str = "events";
/// Store key holding the bookings collection.
pub const BOOKINGS_KEY: &str = "bookings";

#[derive(Debug, Error)]
pub enum DeskError {
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl DeskError {
    /// The domain error, if this failure came from a business rule.
    pub fn as_booking(&self) -> Option<&BookingError> {
        match self {
            Self::Booking(e) => Some(e),
            Self::Store(_) => None,
        }
    }
}

/// Which collections an operation changed and must mirror.
#[derive(Debug, Clone, Copy)]
struct Touched {
    events: bool,
    bookings: bool,
}

impl Touched {
    const EVENTS: Self = Self {
        events: true,
        bookings: false,
    };
    const BOTH: Self = Self {
        events: true,
        bookings: true,
    };
}

/// Options for [`BookingDesk::open_with`].
pub struct DeskOptions {
    /// Load demo events when the stored catalog is empty.
    pub seed: bool,
    pub ids: Box<dyn IdGenerator>,
    pub clock: Box<dyn Clock>,
}

impl Default for DeskOptions {
    fn default() -> Self {
        Self {
            seed: true,
            ids: Box::new(UlidGenerator),
            clock: Box::new(SystemClock),
        }
    }
}

/// Application service over the catalog and ledger.
pub struct BookingDesk<S> {
    store: S,
    catalog: Catalog,
    ledger: Ledger,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore> BookingDesk<S> {
    /// Load state from `store` with production ids and clock.
    pub fn open(store: S, seed: bool) -> Result<Self, DeskError> {
        Self::open_with(
            store,
            DeskOptions {
                seed,
                ..DeskOptions::default()
            },
        )
    }

    /// Load both collections from `store`. Missing keys load as empty. When
    /// seeding is enabled and no events are stored, the demo events are
    /// loaded and written back once.
    pub fn open_with(store: S, options: DeskOptions) -> Result<Self, DeskError> {
        let events: Vec<Event> = load_collection(&store, EVENTS_KEY)?;
        let bookings: Vec<Booking> = load_collection(&store, BOOKINGS_KEY)?;
        tracing::info!(
            events = events.len(),
            bookings = bookings.len(),
            "loaded eventbook state"
        );

        let mut desk = Self {
            store,
            catalog: Catalog::from_events(events),
            ledger: Ledger::from_bookings(bookings),
            ids: options.ids,
            clock: options.clock,
        };

        if options.seed {
            desk.ensure_seeded()?;
        }
        Ok(desk)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.catalog.get(id)
    }

    /// Events filtered and ordered for display.
    pub fn events(&self, filter: &FilterSpec) -> Vec<&Event> {
        project(self.catalog.list(), filter)
    }

    pub fn categories(&self) -> Vec<String> {
        self.catalog.categories()
    }

    /// Bookings newest first.
    pub fn bookings(&self) -> Vec<&Booking> {
        self.ledger.recent_first()
    }

    /// Seed demo events into an empty catalog. Returns whether it happened.
    pub fn ensure_seeded(&mut self) -> Result<bool, DeskError> {
        if !self.catalog.is_empty() {
            return Ok(false);
        }
        self.commit(Touched::EVENTS, |catalog, _, ids, _| {
            Ok(catalog.ensure_seeded(ids))
        })
    }

    pub fn create_event(&mut self, draft: EventDraft) -> Result<Event, DeskError> {
        self.commit(Touched::EVENTS, |catalog, _, ids, _| {
            catalog.create(draft, ids)
        })
    }

    pub fn update_event(&mut self, id: &str, draft: EventDraft) -> Result<Event, DeskError> {
        self.commit(Touched::EVENTS, |catalog, _, _, _| catalog.update(id, draft))
    }

    pub fn delete_event(&mut self, id: &str) -> Result<Event, DeskError> {
        let removed = self.commit(Touched::EVENTS, |catalog, _, _, _| catalog.delete(id))?;
        let orphaned = self.ledger.for_event(id).count();
        if orphaned > 0 {
            tracing::warn!(event_id = %id, orphaned, "deleted event still has bookings");
        }
        Ok(removed)
    }

    pub fn book(
        &mut self,
        event_id: &str,
        customer_name: &str,
        tickets: u32,
    ) -> Result<Booking, DeskError> {
        self.commit(Touched::BOTH, |catalog, ledger, ids, clock| {
            ledger.book(catalog, event_id, customer_name, tickets, ids, clock)
        })
    }

    pub fn cancel(&mut self, booking_id: &str) -> Result<Cancellation, DeskError> {
        self.commit(Touched::BOTH, |catalog, ledger, _, _| {
            ledger.cancel(catalog, booking_id)
        })
    }

    pub fn export(&self) -> Snapshot {
        export_snapshot(&self.catalog, &self.ledger, self.clock.as_ref())
    }

    /// Render the current snapshot as a document in `format`.
    pub fn export_document(&self, format: DocumentFormat) -> Result<String, DeskError> {
        Ok(self.export().render(format)?)
    }

    pub fn import(&mut self, raw: &Value) -> Result<ImportSummary, DeskError> {
        self.commit(Touched::BOTH, |catalog, ledger, _, _| {
            import_snapshot(catalog, ledger, raw)
        })
    }

    /// Run `op` against the collections, then mirror the touched ones to the
    /// store. A domain error leaves everything as it was; a store error
    /// restores the previous in-memory state and re-mirrors it.
    fn commit<T>(
        &mut self,
        touched: Touched,
        op: impl FnOnce(
            &mut Catalog,
            &mut Ledger,
            &dyn IdGenerator,
            &dyn Clock,
        ) -> Result<T, BookingError>,
    ) -> Result<T, DeskError> {
        let catalog_before = self.catalog.clone();
        let ledger_before = self.ledger.clone();

        let value = op(
            &mut self.catalog,
            &mut self.ledger,
            self.ids.as_ref(),
            self.clock.as_ref(),
        )?;

        if let Err(e) = self.persist(touched) {
            tracing::error!("mirror write failed, rolling back: {}", e);
            self.catalog = catalog_before;
            self.ledger = ledger_before;
            if let Err(again) = self.persist(touched) {
                tracing::warn!("could not restore stored state after rollback: {}", again);
            }
            return Err(e.into());
        }
        Ok(value)
    }

    fn persist(&mut self, touched: Touched) -> Result<(), StoreError> {
        if touched.events {
            let json = serde_json::to_string(&self.catalog)?;
            self.store.set(EVENTS_KEY, &json)?;
        }
        if touched.bookings {
            let json = serde_json::to_string(&self.ledger)?;
            self.store.set(BOOKINGS_KEY, &json)?;
        }
        Ok(())
    }
}

fn load_collection<S, T>(store: &S, key: &str) -> Result<Vec<T>, StoreError>
where
    S: KeyValueStore,
    T: serde::de::DeserializeOwned,
{
    match store.get(key)? {
        None => Ok(Vec::new()),
        Some(text) if text.trim().is_empty() => Ok(Vec::new()),
        Some(text) => serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use chrono::{TimeZone, Utc};
    use eventbook_core::{ErrorKind, SeatRestoration, SequentialIds, SteppingClock};
    use serde_json::json;

    fn options(seed: bool) -> DeskOptions {
        DeskOptions {
            seed,
            ids: Box::new(SequentialIds::new("id")),
            clock: Box::new(SteppingClock::starting_at(
                Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap(),
            )),
        }
    }

    fn seeded_desk() -> BookingDesk<MemoryStore> {
        BookingDesk::open_with(MemoryStore::new(), options(true)).unwrap()
    }

    fn first_event_id(desk: &BookingDesk<MemoryStore>) -> String {
        desk.catalog().list().next().unwrap().id.clone()
    }

    #[test]
    fn open_seeds_empty_store_and_mirrors_it() {
        let desk = seeded_desk();

        assert_eq!(desk.catalog().len(), 5);
        let stored = desk.store().get(EVENTS_KEY).unwrap().unwrap();
        let events: Vec<Event> = serde_json::from_str(&stored).unwrap();
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn open_without_seed_leaves_catalog_empty() {
        let desk = BookingDesk::open_with(MemoryStore::new(), options(false)).unwrap();
        assert!(desk.catalog().is_empty());
        assert!(desk.store().get(EVENTS_KEY).unwrap().is_none());
    }

    #[test]
    fn reopen_does_not_reseed_existing_catalog() {
        let mut desk = seeded_desk();
        let only = first_event_id(&desk);
        let others: Vec<String> = desk.catalog().list().skip(1).map(|e| e.id.clone()).collect();
        for id in others {
            desk.delete_event(&id).unwrap();
        }
        let store = desk.store().clone();

        let reopened = BookingDesk::open_with(store, options(true)).unwrap();
        assert_eq!(reopened.catalog().len(), 1);
        assert!(reopened.event(&only).is_some());
    }

    #[test]
    fn book_and_cancel_are_mirrored() {
        let mut desk = seeded_desk();
        let event_id = first_event_id(&desk);
        let seats = desk.event(&event_id).unwrap().available_seats;

        let booking = desk.book(&event_id, "Alice", 3).unwrap();
        let reopened = BookingDesk::open_with(desk.store().clone(), options(true)).unwrap();
        assert_eq!(reopened.ledger().len(), 1);
        assert_eq!(reopened.event(&event_id).unwrap().available_seats, seats - 3);

        let cancellation = desk.cancel(&booking.id).unwrap();
        assert_eq!(
            cancellation.restoration,
            SeatRestoration::Restored {
                available_seats: seats
            }
        );
        let reopened = BookingDesk::open_with(desk.store().clone(), options(true)).unwrap();
        assert!(reopened.ledger().is_empty());
        assert_eq!(reopened.event(&event_id).unwrap().available_seats, seats);
    }

    #[test]
    fn failed_mirror_write_rolls_back_memory() {
        let mut desk = seeded_desk();
        let event_id = first_event_id(&desk);
        let seats = desk.event(&event_id).unwrap().available_seats;
        desk.store.set_read_only(true);

        let err = desk.book(&event_id, "Alice", 2).unwrap_err();

        assert!(matches!(err, DeskError::Store(_)));
        assert!(err.as_booking().is_none());
        assert_eq!(desk.event(&event_id).unwrap().available_seats, seats);
        assert!(desk.ledger().is_empty());
    }

    #[test]
    fn open_populated_read_only_store_with_seeding_on() {
        let mut store = MemoryStore::new();
        store
            .set(
                EVENTS_KEY,
                r#"[{"id":"e1","name":"Poetry Slam","category":"Arts","date":"2025-12-01","price":0,"availableSeats":30,"legacyField":true}]"#,
            )
            .unwrap();
        let before = store.get(EVENTS_KEY).unwrap();
        store.set_read_only(true);

        let mut desk = BookingDesk::open_with(store, options(true)).unwrap();

        assert_eq!(desk.catalog().len(), 1);
        assert!(!desk.ensure_seeded().unwrap());
        assert_eq!(desk.store().get(EVENTS_KEY).unwrap(), before);
    }

    #[test]
    fn domain_errors_surface_unchanged() {
        let mut desk = seeded_desk();
        let err = desk.cancel("missing").unwrap_err();
        assert_eq!(err.as_booking().map(|e| e.kind()), Some(ErrorKind::NotFound));
    }

    #[test]
    fn delete_event_keeps_bookings_as_orphans() {
        let mut desk = seeded_desk();
        let event_id = first_event_id(&desk);
        let booking = desk.book(&event_id, "Alice", 1).unwrap();

        desk.delete_event(&event_id).unwrap();

        assert_eq!(desk.bookings().len(), 1);
        let cancellation = desk.cancel(&booking.id).unwrap();
        assert_eq!(cancellation.restoration, SeatRestoration::EventGone);
    }

    #[test]
    fn import_replaces_and_persists() {
        let mut desk = seeded_desk();

        let raw = json!({
            "events": [{
                "id": "x1",
                "name": "Chess Open",
                "category": "Sport",
                "date": "2025-12-01",
                "price": 100,
                "availableSeats": 64
            }]
        });
        let summary = desk.import(&raw).unwrap();

        assert_eq!(summary.events, 1);
        assert_eq!(desk.categories(), vec!["all", "Sport"]);
        let reopened = BookingDesk::open_with(desk.store().clone(), options(true)).unwrap();
        assert_eq!(reopened.event("x1").unwrap().available_seats, 64);
    }

    #[test]
    fn corrupt_stored_collection_is_reported() {
        let mut store = MemoryStore::new();
        store.set(EVENTS_KEY, "{ nope").unwrap();

        let err = BookingDesk::open_with(store, options(true)).err().unwrap();
        match err {
            DeskError::Store(StoreError::Corrupt { key, .. }) => assert_eq!(key, EVENTS_KEY),
            other => panic!("expected corrupt store error, got {}", other),
        }
    }

    #[test]
    fn export_document_renders_both_formats() {
        let desk = seeded_desk();
        let json = desk.export_document(DocumentFormat::Json).unwrap();
        let yaml = desk.export_document(DocumentFormat::Yaml).unwrap();
        assert!(json.contains("Tech Conference 2025"));
        assert!(yaml.contains("exportedAt"));
    }

    #[test]
    fn events_applies_filter() {
        let desk = seeded_desk();
        let filter = FilterSpec {
            search: "robot".to_string(),
            ..FilterSpec::default()
        };
        let names: Vec<_> = desk.events(&filter).into_iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["AI & Robotics Expo".to_string()]);
    }
}
