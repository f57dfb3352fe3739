// ABOUTME: Snapshot export and import for the whole catalog and ledger.
// ABOUTME: Imports are parsed completely before any state is replaced; JSON and YAML documents share one validation path.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::booking::Booking;
use crate::catalog::Catalog;
use crate::env::Clock;
use crate::error::BookingError;
use crate::ledger::Ledger;
use crate::model::Event;

/// Full export of current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub events: Vec<Event>,
    pub bookings: Vec<Booking>,
    pub exported_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn render(&self, format: DocumentFormat) -> Result<String, BookingError> {
        match format {
            DocumentFormat::Json => self
                .to_json_pretty()
                .map_err(|e| BookingError::Format(e.to_string())),
            DocumentFormat::Yaml => self
                .to_yaml()
                .map_err(|e| BookingError::Format(e.to_string())),
        }
    }
}

/// Serialization format of an export or import document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Guess the format from a file extension; anything but yaml/yml is JSON.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Json,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Counts reported after a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub events: usize,
    /// `None` when the document had no bookings array and existing
    /// bookings were kept.
    pub bookings: Option<usize>,
}

/// Default file name for an export written on `date`.
pub fn export_file_name(date: NaiveDate, format: DocumentFormat) -> String {
    format!(
        "eventbook-export-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Capture the current catalog and ledger with a generation timestamp.
pub fn export_snapshot(catalog: &Catalog, ledger: &Ledger, clock: &dyn Clock) -> Snapshot {
    Snapshot {
        events: catalog.as_slice().to_vec(),
        bookings: ledger.list().to_vec(),
        exported_at: clock.now(),
    }
}

/// Parse document text into a generic value for [`import_snapshot`].
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value, BookingError> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(text).map_err(|e| BookingError::Format(e.to_string()))
        }
        DocumentFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|e| BookingError::Format(e.to_string()))
        }
    }
}

/// Replace state from an external snapshot.
///
/// `events` must be an array and always replaces the catalog. `bookings`
/// replaces the ledger only when it is an array; otherwise existing bookings
/// are kept. Events and bookings are not cross-checked against each other.
pub fn import_snapshot(
    catalog: &mut Catalog,
    ledger: &mut Ledger,
    raw: &Value,
) -> Result<ImportSummary, BookingError> {
    let object = raw
        .as_object()
        .ok_or_else(|| BookingError::Format("document is not an object".to_string()))?;

    let events = match object.get("events") {
        Some(Value::Array(items)) => read_items::<Event>("events", items)?,
        _ => return Err(BookingError::Format("missing events[]".to_string())),
    };

    let bookings = match object.get("bookings") {
        Some(Value::Array(items)) => {
            let bookings = read_items::<Booking>("bookings", items)?;
            if let Some(bad) = bookings.iter().find(|b| b.tickets < 1) {
                return Err(BookingError::Format(format!(
                    "booking {} has no tickets",
                    bad.id
                )));
            }
            Some(bookings)
        }
        Some(_) => {
            tracing::warn!("import has a non-array bookings field; keeping existing bookings");
            None
        }
        None => None,
    };

    let summary = ImportSummary {
        events: events.len(),
        bookings: bookings.as_ref().map(Vec::len),
    };

    catalog.replace_all(events);
    if let Some(bookings) = bookings {
        ledger.replace_all(bookings);
    }

    tracing::info!(
        events = summary.events,
        bookings = ?summary.bookings,
        "snapshot imported"
    );
    Ok(summary)
}

fn read_items<T>(field: &str, items: &[Value]) -> Result<Vec<T>, BookingError>
where
    T: for<'de> Deserialize<'de>,
{
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            T::deserialize(item)
                .map_err(|e| BookingError::Format(format!("{}[{}]: {}", field, i, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{SequentialIds, SteppingClock};
    use crate::error::ErrorKind;
    use chrono::TimeZone;
    use serde_json::json;

    fn clock() -> SteppingClock {
        SteppingClock::starting_at(Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap())
    }

    fn populated() -> (Catalog, Ledger) {
        let ids = SequentialIds::new("id");
        let mut catalog = Catalog::new();
        catalog.ensure_seeded(&ids);
        let mut ledger = Ledger::new();
        let event_id = catalog.list().next().unwrap().id.clone();
        ledger
            .book(&mut catalog, &event_id, "Alice", 2, &ids, &clock())
            .unwrap();
        (catalog, ledger)
    }

    #[test]
    fn export_then_import_restores_state() {
        let (catalog, ledger) = populated();
        let snapshot = export_snapshot(&catalog, &ledger, &clock());
        let json = snapshot.to_json_pretty().unwrap();
        assert!(json.contains("\"exportedAt\""));

        let mut fresh_catalog = Catalog::new();
        let mut fresh_ledger = Ledger::new();
        let raw = parse_document(&json, DocumentFormat::Json).unwrap();
        let summary = import_snapshot(&mut fresh_catalog, &mut fresh_ledger, &raw).unwrap();

        assert_eq!(summary, ImportSummary { events: 5, bookings: Some(1) });
        assert_eq!(fresh_catalog, catalog);
        assert_eq!(fresh_ledger, ledger);
    }

    #[test]
    fn yaml_export_imports_through_same_path() {
        let (catalog, ledger) = populated();
        let yaml = export_snapshot(&catalog, &ledger, &clock()).to_yaml().unwrap();

        let mut fresh_catalog = Catalog::new();
        let mut fresh_ledger = Ledger::new();
        let raw = parse_document(&yaml, DocumentFormat::Yaml).unwrap();
        import_snapshot(&mut fresh_catalog, &mut fresh_ledger, &raw).unwrap();

        assert_eq!(fresh_catalog, catalog);
        assert_eq!(fresh_ledger, ledger);
    }

    #[test]
    fn non_array_events_is_rejected_without_changes() {
        let (mut catalog, mut ledger) = populated();
        let (catalog_before, ledger_before) = (catalog.clone(), ledger.clone());

        let err = import_snapshot(&mut catalog, &mut ledger, &json!({ "events": 42 })).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(catalog, catalog_before);
        assert_eq!(ledger, ledger_before);
    }

    #[test]
    fn malformed_element_is_rejected_without_changes() {
        let (mut catalog, mut ledger) = populated();
        let catalog_before = catalog.clone();

        let raw = json!({ "events": [{ "id": "ok" }, { "id": "bad", "price": -3 }] });
        let err = import_snapshot(&mut catalog, &mut ledger, &raw).unwrap_err();

        assert!(err.to_string().contains("events[1]"), "error: {}", err);
        assert_eq!(catalog, catalog_before);
    }

    #[test]
    fn events_only_import_keeps_existing_bookings() {
        let (mut catalog, mut ledger) = populated();
        let ledger_before = ledger.clone();

        let raw = json!({
            "events": [{ "id": "solo", "name": "Solo Show", "date": "2025-12-24" }],
            "bookings": "not a list"
        });
        let summary = import_snapshot(&mut catalog, &mut ledger, &raw).unwrap();

        assert_eq!(summary.bookings, None);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("solo").unwrap().available_seats, 0);
        assert_eq!(ledger, ledger_before);
    }

    #[test]
    fn missing_bookings_key_keeps_existing_bookings() {
        let (mut catalog, mut ledger) = populated();
        let ledger_before = ledger.clone();
        assert!(!ledger_before.is_empty());

        let raw = json!({
            "events": [{ "id": "solo", "name": "Solo Show", "date": "2025-12-24" }]
        });
        let summary = import_snapshot(&mut catalog, &mut ledger, &raw).unwrap();

        assert_eq!(summary, ImportSummary { events: 1, bookings: None });
        assert_eq!(catalog.len(), 1);
        assert_eq!(ledger, ledger_before);
    }

    #[test]
    fn bookings_array_replaces_ledger() {
        let (mut catalog, mut ledger) = populated();

        let raw = json!({ "events": [], "bookings": [] });
        let summary = import_snapshot(&mut catalog, &mut ledger, &raw).unwrap();

        assert_eq!(summary, ImportSummary { events: 0, bookings: Some(0) });
        assert!(catalog.is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn zero_ticket_booking_is_rejected() {
        let mut catalog = Catalog::new();
        let mut ledger = Ledger::new();
        let raw = json!({
            "events": [],
            "bookings": [{
                "id": "b1",
                "eventId": "gone",
                "tickets": 0,
                "createdAt": "2025-09-01T00:00:00Z"
            }]
        });

        let err = import_snapshot(&mut catalog, &mut ledger, &raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn non_object_document_is_rejected() {
        let mut catalog = Catalog::new();
        let mut ledger = Ledger::new();
        assert!(import_snapshot(&mut catalog, &mut ledger, &json!([1, 2])).is_err());
        assert!(parse_document("{ not json", DocumentFormat::Json).is_err());
    }

    #[test]
    fn export_file_name_uses_date_and_extension() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert_eq!(
            export_file_name(date, DocumentFormat::Yaml),
            "eventbook-export-2025-09-01.yaml"
        );
        assert_eq!(DocumentFormat::from_extension("YML"), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_extension("txt"), DocumentFormat::Json);
    }
}
