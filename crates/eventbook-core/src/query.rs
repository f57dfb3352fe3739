// ABOUTME: Read-only projection of events: free-text search, category filter and stable sort.
// ABOUTME: project() never mutates its input and returns a fresh ordering on every call.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::ALL_CATEGORIES;
use crate::model::Event;

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    DateAsc,
    DateDesc,
    PriceAsc,
    PriceDesc,
}

impl SortKey {
    /// Parse a sort key name. Unknown or empty names fall back to `date_asc`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "date_desc" => Self::DateDesc,
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            _ => Self::DateAsc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateAsc => "date_asc",
            Self::DateDesc => "date_desc",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }

    fn compare(&self, a: &Event, b: &Event) -> Ordering {
        match self {
            Self::DateAsc => a.date.cmp(&b.date),
            Self::DateDesc => b.date.cmp(&a.date),
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to show: category selector, sort key and search text.
/// The default is the "reset filters" state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub category: String,
    pub sort: SortKey,
    pub search: String,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            sort: SortKey::default(),
            search: String::new(),
        }
    }
}

impl FilterSpec {
    fn matches_search(&self, needle: &str, event: &Event) -> bool {
        event.name.to_lowercase().contains(needle)
            || event.category.to_lowercase().contains(needle)
            || event.description_text().to_lowercase().contains(needle)
    }

    fn matches_category(&self, event: &Event) -> bool {
        let selector = self.category.trim();
        selector.is_empty()
            || selector.eq_ignore_ascii_case(ALL_CATEGORIES)
            || event.category.to_lowercase() == selector.to_lowercase()
    }
}

/// Filter and order `events` according to `spec`.
///
/// Search runs first, then the category filter, then a stable sort, so
/// events that compare equal keep their storage order.
pub fn project<'a, I>(events: I, spec: &FilterSpec) -> Vec<&'a Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    let needle = spec.search.trim().to_lowercase();

    let mut out: Vec<&Event> = events
        .into_iter()
        .filter(|e| needle.is_empty() || spec.matches_search(&needle, e))
        .filter(|e| spec.matches_category(e))
        .collect();

    out.sort_by(|a, b| spec.sort.compare(a, b));

    tracing::debug!(
        shown = out.len(),
        sort = %spec.sort,
        category = %spec.category,
        "projected events"
    );
    out
}
