// ABOUTME: Demo events loaded into an empty catalog on first start.
// ABOUTME: Five sample events in several categories so a fresh install has something to browse and book.

use crate::env::IdGenerator;
use crate::model::Event;

/// (name, category, date, price, seats, description)
const DEMO: [(&str, &str, &str, u64, u32, &str); 5] = [
    (
        "Tech Conference 2025",
        "Tech",
        "2025-09-15",
        1499,
        120,
        "Flagship TechVille conference on AI, Cloud, Security.",
    ),
    (
        "AI & Robotics Expo",
        "Tech",
        "2025-10-01",
        999,
        200,
        "Showcase of cutting-edge AI robots and startups.",
    ),
    (
        "Music Fest",
        "Music",
        "2025-10-20",
        799,
        350,
        "Open-air concert with indie and electronic artists.",
    ),
    (
        "Startup Pitch Night",
        "Business",
        "2025-09-25",
        499,
        80,
        "Early-stage founders pitch to TechVille angels.",
    ),
    (
        "Design & UX Summit",
        "Design",
        "2025-11-05",
        1299,
        140,
        "Talks and workshops on modern product design.",
    ),
];

/// Build the demo events, each with a fresh id.
pub fn demo_events(ids: &dyn IdGenerator) -> Vec<Event> {
    DEMO.iter()
        .map(
            |&(name, category, date, price, available_seats, description)| Event {
                id: ids.next_id(),
                name: name.to_string(),
                category: category.to_string(),
                date: date.to_string(),
                price,
                available_seats,
                description: Some(description.to_string()),
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::SequentialIds;

    #[test]
    fn demo_events_have_unique_ids() {
        let events = demo_events(&SequentialIds::new("seed"));
        assert_eq!(events.len(), 5);
        let mut ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert_eq!(events[1].name, "AI & Robotics Expo");
    }
}
