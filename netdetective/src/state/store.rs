// netdetective/src/state/store.rs
//
// Append-only event store.
//
// Design:
//   - Events kept in arrival order, never mutated or removed
//   - Per-source index: source_address → event positions
//   - Observed span [min_time, max_time] tracked on every push
//
// Every derived structure (histogram, rankings, profiles) is rebuilt from a
// read-only borrow of the store on each analysis pass.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::events::Event;

#[derive(Debug, Default)]
pub struct EventStore {
    events:    Vec<Event>,
    by_source: HashMap<String, Vec<usize>>,
    min_time:  Option<DateTime<Utc>>,
    max_time:  Option<DateTime<Utc>>,
}

impl EventStore {
    pub fn new() -> Self { Self::default() }

    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut store = Self::new();
        for ev in events {
            store.push(ev);
        }
        store
    }

    pub fn push(&mut self, event: Event) {
        let ts = event.timestamp;
        self.min_time = Some(self.min_time.map_or(ts, |m| m.min(ts)));
        self.max_time = Some(self.max_time.map_or(ts, |m| m.max(ts)));

        self.by_source
            .entry(event.source_address.clone())
            .or_default()
            .push(self.events.len());
        self.events.push(event);
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize { self.events.len() }
    pub fn is_empty(&self) -> bool { self.events.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// (min_time, max_time), or None when empty.
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.min_time?, self.max_time?))
    }

    pub fn span_secs(&self) -> i64 {
        self.span().map(|(lo, hi)| (hi - lo).num_seconds()).unwrap_or(0)
    }

    /// All timestamps, ascending. Duplicates retained.
    pub fn sorted_timestamps(&self) -> Vec<DateTime<Utc>> {
        let mut ts: Vec<DateTime<Utc>> = self.events.iter().map(|e| e.timestamp).collect();
        ts.sort_unstable();
        ts
    }

    pub fn n_sources(&self) -> usize { self.by_source.len() }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.by_source.keys().map(|s| s.as_str())
    }

    pub fn events_for<'a>(&'a self, source: &str) -> impl Iterator<Item = &'a Event> + 'a {
        self.by_source
            .get(source)
            .into_iter()
            .flatten()
            .map(move |&i| &self.events[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(ts: &str, src: &str) -> Event {
        let ts = DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc);
        Event::new(ts, src, "GET", "/", 200)
    }

    #[test]
    fn test_tracks_span_out_of_order() {
        let store = EventStore::from_events(vec![
            ev("2024-01-02T00:00:00Z", "a"),
            ev("2024-01-01T00:00:00Z", "b"),
            ev("2024-01-03T12:00:00Z", "a"),
        ]);
        let (lo, hi) = store.span().unwrap();
        assert_eq!(lo.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(hi.to_rfc3339(), "2024-01-03T12:00:00+00:00");
        assert_eq!(store.span_secs(), 2 * 86_400 + 12 * 3600);
    }

    #[test]
    fn test_per_source_index() {
        let store = EventStore::from_events(vec![
            ev("2024-01-01T00:00:00Z", "a"),
            ev("2024-01-01T00:00:01Z", "b"),
            ev("2024-01-01T00:00:02Z", "a"),
        ]);
        assert_eq!(store.n_sources(), 2);
        assert_eq!(store.events_for("a").count(), 2);
        assert_eq!(store.events_for("missing").count(), 0);
    }

    #[test]
    fn test_empty_store() {
        let store = EventStore::new();
        assert!(store.is_empty());
        assert!(store.span().is_none());
        assert_eq!(store.span_secs(), 0);
        assert!(store.sorted_timestamps().is_empty());
    }
}
