// netdetective/src/state/histogram.rs
//
// Cyclic weekly histogram.
//
// Every event is folded onto a (weekday, time-of-day bucket) key. Two counts
// are kept per key:
//   occurrences   every event mapped to the key
//   distinct_days calendar days that contributed at least one event to it
//
// Key ordering depends on how much time the log covers. A week or more of data
// is walked Monday-first and treated as cyclic; anything shorter is walked
// from the weekday of the earliest event with no wraparound.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use tracing::debug;

use crate::events::{bucket, CyclicKey};
use crate::state::store::EventStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistogramEntry {
    pub occurrences:   u64,
    pub distinct_days: u32,
}

/// Reference weekday for sorting keys, and whether the week is cyclic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekOrdering {
    pub reference: Weekday,
    pub wraps:     bool,
}

impl WeekOrdering {
    pub fn for_span(min_time: DateTime<Utc>, max_time: DateTime<Utc>, full_week_secs: i64) -> Self {
        if (max_time - min_time).num_seconds() >= full_week_secs {
            Self { reference: Weekday::Mon, wraps: true }
        } else {
            Self { reference: min_time.weekday(), wraps: false }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CyclicHistogram {
    bucket_width: u32,
    ordering:     WeekOrdering,
    entries:      HashMap<CyclicKey, HistogramEntry>,
}

impl CyclicHistogram {
    pub fn new(bucket_width: u32, ordering: WeekOrdering) -> Self {
        Self { bucket_width, ordering, entries: HashMap::new() }
    }

    /// Both passes over a store. None when the store is empty.
    pub fn from_store(store: &EventStore, bucket_width: u32, full_week_secs: i64) -> Option<Self> {
        let (lo, hi) = store.span()?;
        let ordering = WeekOrdering::for_span(lo, hi, full_week_secs);
        let mut hist = Self::new(bucket_width, ordering);

        for event in store.iter() {
            hist.observe(&event.timestamp);
        }
        hist.mark_distinct_days(&store.sorted_timestamps());

        debug!(
            "histogram: {} keys from {} events, reference={} wraps={}",
            hist.len(), hist.total_occurrences(), ordering.reference, ordering.wraps
        );
        Some(hist)
    }

    pub fn observe(&mut self, ts: &DateTime<Utc>) {
        let key = bucket(ts, self.bucket_width);
        self.entries.entry(key).or_default().occurrences += 1;
    }

    /// Walk ascending timestamps and credit a key once per calendar day that
    /// contributes to it. A contribution starts whenever the event's own
    /// calendar day or the quantized time of day differs from the previous
    /// timestamp's. The day is taken before rounding, so Mon 23:58 and
    /// Tue 00:01 are two contributions to Tue 00:00.
    /// Call once, after every event has been observed.
    pub fn mark_distinct_days(&mut self, sorted: &[DateTime<Utc>]) {
        let mut prev: Option<(NaiveDate, u32)> = None;
        for ts in sorted {
            let key  = bucket(ts, self.bucket_width);
            let slot = (ts.date_naive(), key.time_of_day);
            if prev == Some(slot) { continue; }
            prev = Some(slot);

            match self.entries.get_mut(&key) {
                Some(entry) => entry.distinct_days += 1,
                None => debug!("distinct-day pass saw unobserved key {}", key),
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn bucket_width(&self) -> u32 { self.bucket_width }
    pub fn ordering(&self) -> WeekOrdering { self.ordering }
    pub fn len(&self) -> usize { self.entries.len() }

    #[cfg(test)]
    pub fn get(&self, key: &CyclicKey) -> Option<&HistogramEntry> {
        self.entries.get(key)
    }

    pub fn total_occurrences(&self) -> u64 {
        self.entries.values().map(|e| e.occurrences).sum()
    }

    /// Distinct keys sorted by (weekday rotated to the reference, time of day).
    pub fn sorted_keys(&self) -> Vec<CyclicKey> {
        let reference = self.ordering.reference;
        let mut keys: Vec<CyclicKey> = self.entries.keys().copied().collect();
        keys.sort_by_key(|k| k.ordinal(reference));
        keys
    }

    /// Sorted keys paired with their entries.
    pub fn sorted_entries(&self) -> Vec<(CyclicKey, HistogramEntry)> {
        self.sorted_keys()
            .into_iter()
            .map(|k| (k, self.entries[&k]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn store(stamps: &[&str]) -> EventStore {
        EventStore::from_events(stamps.iter().map(|s| Event::new(at(s), "10.0.0.1", "GET", "/", 200)))
    }

    #[test]
    fn test_occurrences_sum_to_event_count() {
        let s = store(&[
            "2024-01-01T10:00:00Z", "2024-01-01T10:01:00Z", "2024-01-01T10:04:00Z",
            "2024-01-02T23:59:00Z", "2024-01-05T06:30:00Z", "2024-01-05T06:30:00Z",
        ]);
        let h = CyclicHistogram::from_store(&s, 300, 7 * 86_400).unwrap();
        assert_eq!(h.total_occurrences(), s.len() as u64);
    }

    #[test]
    fn test_distinct_days_count_calendar_days_not_events() {
        let s = store(&[
            "2024-01-01T10:00:10Z",
            "2024-01-01T10:01:00Z",
            "2024-01-08T10:00:30Z",
        ]);
        let h = CyclicHistogram::from_store(&s, 300, 7 * 86_400).unwrap();
        let e = h.get(&CyclicKey::new(Weekday::Mon, 36_000)).unwrap();
        assert_eq!(e.occurrences, 3);
        assert_eq!(e.distinct_days, 2);
    }

    #[test]
    fn test_distinct_days_use_calendar_day_before_rounding() {
        let s = store(&["2024-01-01T23:58:00Z", "2024-01-02T00:01:00Z"]);
        let h = CyclicHistogram::from_store(&s, 300, 7 * 86_400).unwrap();
        let e = h.get(&CyclicKey::new(Weekday::Tue, 0)).unwrap();
        assert_eq!(e.occurrences, 2);
        assert_eq!(e.distinct_days, 2);
    }

    #[test]
    fn test_every_observed_key_has_a_day() {
        let s = store(&[
            "2024-01-01T00:00:00Z", "2024-01-01T23:58:00Z", "2024-01-02T00:01:00Z",
            "2024-01-03T12:02:31Z", "2024-01-03T12:07:29Z",
        ]);
        let h = CyclicHistogram::from_store(&s, 300, 7 * 86_400).unwrap();
        for (_, e) in h.sorted_entries() {
            assert!(e.occurrences >= 1);
            assert!(e.distinct_days >= 1);
        }
    }

    #[test]
    fn test_partial_week_orders_from_first_weekday() {
        // Friday → Monday, under a week: Fri, Sat, Sun, Mon order.
        let s = store(&[
            "2024-01-05T09:00:00Z", "2024-01-06T09:00:00Z",
            "2024-01-07T09:00:00Z", "2024-01-08T09:00:00Z",
        ]);
        let h = CyclicHistogram::from_store(&s, 300, 7 * 86_400).unwrap();
        assert_eq!(h.ordering(), WeekOrdering { reference: Weekday::Fri, wraps: false });
        let days: Vec<Weekday> = h.sorted_keys().iter().map(|k| k.weekday).collect();
        assert_eq!(days, vec![Weekday::Fri, Weekday::Sat, Weekday::Sun, Weekday::Mon]);
    }

    #[test]
    fn test_full_week_orders_from_monday() {
        let s = store(&["2024-01-05T09:00:00Z", "2024-01-12T09:00:00Z", "2024-01-08T09:00:00Z"]);
        let h = CyclicHistogram::from_store(&s, 300, 7 * 86_400).unwrap();
        assert_eq!(h.ordering(), WeekOrdering { reference: Weekday::Mon, wraps: true });
        let days: Vec<Weekday> = h.sorted_keys().iter().map(|k| k.weekday).collect();
        assert_eq!(days, vec![Weekday::Mon, Weekday::Fri]);
    }

    #[test]
    fn test_empty_store_builds_nothing() {
        assert!(CyclicHistogram::from_store(&EventStore::new(), 300, 7 * 86_400).is_none());
    }
}
