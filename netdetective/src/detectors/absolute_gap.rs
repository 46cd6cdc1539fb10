// netdetective/src/detectors/absolute_gap.rs
//
// Largest real-time silences between consecutive distinct timestamps.
// Identical timestamps are collapsed first; zero-length gaps are never ranked.

use std::cmp::Ordering;

use tracing::debug;

use crate::engine::ranking::BoundedRanking;
use crate::events::AbsoluteGap;
use crate::state::store::EventStore;

fn rank(a: &AbsoluteGap, b: &AbsoluteGap) -> Ordering {
    a.elapsed_ms.cmp(&b.elapsed_ms)
}

pub fn find(store: &EventStore, top_k: usize) -> Vec<AbsoluteGap> {
    let mut stamps = store.sorted_timestamps();
    stamps.dedup();

    let mut ranking = BoundedRanking::new(top_k, rank);
    for w in stamps.windows(2) {
        if w[1] == w[0] { continue; }
        let elapsed = (w[1] - w[0]).num_milliseconds();
        ranking.insert(AbsoluteGap { start: w[0], end: w[1], elapsed_ms: elapsed });
    }

    debug!("absolute gaps: {} distinct timestamps, kept {}", stamps.len(), ranking.len());
    ranking.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, Duration, Utc};

    use crate::events::Event;

    fn store(stamps: Vec<DateTime<Utc>>) -> EventStore {
        EventStore::from_events(stamps.into_iter().map(|t| Event::new(t, "10.0.0.1", "GET", "/", 200)))
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_largest_gap_first() {
        let t = t0();
        let gaps = find(&store(vec![t + Duration::seconds(3600), t, t + Duration::seconds(1)]), 10);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].start, t + Duration::seconds(1));
        assert_eq!(gaps[0].end, t + Duration::seconds(3600));
        assert_eq!(gaps[0].elapsed_ms, 3_599_000);
        assert_eq!(gaps[1].elapsed_ms, 1_000);
    }

    #[test]
    fn test_duplicate_timestamps_skipped() {
        let t = t0();
        let gaps = find(&store(vec![t, t, t + Duration::seconds(5), t + Duration::seconds(5)]), 10);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].elapsed_ms, 5_000);
    }

    #[test]
    fn test_equal_gaps_keep_chronological_order() {
        let t = t0();
        let stamps = (0..4).map(|i| t + Duration::seconds(i * 60)).collect();
        let gaps = find(&store(stamps), 10);
        let starts: Vec<_> = gaps.iter().map(|g| g.start).collect();
        assert_eq!(starts, vec![t, t + Duration::seconds(60), t + Duration::seconds(120)]);
    }

    #[test]
    fn test_sub_second_gaps_ranked_exactly() {
        let t = t0();
        let gaps = find(&store(vec![
            t,
            t + Duration::milliseconds(400),
            t + Duration::milliseconds(2_300),
            t + Duration::milliseconds(3_500),
        ]), 10);
        let elapsed: Vec<i64> = gaps.iter().map(|g| g.elapsed_ms).collect();
        assert_eq!(elapsed, vec![1_900, 1_200, 400]);
    }

    #[test]
    fn test_bounded_and_degenerate() {
        let t = t0();
        let stamps = (0..30).map(|i| t + Duration::seconds(i * i)).collect();
        let gaps = find(&store(stamps), 10);
        assert_eq!(gaps.len(), 10);
        assert_eq!(gaps[0].elapsed_ms, (29 * 29 - 28 * 28) * 1000);

        assert!(find(&store(vec![t]), 10).is_empty());
        assert!(find(&EventStore::new(), 10).is_empty());
    }
}
