// netdetective/src/detectors/spikes.rs
//
// Activity spike finder: exhaustive interval scan over the sorted cyclic keys.
//
// Every contiguous run keys[i..=j] is a candidate. Density is
//
//     total_requests / span_secs / observed_days
//
// where observed_days is the largest distinct-day count of any key in the run
// (not a sum). Runs are ranked by density, then by total requests.
//
// Singletons are emitted only when they cannot extend into their successor;
// a singleton whose next key is the adjacent bucket is already covered by the
// longer runs that start at it.
//
// O(n²) in the number of distinct keys, bounded by one week of buckets
// (2016 at the default 5-minute width).

use std::cmp::Ordering;

use tracing::debug;

use crate::engine::ranking::BoundedRanking;
use crate::events::{week_distance, Spike, TIME_UNIT_SECS};
use crate::state::histogram::CyclicHistogram;

fn rank(a: &Spike, b: &Spike) -> Ordering {
    a.avg_rps_per_day
        .total_cmp(&b.avg_rps_per_day)
        .then(a.total_requests.cmp(&b.total_requests))
}

pub fn find(hist: &CyclicHistogram, top_k: usize) -> Vec<Spike> {
    let width     = hist.bucket_width();
    let reference = hist.ordering().reference;
    let entries   = hist.sorted_entries();
    let n         = entries.len();

    let mut ranking    = BoundedRanking::new(top_k, rank);
    let mut candidates = 0usize;

    for i in 0..n {
        let (start, _) = entries[i];
        let start_ord  = start.ordinal(reference);
        let mut total  = 0u64;
        let mut days   = 0u32;

        for j in i..n {
            let (end, entry) = entries[j];
            total += entry.occurrences;
            days   = days.max(entry.distinct_days);

            let singleton = i == j;
            if singleton {
                let extends = entries.get(i + 1)
                    .map(|(next, _)| week_distance(start.week_offset(), next.week_offset()) == width)
                    .unwrap_or(false);
                if extends { continue; }
            }

            // Inclusive span: end bucket runs to its last second.
            let span_secs = (end.ordinal(reference) - start_ord + width) as i64;
            if span_secs <= 0 || days == 0 { continue; }

            candidates += 1;
            ranking.insert(Spike {
                start,
                end:             end.advance(width - TIME_UNIT_SECS),
                span_secs,
                total_requests:  total,
                observed_days:   days,
                avg_rps_per_day: total as f64 / span_secs as f64 / days as f64,
                singleton,
            });
        }
    }

    debug!("spikes: {} keys, {} candidates, kept {}", n, candidates, ranking.len());
    ranking.into_vec()
}
