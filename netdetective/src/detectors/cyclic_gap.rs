// netdetective/src/detectors/cyclic_gap.rs
//
// Recurring quiet windows, weekly slots that never saw traffic.
//
// Walks consecutive pairs of the sorted cyclic keys. When the forward distance
// between two keys exceeds one bucket, the slots in between are silent:
//
//     gap = [prev + width, curr - 1s],   span = distance - width
//
// Start and end carry across midnight and across Sunday → Monday. With a week
// or more of data the walk is cyclic and the last key is also paired with the
// first.

use std::cmp::Ordering;

use tracing::debug;

use crate::engine::ranking::BoundedRanking;
use crate::events::{week_distance, CyclicGap, CyclicKey, SECS_PER_WEEK, TIME_UNIT_SECS};
use crate::state::histogram::CyclicHistogram;

fn rank(a: &CyclicGap, b: &CyclicGap) -> Ordering {
    a.span_secs.cmp(&b.span_secs)
}

/// Gap between two keys, or None if they are adjacent buckets.
fn gap_between(prev: CyclicKey, curr: CyclicKey, width: u32) -> Option<CyclicGap> {
    let mut distance = week_distance(prev.week_offset(), curr.week_offset());
    if distance == 0 {
        // Only reachable on the cyclic closing pair of a single-key week.
        distance = SECS_PER_WEEK;
    }
    if distance <= width { return None; }

    Some(CyclicGap {
        start:     prev.advance(width),
        end:       curr.retreat(TIME_UNIT_SECS),
        span_secs: (distance - width) as i64,
    })
}

pub fn find(hist: &CyclicHistogram, top_k: usize) -> Vec<CyclicGap> {
    let width = hist.bucket_width();
    let keys  = hist.sorted_keys();

    let mut pairs: Vec<(CyclicKey, CyclicKey)> = keys.windows(2).map(|w| (w[0], w[1])).collect();
    if hist.ordering().wraps {
        if let (Some(&last), Some(&first)) = (keys.last(), keys.first()) {
            pairs.push((last, first));
        }
    }

    let mut ranking = BoundedRanking::new(top_k, rank);
    let mut candidates = 0usize;
    for (prev, curr) in pairs {
        if let Some(gap) = gap_between(prev, curr, width) {
            candidates += 1;
            ranking.insert(gap);
        }
    }

    debug!("cyclic gaps: {} keys, {} candidates, kept {}", keys.len(), candidates, ranking.len());
    ranking.into_vec()
}
