// netdetective/src/detectors/entity.rs
//
// Cross-source endpoint weighting.
//
// Phase 1 (accumulate): one profile per source address, with an Outcome per
// (method, path) and per weekday. 2xx is success, anything else is failure;
// each outcome also tracks the quantized time-of-day range it was seen in.
// Weekday and time of day come from the bucketed instant, as in the histogram.
//
// Phase 2 (cross-weight): for every ordered pair of distinct sources (A, B)
// and every key A has:
//   B has the key, A.succeeded > 0 and B.succeeded > 0  →  A.weight += B.succeeded
//   A.failed > 0                                        →  A.weight -= A.failed
//
// Corroboration needs the key and success on both sides. The failure penalty
// is charged once per peer, whether or not the peer ever touched the key.
//
// O(E² · P) over E sources with P keys each. Batch use only.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use tracing::debug;

use crate::events::{bucket, EntityProfile, Outcome};
use crate::state::store::EventStore;

pub type Profiles = BTreeMap<String, EntityProfile>;

/// Phase 1.
pub fn accumulate(store: &EventStore, bucket_width: u32) -> Profiles {
    let mut profiles = Profiles::new();
    for event in store.iter() {
        let key     = bucket(&event.timestamp, bucket_width);
        let tod     = key.time_of_day;
        let ok      = event.succeeded();
        let profile = profiles.entry(event.source_address.clone()).or_default();

        profile.by_endpoint
            .entry(event.endpoint())
            .and_modify(|o| o.record(ok, tod))
            .or_insert_with(|| Outcome::first(ok, tod));
        profile.by_weekday
            .entry(key.weekday)
            .and_modify(|o| o.record(ok, tod))
            .or_insert_with(|| Outcome::first(ok, tod));
    }
    profiles
}

/// Weight deltas for every (source, key) under the pairwise rule.
fn deltas<K, F>(profiles: &Profiles, table: F) -> Vec<(String, K, i64)>
where
    K: Eq + Hash + Clone,
    F: Fn(&EntityProfile) -> &HashMap<K, Outcome>,
{
    let mut out = Vec::new();
    for (a_addr, a) in profiles {
        let a_table = table(a);
        for (key, a_out) in a_table {
            let mut delta = 0i64;
            for (b_addr, b) in profiles {
                if b_addr == a_addr { continue; }

                if a_out.failed > 0 {
                    delta -= a_out.failed as i64;
                }
                let Some(b_out) = table(b).get(key) else { continue };
                if a_out.succeeded > 0 && b_out.succeeded > 0 {
                    delta += b_out.succeeded as i64;
                }
            }
            if delta != 0 {
                out.push((a_addr.clone(), key.clone(), delta));
            }
        }
    }
    out
}

/// Phase 2. Weights are recomputed from zero, so repeated calls agree.
pub fn cross_weight(profiles: &mut Profiles) {
    for p in profiles.values_mut() {
        p.by_endpoint.values_mut().for_each(|o| o.weight = 0);
        p.by_weekday.values_mut().for_each(|o| o.weight = 0);
    }

    let endpoint_deltas = deltas(profiles, |p| &p.by_endpoint);
    let weekday_deltas  = deltas(profiles, |p| &p.by_weekday);

    for (addr, key, d) in endpoint_deltas {
        if let Some(o) = profiles.get_mut(&addr).and_then(|p| p.by_endpoint.get_mut(&key)) {
            o.weight += d;
        }
    }
    for (addr, key, d) in weekday_deltas {
        if let Some(o) = profiles.get_mut(&addr).and_then(|p| p.by_weekday.get_mut(&key)) {
            o.weight += d;
        }
    }

    debug!("cross-weighted {} profiles", profiles.len());
}

/// Both phases.
pub fn build(store: &EventStore, bucket_width: u32) -> Profiles {
    let mut profiles = accumulate(store, bucket_width);
    cross_weight(&mut profiles);
    profiles
}
