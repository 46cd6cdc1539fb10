// netdetective/src/detectors/sources.rs
//
// Per-source request and failure counts.
//
// Ranked by failed logins, then total requests, then address, so the sources
// most likely to be guessing credentials come first.

use std::collections::BTreeMap;

use crate::events::{Event, SourceSummary};
use crate::state::store::EventStore;

// Statuses that flag a source for the "unusual activity" table.
const UNUSUAL_STATUSES: &[u16] = &[401, 403, 404, 500, 503];

pub fn is_failed_login(event: &Event, login_path: &str) -> bool {
    event.path == login_path && !event.succeeded()
}

fn summarize_source(store: &EventStore, address: &str, login_path: &str) -> SourceSummary {
    let mut s = SourceSummary {
        address:       address.to_string(),
        requests:      0,
        failed:        0,
        failed_logins: 0,
        status_counts: BTreeMap::new(),
        unusual:       false,
    };
    for event in store.events_for(address) {
        s.requests += 1;
        if !event.succeeded() { s.failed += 1; }
        if is_failed_login(event, login_path) { s.failed_logins += 1; }
        *s.status_counts.entry(event.status_code).or_default() += 1;
        s.unusual |= UNUSUAL_STATUSES.contains(&event.status_code);
    }
    s
}

pub fn summarize(store: &EventStore, login_path: &str) -> Vec<SourceSummary> {
    let mut out: Vec<SourceSummary> = store.sources()
        .map(|addr| summarize_source(store, addr, login_path))
        .collect();
    out.sort_by(|a, b| {
        b.failed_logins.cmp(&a.failed_logins)
            .then(b.requests.cmp(&a.requests))
            .then_with(|| a.address.cmp(&b.address))
    });
    out
}

pub fn total_failed_logins(store: &EventStore, login_path: &str) -> u64 {
    store.iter().filter(|e| is_failed_login(e, login_path)).count() as u64
}
