// netdetective/src/engine/mod.rs
//
// Analysis pass: EventStore in, AnalysisReport out.
//
//   EventStore ─┬─ CyclicHistogram ─┬─ spikes
//               │                   └─ cyclic gaps
//               ├─ absolute gaps
//               ├─ entity profiles (accumulate → cross-weight)
//               └─ per-source summary
//
// Everything is rebuilt from scratch on each call. An empty store yields an
// empty report; nothing here can fail.

pub mod ranking;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::detectors::{absolute_gap, cyclic_gap, entity, sources, spikes};
use crate::events::{format_span, AbsoluteGap, CyclicGap, SourceSummary, Spike};
use crate::state::histogram::{CyclicHistogram, WeekOrdering};
use crate::state::store::EventStore;

#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub span:                Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub ordering:            Option<WeekOrdering>,
    pub bucket_width_secs:   u32,
    pub total_requests:      usize,
    pub total_failed_logins: u64,
    pub sources:             Vec<SourceSummary>,
    pub spikes:              Vec<Spike>,
    pub cyclic_gaps:         Vec<CyclicGap>,
    pub absolute_gaps:       Vec<AbsoluteGap>,
    pub profiles:            entity::Profiles,
}

impl AnalysisReport {
    pub fn is_empty(&self) -> bool { self.total_requests == 0 }
}

pub fn analyze(store: &EventStore, config: &AnalysisConfig) -> AnalysisReport {
    let width = config.bucket_width_secs;

    let Some(hist) = CyclicHistogram::from_store(store, width, config.full_week_secs) else {
        debug!("empty store, skipping analysis");
        return AnalysisReport { bucket_width_secs: width, ..Default::default() };
    };

    let report = AnalysisReport {
        span:                store.span(),
        ordering:            Some(hist.ordering()),
        bucket_width_secs:   width,
        total_requests:      store.len(),
        total_failed_logins: sources::total_failed_logins(store, &config.login_path),
        sources:             sources::summarize(store, &config.login_path),
        spikes:              spikes::find(&hist, config.top_k),
        cyclic_gaps:         cyclic_gap::find(&hist, config.top_k),
        absolute_gaps:       absolute_gap::find(store, config.top_k),
        profiles:            entity::build(store, width),
    };

    info!(
        "analyzed {} events from {} sources over {}: {} spikes, {} cyclic gaps, {} absolute gaps",
        report.total_requests, store.n_sources(), format_span(store.span_secs()),
        report.spikes.len(), report.cyclic_gaps.len(), report.absolute_gaps.len()
    );
    report
}
