// netdetective/src/events.rs
//
// Shared event types and all domain types flowing through netdetective.
//
// Time-of-week arithmetic is done on plain integers: a cyclic slot is an
// offset in seconds from Monday 00:00, in 0..SECS_PER_WEEK. Weekday carry and
// midnight crossings fall out of modular arithmetic on that offset.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc, Weekday};
use serde::Serialize;

pub const SECS_PER_DAY:  u32 = 24 * 60 * 60;
pub const SECS_PER_WEEK: u32 = 7 * SECS_PER_DAY;

/// Smallest time step. Inclusive range ends sit one unit before the next slot.
pub const TIME_UNIT_SECS: u32 = 1;

/// Monday-first weekday table, indexed by `num_days_from_monday()`.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// 1970-01-01 was a Thursday.
const EPOCH_DAY_FROM_MONDAY: i64 = 3;

// ── Ingested event ────────────────────────────────────────────────────────────

/// One validated access-log record. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub timestamp:      DateTime<Utc>,
    pub source_address: String,
    pub method:         String,
    pub path:           String,
    pub status_code:    u16,
}

impl Event {
    pub fn new(
        timestamp: DateTime<Utc>,
        source_address: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self {
            timestamp,
            source_address: source_address.into(),
            method: method.into(),
            path: path.into(),
            status_code,
        }
    }

    /// Leading digit 2 counts as success; everything else is a failure.
    pub fn succeeded(&self) -> bool {
        self.status_code / 100 == 2
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint { method: self.method.clone(), path: self.path.clone() }
    }
}

/// (method, path) pair an outcome is accumulated under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Endpoint {
    pub method: String,
    pub path:   String,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

// ── Cyclic keys ───────────────────────────────────────────────────────────────

/// Recurring weekly slot: weekday plus quantized time of day (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CyclicKey {
    pub weekday:     Weekday,
    pub time_of_day: u32,
}

impl CyclicKey {
    pub fn new(weekday: Weekday, time_of_day: u32) -> Self {
        Self { weekday, time_of_day }
    }

    /// Wraps any offset into the week.
    pub fn from_week_offset(offset: u32) -> Self {
        let offset = offset % SECS_PER_WEEK;
        Self {
            weekday:     WEEKDAYS[(offset / SECS_PER_DAY) as usize],
            time_of_day: offset % SECS_PER_DAY,
        }
    }

    /// Seconds since Monday 00:00.
    pub fn week_offset(&self) -> u32 {
        self.weekday.num_days_from_monday() * SECS_PER_DAY + self.time_of_day
    }

    /// Seconds since 00:00 of `reference`, wrapping across the week boundary.
    pub fn ordinal(&self, reference: Weekday) -> u32 {
        week_distance(reference_offset(reference), self.week_offset())
    }

    /// Key `secs` later, rolling the weekday forward (Sun → Mon) if needed.
    pub fn advance(&self, secs: u32) -> Self {
        Self::from_week_offset(self.week_offset() + secs % SECS_PER_WEEK)
    }

    /// Key `secs` earlier, rolling the weekday backward (Mon → Sun) if needed.
    pub fn retreat(&self, secs: u32) -> Self {
        Self::from_week_offset(self.week_offset() + SECS_PER_WEEK - secs % SECS_PER_WEEK)
    }
}

impl std::fmt::Display for CyclicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.weekday, clock(self.time_of_day))
    }
}

fn reference_offset(reference: Weekday) -> u32 {
    reference.num_days_from_monday() * SECS_PER_DAY
}

/// Forward distance from `from` to `to`, both week offsets.
pub fn week_distance(from: u32, to: u32) -> u32 {
    (to + SECS_PER_WEEK - from % SECS_PER_WEEK) % SECS_PER_WEEK
}

/// Round-half-up to the nearest multiple of `width`.
pub fn round_to_bucket(secs: i64, width: u32) -> i64 {
    let w = width as i64;
    (2 * secs + w).div_euclid(2 * w) * w
}

/// Quantize a timestamp onto its cyclic slot. Rounding may carry an event
/// into the adjacent day (23:58 → next day 00:00 for 5-minute buckets); the
/// weekday follows.
pub fn bucket(ts: &DateTime<Utc>, width: u32) -> CyclicKey {
    let rounded = round_to_bucket(ts.timestamp(), width);
    let day     = rounded.div_euclid(SECS_PER_DAY as i64);
    let tod     = rounded.rem_euclid(SECS_PER_DAY as i64) as u32;
    let weekday = WEEKDAYS[(day + EPOCH_DAY_FROM_MONDAY).rem_euclid(7) as usize];
    CyclicKey::new(weekday, tod)
}

/// Render seconds-of-day as HH:MM:SS.
pub fn clock(secs: u32) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

/// Millisecond variant of `format_span`; whole seconds render identically,
/// otherwise the seconds field gains a fraction (`1m2.500s`).
pub fn format_span_ms(ms: i64) -> String {
    let frac = ms.unsigned_abs() % 1000;
    let base = format_span(ms / 1000);
    if frac == 0 {
        return base;
    }
    let base = base.strip_suffix('s').unwrap_or(&base);
    let base = if ms < 0 && !base.starts_with('-') { format!("-{}", base) } else { base.to_string() };
    format!("{}.{:03}s", base, frac)
}

/// Render a span as e.g. `1d2h5m0s`, `15m0s`, `59s`.
pub fn format_span(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let s = secs.unsigned_abs();
    let (d, h, m, s) = (s / 86_400, s / 3600 % 24, s / 60 % 60, s % 60);
    if d > 0 {
        format!("{}{}d{}h{}m{}s", sign, d, h, m, s)
    } else if h > 0 {
        format!("{}{}h{}m{}s", sign, h, m, s)
    } else if m > 0 {
        format!("{}{}m{}s", sign, m, s)
    } else {
        format!("{}{}s", sign, s)
    }
}

// ── Analysis results ──────────────────────────────────────────────────────────

/// Contiguous run of cyclic keys ranked by request density.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spike {
    pub start:          CyclicKey,
    /// Inclusive end: last second of the final bucket in the run.
    pub end:            CyclicKey,
    pub span_secs:      i64,
    pub total_requests: u64,
    /// Normalizing day count (max distinct days over the run's keys).
    pub observed_days:  u32,
    pub avg_rps_per_day: f64,
    pub singleton:      bool,
}

/// Recurring weekly slot range with no observed traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CyclicGap {
    pub start:     CyclicKey,
    pub end:       CyclicKey,
    pub span_secs: i64,
}

/// Elapsed real time between two consecutive distinct timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbsoluteGap {
    pub start:        DateTime<Utc>,
    pub end:          DateTime<Utc>,
    pub elapsed_ms: i64,
}

// ── Entity profiles ───────────────────────────────────────────────────────────

/// Success/failure tally for one endpoint or weekday of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub succeeded:   u64,
    pub failed:      u64,
    pub min_time_of_day: u32,
    pub max_time_of_day: u32,
    /// Filled in by cross-weighting, zero until then.
    pub weight:      i64,
}

impl Outcome {
    pub fn first(succeeded: bool, time_of_day: u32) -> Self {
        let mut o = Self {
            succeeded: 0,
            failed: 0,
            min_time_of_day: time_of_day,
            max_time_of_day: time_of_day,
            weight: 0,
        };
        o.record(succeeded, time_of_day);
        o
    }

    pub fn record(&mut self, succeeded: bool, time_of_day: u32) {
        if succeeded { self.succeeded += 1; } else { self.failed += 1; }
        self.min_time_of_day = self.min_time_of_day.min(time_of_day);
        self.max_time_of_day = self.max_time_of_day.max(time_of_day);
    }
}

/// Per-source behavioral profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityProfile {
    pub by_endpoint: HashMap<Endpoint, Outcome>,
    pub by_weekday:  HashMap<Weekday, Outcome>,
}

impl EntityProfile {
    /// Endpoints in stable (method, path) order.
    pub fn endpoints_sorted(&self) -> Vec<(&Endpoint, &Outcome)> {
        let mut v: Vec<_> = self.by_endpoint.iter().collect();
        v.sort_by(|a, b| a.0.cmp(b.0));
        v
    }

    /// Weekdays Monday-first, skipping days with no traffic.
    pub fn weekdays_sorted(&self) -> Vec<(Weekday, &Outcome)> {
        WEEKDAYS.iter()
            .filter_map(|d| self.by_weekday.get(d).map(|o| (*d, o)))
            .collect()
    }

    pub fn total_weight(&self) -> i64 {
        self.by_endpoint.values().map(|o| o.weight).sum()
    }
}

// ── Per-source summary ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub address:       String,
    pub requests:      u64,
    pub failed:        u64,
    pub failed_logins: u64,
    pub status_counts: BTreeMap<u16, u64>,
    /// Any 401/403/404/500/503 returned to this source.
    pub unusual:       bool,
}
