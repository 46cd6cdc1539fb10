// netdetective/src/ingest.rs
//
// Access-log ingestion. One record per line:
//
//   2024-01-01T08:00:00,192.168.1.10,POST /login,401
//   <timestamp>,<source address>,<METHOD path>,<status>
//
// Timestamps without an offset are UTC. Blank lines are skipped but keep
// their line number. The first malformed line aborts the whole file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{error, info};

use crate::events::Event;
use crate::state::store::EventStore;

const FIELD_COUNT: usize = 4;
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Path argument that selects stdin.
pub const STDIN_PATH: &str = "-";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("line {line}: expected 4 fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: invalid timestamp {value:?}")]
    Timestamp { line: usize, value: String },
    #[error("line {line}: empty source address")]
    Address { line: usize },
    #[error("line {line}: expected \"METHOD path\", got {value:?}")]
    MethodPath { line: usize, value: String },
    #[error("line {line}: invalid status code {value:?}")]
    Status { line: usize, value: String },
}

fn parse_timestamp(line: usize, raw: &str) -> Result<DateTime<Utc>, IngestError> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT) {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| IngestError::Timestamp { line, value: raw.to_string() })
}

fn parse_status(line: usize, raw: &str) -> Result<u16, IngestError> {
    raw.parse::<u16>()
        .ok()
        .filter(|s| (100..=599).contains(s))
        .ok_or_else(|| IngestError::Status { line, value: raw.to_string() })
}

/// Parse one physical line. `Ok(None)` for blank lines.
pub fn parse_line(line_no: usize, text: &str) -> Result<Option<Event>, IngestError> {
    let text = text.trim();
    if text.is_empty() { return Ok(None); }

    let fields: Vec<&str> = text.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    if fields.len() != FIELD_COUNT {
        return Err(IngestError::FieldCount { line: line_no, found: fields.len() });
    }

    let timestamp = parse_timestamp(line_no, fields[0])?;

    let address = fields[1];
    if address.is_empty() {
        return Err(IngestError::Address { line: line_no });
    }

    let request: Vec<&str> = fields[2].split_whitespace().collect();
    let [method, path] = request.as_slice() else {
        return Err(IngestError::MethodPath { line: line_no, value: fields[2].to_string() });
    };

    let status = parse_status(line_no, fields[3])?;

    Ok(Some(Event::new(timestamp, address, method.to_uppercase(), *path, status)))
}

/// Parse a whole log held in memory.
pub fn parse_str(text: &str) -> Result<EventStore, IngestError> {
    let mut events = Vec::new();
    let mut lines  = 0usize;
    for (idx, line) in text.lines().enumerate() {
        lines = idx + 1;
        events.extend(parse_line(lines, line)?);
    }
    info!("processed {} lines of log input with {} data points", lines, events.len());
    Ok(EventStore::from_events(events))
}

/// Read a whole log from stdin.
pub async fn load_stdin() -> Result<EventStore, IngestError> {
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await
        .map_err(|source| IngestError::Io { path: PathBuf::from(STDIN_PATH), source })?;
    parse_str(&text)
}

/// Stream a log file line by line into a fresh store.
pub async fn load_file(path: &Path) -> Result<EventStore, IngestError> {
    let io_err = |source: std::io::Error| IngestError::Io { path: path.to_path_buf(), source };

    let file      = tokio::fs::File::open(path).await.map_err(io_err)?;
    let mut lines = BufReader::new(file).lines();
    let mut store = EventStore::new();
    let mut count = 0usize;

    info!("Reading {}", path.display());
    while let Some(line) = lines.next_line().await.map_err(io_err)? {
        count += 1;
        match parse_line(count, &line) {
            Ok(Some(event)) => store.push(event),
            Ok(None)        => {}
            Err(e) => {
                error!("{}: {}", path.display(), e);
                return Err(e);
            }
        }
    }

    info!("processed {} lines of log input with {} data points", count, store.len());
    Ok(store)
}
