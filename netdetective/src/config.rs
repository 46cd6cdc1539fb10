// netdetective/src/config.rs
//
// Analysis parameters. Defaults → optional JSON file → CLI flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::SECS_PER_DAY;

pub const DEFAULT_BUCKET_SECS: u32 = 5 * 60;
pub const DEFAULT_TOP_K:       usize = 10;
pub const DEFAULT_FULL_WEEK:   i64 = 7 * SECS_PER_DAY as i64;

// One-minute buckets keep a week at 10080 keys for the quadratic spike scan.
pub const MIN_BUCKET_SECS: u32 = 60;
pub const MAX_TOP_K:       usize = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bucket width {0}s must be at least 60s and divide a day evenly")]
    BucketWidth(u32),
    #[error("top-k {0} must be between 1 and 1000")]
    TopK(usize),
    #[error("full-week threshold {0}s must be positive")]
    FullWeek(i64),
    #[error("login path must not be empty")]
    LoginPath,
    #[error("failed to read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Time-of-day quantization width in seconds.
    pub bucket_width_secs: u32,
    /// Length of every ranked list (spikes, cyclic gaps, absolute gaps).
    pub top_k: usize,
    /// Observed spans at least this long use Monday-anchored, wrapping order.
    pub full_week_secs: i64,
    /// Path whose non-2xx responses count as failed logins.
    pub login_path: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            bucket_width_secs: DEFAULT_BUCKET_SECS,
            top_k:             DEFAULT_TOP_K,
            full_week_secs:    DEFAULT_FULL_WEEK,
            login_path:        "/login".into(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path).await
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text, path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = self.bucket_width_secs;
        if w < MIN_BUCKET_SECS || SECS_PER_DAY % w != 0 {
            return Err(ConfigError::BucketWidth(w));
        }
        if !(1..=MAX_TOP_K).contains(&self.top_k) {
            return Err(ConfigError::TopK(self.top_k));
        }
        if self.full_week_secs <= 0 {
            return Err(ConfigError::FullWeek(self.full_week_secs));
        }
        if self.login_path.trim().is_empty() { return Err(ConfigError::LoginPath); }
        Ok(())
    }
}
