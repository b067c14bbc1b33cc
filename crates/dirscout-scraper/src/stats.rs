//! Session counters and the end-of-run report.
//!
//! One [`ScrapeStats`] is shared across the fetch coordinator and every
//! source task, so counters are atomics and the error log sits behind a
//! `std::sync::Mutex` (held only for a push, never across `.await`).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One recorded failure, attributed to the source that hit it.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEntry {
    pub at: DateTime<Utc>,
    pub source: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ScrapeStats {
    requests_made: AtomicU64,
    requests_ok: AtomicU64,
    requests_failed: AtomicU64,
    requests_blocked: AtomicU64,
    cache_hits: AtomicU64,
    pages_fetched: AtomicU64,
    records_per_source: Mutex<BTreeMap<String, u64>>,
    errors: Mutex<Vec<ErrorEntry>>,
    started: Instant,
}

impl Default for ScrapeStats {
    fn default() -> Self {
        Self {
            requests_made: AtomicU64::new(0),
            requests_ok: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            requests_blocked: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            pages_fetched: AtomicU64::new(0),
            records_per_source: Mutex::new(BTreeMap::new()),
            errors: Mutex::new(Vec::new()),
            started: Instant::now(),
        }
    }
}

impl ScrapeStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_ok(&self) {
        self.requests_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// A 403/429 style rejection, counted separately from plain failures.
    pub fn record_request_blocked(&self) {
        self.requests_blocked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_records(&self, source: &str, count: u64) {
        let mut per_source = self
            .records_per_source
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *per_source.entry(source.to_owned()).or_insert(0) += count;
    }

    pub fn record_error(&self, source: &str, message: impl Into<String>) {
        let mut errors = self
            .errors
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        errors.push(ErrorEntry {
            at: Utc::now(),
            source: source.to_owned(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn requests_made(&self) -> u64 {
        self.requests_made.load(Ordering::Relaxed)
    }

    /// Snapshot the counters into a serializable report.
    #[must_use]
    pub fn report(&self, total_records: u64) -> ScrapeReport {
        let records_per_source = self
            .records_per_source
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        let errors = self
            .errors
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        let requests_made = self.requests_made.load(Ordering::Relaxed);
        let requests_ok = self.requests_ok.load(Ordering::Relaxed);
        #[allow(clippy::cast_precision_loss)]
        let success_rate = if requests_made == 0 {
            1.0
        } else {
            requests_ok as f64 / requests_made as f64
        };
        ScrapeReport {
            requests_made,
            requests_ok,
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            requests_blocked: self.requests_blocked.load(Ordering::Relaxed),
            success_rate,
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            total_records,
            records_per_source,
            error_count: errors.len() as u64,
            errors,
            duration_secs: self.started.elapsed().as_secs_f64(),
        }
    }
}

/// Immutable summary of a finished session, suitable for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub requests_made: u64,
    pub requests_ok: u64,
    pub requests_failed: u64,
    pub requests_blocked: u64,
    pub success_rate: f64,
    pub cache_hits: u64,
    pub pages_fetched: u64,
    pub total_records: u64,
    pub records_per_source: BTreeMap<String, u64>,
    pub error_count: u64,
    pub errors: Vec<ErrorEntry>,
    pub duration_secs: f64,
}
