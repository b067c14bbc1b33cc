//! One scraping session, end to end.
//!
//! A session owns its query, config, fetch state, and stats; nothing leaks
//! between sessions. Sources run as parallel tasks while each task walks
//! its own pages strictly in order, and results are concatenated in
//! source-completion order before aggregation.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;

use dirscout_core::{BusinessRecord, ScrapeConfig, SearchQuery};

use crate::aggregate::aggregate;
use crate::error::ScrapeError;
use crate::fetch::FetchCoordinator;
use crate::query::interpret;
use crate::sources::{all_adapters, walk_source, SourceAdapter};
use crate::stats::{ScrapeReport, ScrapeStats};
use crate::transport::{HttpTransport, Transport};

/// Which directory sites a session queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelector {
    All,
    One(String),
}

impl FromStr for SourceSelector {
    type Err = ScrapeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let lowered = raw.trim().to_lowercase();
        if lowered == "all" {
            return Ok(Self::All);
        }
        if all_adapters().iter().any(|a| a.name() == lowered) {
            return Ok(Self::One(lowered));
        }
        Err(ScrapeError::UnknownSource {
            name: raw.to_owned(),
        })
    }
}

/// Everything a finished session hands back to the caller.
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub query: SearchQuery,
    pub records: Vec<BusinessRecord>,
    pub report: ScrapeReport,
    /// The source selection the session ran with.
    pub selector: SourceSelector,
}

impl ScrapeOutcome {
    /// Remediation hints for an empty result set. "No results" is a
    /// distinct outcome from "errors occurred"; callers should surface the
    /// error count separately when it is non-zero.
    #[must_use]
    pub fn no_result_suggestions(&self) -> Vec<String> {
        if !self.records.is_empty() {
            return Vec::new();
        }
        let mut suggestions = Vec::new();
        if self.query.location.is_none() {
            suggestions.push(format!(
                "Add a location, e.g. \"{} in Mumbai\".",
                self.query.category
            ));
        }
        if matches!(self.selector, SourceSelector::One(_)) {
            suggestions.push("Search all platforms with --source all.".to_owned());
        }
        suggestions.push("Check the spelling of the business category.".to_owned());
        suggestions
    }
}

/// Runs a full session over the real HTTP transport.
///
/// # Errors
///
/// Fails only on misconfiguration-shaped problems: an empty category after
/// query interpretation, or an unknown source name. Network and parsing
/// failures are absorbed into the stats report instead.
pub async fn run_scrape(
    raw_query: &str,
    selector: &SourceSelector,
    config: ScrapeConfig,
) -> Result<ScrapeOutcome, ScrapeError> {
    let transport = Arc::new(HttpTransport::new(config.request_timeout_secs));
    run_scrape_with_transport(raw_query, selector, config, transport).await
}

/// Session runner with a pluggable transport, used directly by tests.
///
/// # Errors
///
/// Same contract as [`run_scrape`].
pub async fn run_scrape_with_transport(
    raw_query: &str,
    selector: &SourceSelector,
    config: ScrapeConfig,
    transport: Arc<dyn Transport>,
) -> Result<ScrapeOutcome, ScrapeError> {
    let query = interpret(raw_query);
    if query.category.trim().is_empty() {
        return Err(ScrapeError::EmptyQuery);
    }

    let adapters = selected_adapters(selector)?;
    tracing::info!(
        category = %query.category,
        location = query.location.as_deref().unwrap_or("-"),
        sources = adapters.len(),
        "starting scrape session"
    );

    let stats = Arc::new(ScrapeStats::new());
    let coordinator = Arc::new(FetchCoordinator::new(
        config.clone(),
        transport,
        Arc::clone(&stats),
    ));
    let deadline = Instant::now() + Duration::from_secs(config.session_timeout_secs);

    let mut walks: FuturesUnordered<_> = adapters
        .into_iter()
        .map(|adapter| {
            let query = query.clone();
            let config = config.clone();
            let coordinator = Arc::clone(&coordinator);
            let stats = Arc::clone(&stats);
            tokio::spawn(async move {
                walk_source(&*adapter, &query, &coordinator, &config, &stats, deadline).await
            })
        })
        .collect();

    // Completion order, not spawn order: faster sources land first.
    let mut collected = Vec::new();
    while let Some(joined) = walks.next().await {
        match joined {
            Ok(records) => collected.extend(records),
            Err(err) => {
                tracing::error!(error = %err, "source task panicked or was cancelled");
                stats.record_error("session", err.to_string());
            }
        }
    }

    let records = aggregate(collected);
    let report = stats.report(records.len() as u64);
    tracing::info!(
        records = records.len(),
        requests = report.requests_made,
        cache_hits = report.cache_hits,
        errors = report.error_count,
        "scrape session finished"
    );

    Ok(ScrapeOutcome {
        query,
        records,
        report,
        selector: selector.clone(),
    })
}

fn selected_adapters(
    selector: &SourceSelector,
) -> Result<Vec<Box<dyn SourceAdapter>>, ScrapeError> {
    let mut adapters = all_adapters();
    match selector {
        SourceSelector::All => Ok(adapters),
        SourceSelector::One(name) => {
            adapters.retain(|a| a.name() == name);
            if adapters.is_empty() {
                return Err(ScrapeError::UnknownSource { name: name.clone() });
            }
            Ok(adapters)
        }
    }
}
