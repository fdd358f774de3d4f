//! Concurrent fan-out to every registered fetcher, then one merge.
//!
//! Each fetcher runs in its own task under a fixed time limit. A fetcher that
//! errors, panics or runs out of time contributes nothing; its siblings keep
//! running. Results are only merged after every task has resolved, by this
//! single control path, so the merge buffer needs no locking. Dropping a run
//! before it finishes aborts every fetcher task it spawned.
//!
//! Merge order is registration order, then the order each fetcher discovered
//! its results. When two records share a link, the first one in that order is
//! kept.

use crate::models::{CandidateResource, Category, RankingRequest};
use crate::scrapers::SourceFetcher;
use futures::future::join_all;
use itertools::Itertools;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Runs all registered fetchers for a request and merges their output.
#[derive(Clone)]
pub struct ScrapeOrchestrator {
    fetchers: Vec<Arc<dyn SourceFetcher>>,
    timeout: Duration,
}

impl ScrapeOrchestrator {
    /// `fetchers` are registered in merge-priority order.
    pub fn new(fetchers: Vec<Arc<dyn SourceFetcher>>, timeout: Duration) -> Self {
        Self { fetchers, timeout }
    }

    pub fn categories(&self) -> Vec<Category> {
        self.fetchers.iter().map(|f| f.category()).collect()
    }

    /// Fetch from every source concurrently and return the deduplicated merge.
    ///
    /// Never fails: if every source fails the result is simply empty.
    #[instrument(level = "info", skip_all, fields(topic = %request.topic(), level = %request.level()))]
    pub async fn orchestrate(&self, request: &RankingRequest) -> Vec<CandidateResource> {
        let t0 = Instant::now();
        let tasks = self.fetchers.iter().map(|fetcher| {
            let category = fetcher.category();
            let fetcher = Arc::clone(fetcher);
            let request = request.clone();
            let task = AbortOnDrop(tokio::spawn(async move { fetcher.fetch(&request).await }));
            await_fetcher(category, task, self.timeout)
        });

        let batches = join_all(tasks).await;
        let fetched: usize = batches.iter().map(Vec::len).sum();
        let merged = merge(batches);

        info!(
            fetchers = self.fetchers.len(),
            fetched,
            unique = merged.len(),
            duplicates = fetched - merged.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Merged fetcher results"
        );
        merged
    }
}

/// A spawned fetcher task that is aborted when its owner goes away.
struct AbortOnDrop(JoinHandle<Vec<CandidateResource>>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Wait for one fetcher task, degrading every failure to an empty list.
async fn await_fetcher(
    category: Category,
    mut task: AbortOnDrop,
    limit: Duration,
) -> Vec<CandidateResource> {
    let t0 = Instant::now();
    match tokio::time::timeout(limit, &mut task.0).await {
        Ok(Ok(found)) => {
            debug!(
                %category,
                count = found.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Fetcher finished"
            );
            found
        }
        Ok(Err(e)) => {
            error!(%category, error = %e, "Fetcher task failed; continuing without it");
            Vec::new()
        }
        Err(_) => {
            warn!(
                %category,
                timeout_ms = limit.as_millis() as u64,
                "Fetcher timed out; discarding its results"
            );
            Vec::new()
        }
    }
}

/// Flatten batches in order, keeping the first record for each link.
pub fn merge(batches: Vec<Vec<CandidateResource>>) -> Vec<CandidateResource> {
    batches
        .into_iter()
        .flatten()
        .unique_by(|c| c.link().to_string())
        .collect()
}
