//! One ranking run: fan out to the sources, then score and balance.

use crate::config::Settings;
use crate::error::FetchError;
use crate::models::{RankingRequest, ScrapeResponse};
use crate::orchestrator::ScrapeOrchestrator;
use crate::ranking::RankingEngine;
use crate::scrapers::default_fetchers;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

/// Discovers and ranks learning resources for validated requests.
///
/// Holds no per-request state, so one instance serves any number of
/// concurrent requests.
#[derive(Clone)]
pub struct ResourceScout {
    orchestrator: ScrapeOrchestrator,
    engine: RankingEngine,
}

impl ResourceScout {
    pub fn new(orchestrator: ScrapeOrchestrator, engine: RankingEngine) -> Self {
        Self {
            orchestrator,
            engine,
        }
    }

    /// Wire up the built-in adapters and the ranking engine from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let fetch = Arc::new(settings.fetch.clone());
        let fetchers = default_fetchers(&fetch)?;
        let orchestrator = ScrapeOrchestrator::new(fetchers, fetch.fetcher_timeout());
        info!(
            categories = ?orchestrator.categories(),
            timeout_secs = fetch.fetcher_timeout_secs,
            "Registered source fetchers"
        );
        let engine = RankingEngine::new(Arc::new(settings.ranking.clone()));
        Ok(Self::new(orchestrator, engine))
    }

    #[instrument(level = "info", skip_all, fields(topic = %request.topic(), level = %request.level()))]
    pub async fn scout(&self, request: &RankingRequest) -> ScrapeResponse {
        let t0 = Instant::now();
        let candidates = self.orchestrator.orchestrate(request).await;

        // Fuzzy scoring is CPU-bound; keep it off the async workers.
        let engine = self.engine.clone();
        let topic = request.topic().to_string();
        let level = request.level();
        let ranked = tokio::task::spawn_blocking(move || engine.evaluate(candidates, &topic, level))
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Ranking task failed; returning no resources");
                Vec::new()
            });
        let response = ScrapeResponse::new(request, &ranked);
        info!(
            resources = response.resources.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Ranking run finished"
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RankingSettings;
    use crate::models::{CandidateResource, Category};
    use crate::scrapers::SourceFetcher;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Wikipedia;

    #[async_trait]
    impl SourceFetcher for Wikipedia {
        fn category(&self) -> Category {
            Category::Article
        }

        async fn fetch(&self, request: &RankingRequest) -> Vec<CandidateResource> {
            vec![
                CandidateResource::new(
                    Category::Article,
                    &format!("{} (programming language)", request.topic()),
                    "https://en.wikipedia.org/wiki/Python_(programming_language)",
                    "Python is a high-level language. Learn the basics in this beginner guide.",
                    "wikipedia",
                    200,
                ),
                CandidateResource::new(
                    Category::Article,
                    "Gardening in small spaces",
                    "https://blog.example/garden",
                    "Pots, soil and light.",
                    "somewhere",
                    200,
                ),
            ]
        }
    }

    #[tokio::test]
    async fn test_scout_ranks_and_filters() {
        let scout = ResourceScout::new(
            ScrapeOrchestrator::new(vec![Arc::new(Wikipedia)], Duration::from_secs(5)),
            RankingEngine::new(Arc::new(RankingSettings::default())),
        );
        let request = RankingRequest::new("Python", "beginner").unwrap();
        let response = scout.scout(&request).await;

        assert_eq!(response.content, "Learning resources for Python at beginner level");
        assert_eq!(response.resources.len(), 1);
        assert_eq!(response.resources[0].kind, Category::Article);
        assert!(response.resources[0].score >= 0.4);
    }

    #[tokio::test]
    async fn test_scout_with_no_sources_is_empty() {
        let scout = ResourceScout::new(
            ScrapeOrchestrator::new(Vec::new(), Duration::from_secs(1)),
            RankingEngine::new(Arc::new(RankingSettings::default())),
        );
        let request = RankingRequest::new("Rust", "advanced").unwrap();
        let response = scout.scout(&request).await;
        assert!(response.resources.is_empty());
        assert_eq!(response.content, "Learning resources for Rust at advanced level");
    }
}
