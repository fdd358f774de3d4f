//! Tutorial adapter: search pages of the big tutorial sites.

use super::{
    SITE_CONCURRENCY, SiteRule, SourceFetcher, build_client, finalize, scrape_sites, search_queries,
};
use crate::config::FetchSettings;
use crate::error::FetchError;
use crate::models::{CandidateResource, Category, RankingRequest};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, instrument};

const QUERIES: &[&str] = &[
    "{topic} {level} tutorial",
    "learn {topic} {level} step by step",
    "{topic} {level} guide",
    "how to {topic} {level}",
];

pub(crate) const SITES: &[SiteRule] = &[
    SiteRule {
        source: "tutorialspoint",
        search_url: "https://www.tutorialspoint.com/search?q={q}",
        min_title: 10,
        accept: |href, title| href.contains("/tutorials/") || title.contains("tutorial"),
    },
    SiteRule {
        source: "geeksforgeeks",
        search_url: "https://www.geeksforgeeks.org/search/?query={q}",
        min_title: 10,
        accept: |href, title| {
            href.contains("/tutorials/") || href.contains("/articles/") || title.contains("tutorial")
        },
    },
    SiteRule {
        source: "w3schools",
        search_url: "https://www.w3schools.com/search/search.php?q={q}",
        min_title: 5,
        accept: |href, title| href.contains("/tutorials/") || title.contains("tutorial"),
    },
    SiteRule {
        source: "freecodecamp",
        search_url: "https://www.freecodecamp.org/search?query={q}",
        min_title: 10,
        accept: |href, title| href.contains("/news/") || title.contains("tutorial"),
    },
];

/// Finds step-by-step tutorials.
pub struct TutorialsFetcher {
    client: Client,
    settings: Arc<FetchSettings>,
}

impl TutorialsFetcher {
    pub fn new(settings: Arc<FetchSettings>) -> Result<Self, FetchError> {
        Ok(Self::with_client(build_client(&settings)?, settings))
    }

    pub(crate) fn with_client(client: Client, settings: Arc<FetchSettings>) -> Self {
        Self { client, settings }
    }

    /// Every tutorial site's search page for one query.
    async fn search(&self, query: String) -> Vec<CandidateResource> {
        scrape_sites(
            &self.client,
            SITES,
            &query,
            Category::Tutorial,
            self.settings.per_site_limit,
            self.settings.snippet_max_chars,
        )
        .await
    }
}

#[async_trait]
impl SourceFetcher for TutorialsFetcher {
    fn category(&self) -> Category {
        Category::Tutorial
    }

    #[instrument(level = "info", skip_all, fields(topic = %request.topic(), level = %request.level()))]
    async fn fetch(&self, request: &RankingRequest) -> Vec<CandidateResource> {
        let batches: Vec<Vec<CandidateResource>> =
            stream::iter(search_queries(QUERIES, request))
                .map(|query| self.search(query))
                .buffered(SITE_CONCURRENCY)
                .collect()
                .await;

        let tutorials = finalize(batches, self.settings.max_results_per_fetcher);
        info!(count = tutorials.len(), "Tutorials fetcher found unique tutorials");
        tutorials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::extract_links;
    use url::Url;

    #[test]
    fn test_geeksforgeeks_rule() {
        let html = r#"
            <div class="card">
              <a href="/python-tutorial/">Python Tutorial - Learn Python</a>
              <p>Covers basics to advanced concepts.</p>
            </div>
            <div><a href="/about/">About GeeksforGeeks</a></div>
            <div><a href="https://www.geeksforgeeks.org/articles/python-lists/">Python Lists Explained</a></div>
        "#;
        let rule = &SITES[1];
        let base = Url::parse(&rule.url_for("python")).unwrap();
        let hits = extract_links(html, &base, rule.min_title, rule.accept);
        let links: Vec<_> = hits.iter().map(|h| h.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://www.geeksforgeeks.org/python-tutorial/",
                "https://www.geeksforgeeks.org/articles/python-lists/",
            ]
        );
        assert_eq!(hits[0].context, "Covers basics to advanced concepts.");
    }

    #[tokio::test]
    async fn test_fetch_degrades_to_empty_when_offline() {
        let fetcher = TutorialsFetcher::with_client(
            crate::scrapers::offline_client(),
            Arc::new(FetchSettings::default()),
        );
        let request = RankingRequest::new("Python", "beginner").unwrap();
        assert!(fetcher.fetch(&request).await.is_empty());
    }

    #[test]
    fn test_every_site_source_is_lowercase() {
        for rule in SITES {
            assert_eq!(rule.source, rule.source.to_lowercase());
            assert!(rule.search_url.contains("{q}"));
        }
    }
}
