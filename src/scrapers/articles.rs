//! Article adapter: Wikipedia search API, dev.to and Medium search pages.
//!
//! Wikipedia is queried through its JSON search API, which is stable and
//! returns a highlighted snippet per hit. dev.to and Medium are scraped for
//! anchors that look like article links.

use super::{
    SITE_CONCURRENCY, SiteRule, SourceFetcher, build_client, finalize, get_text, html_to_text,
    scrape_sites, search_queries,
};
use crate::config::FetchSettings;
use crate::error::FetchError;
use crate::models::{CandidateResource, Category, RankingRequest};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::Url;

const WIKIPEDIA_API: &str = "https://en.wikipedia.org/w/api.php";
const WIKIPEDIA_WIKI: &str = "https://en.wikipedia.org/wiki/";

const QUERIES: &[&str] = &[
    "{topic} {level} article",
    "{topic} {level} guide",
    "learn {topic} {level}",
    "{topic} tutorial {level}",
];

const SITES: &[SiteRule] = &[
    SiteRule {
        source: "dev.to",
        search_url: "https://dev.to/search?q={q}",
        min_title: 11,
        accept: |href, _| href.starts_with('/') && !href.starts_with("//") && href.len() > 5,
    },
    SiteRule {
        source: "medium",
        search_url: "https://medium.com/search?q={q}",
        min_title: 11,
        accept: |href, _| href.contains("/@") && !href.contains('?'),
    },
];

#[derive(Debug, Deserialize)]
struct WikiResponse {
    #[serde(default)]
    query: WikiQuery,
}

#[derive(Debug, Default, Deserialize)]
struct WikiQuery {
    #[serde(default)]
    search: Vec<WikiHit>,
}

#[derive(Debug, Deserialize)]
struct WikiHit {
    title: String,
    #[serde(default)]
    snippet: String,
}

/// Parse a Wikipedia `list=search` response into article candidates.
pub(crate) fn parse_wikipedia(
    body: &str,
    limit: usize,
    snippet_max: usize,
) -> Result<Vec<CandidateResource>, FetchError> {
    let parsed: WikiResponse = serde_json::from_str(body).map_err(|e| FetchError::Parse {
        url: WIKIPEDIA_API.to_string(),
        reason: e.to_string(),
    })?;
    let base = Url::parse(WIKIPEDIA_WIKI)?;
    Ok(parsed
        .query
        .search
        .into_iter()
        .take(limit)
        .filter_map(|hit| {
            let link = wikipedia_link(&base, &hit.title)?;
            Some(CandidateResource::new(
                Category::Article,
                &hit.title,
                &link,
                &html_to_text(&hit.snippet),
                "wikipedia",
                snippet_max,
            ))
        })
        .collect())
}

/// Article URL for a page title, with the title percent-encoded as one path
/// segment so `#`, `?` and `%` stay part of it.
fn wikipedia_link(base: &Url, title: &str) -> Option<String> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push(&title.replace(' ', "_"));
    Some(url.to_string())
}

/// Finds encyclopedia entries and community articles.
pub struct ArticlesFetcher {
    client: Client,
    settings: Arc<FetchSettings>,
}

impl ArticlesFetcher {
    pub fn new(settings: Arc<FetchSettings>) -> Result<Self, FetchError> {
        Ok(Self::with_client(build_client(&settings)?, settings))
    }

    pub(crate) fn with_client(client: Client, settings: Arc<FetchSettings>) -> Self {
        Self { client, settings }
    }

    async fn search_wikipedia(&self, query: &str) -> Result<Vec<CandidateResource>, FetchError> {
        let limit = self.settings.per_site_limit.to_string();
        let url = reqwest::Url::parse_with_params(
            WIKIPEDIA_API,
            &[
                ("action", "query"),
                ("format", "json"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ],
        )?;
        let body = get_text(&self.client, url.as_str()).await?;
        parse_wikipedia(&body, self.settings.per_site_limit, self.settings.snippet_max_chars)
    }

    /// Wikipedia first, then the community sites, all requested at once.
    async fn search(&self, query: String) -> Vec<CandidateResource> {
        let (wiki, sites) = tokio::join!(
            self.search_wikipedia(&query),
            scrape_sites(
                &self.client,
                SITES,
                &query,
                Category::Article,
                self.settings.per_site_limit,
                self.settings.snippet_max_chars,
            )
        );
        let mut found = wiki.unwrap_or_else(|e| {
            warn!(source = "wikipedia", %query, error = %e, "Wikipedia search failed");
            Vec::new()
        });
        found.extend(sites);
        found
    }
}

#[async_trait]
impl SourceFetcher for ArticlesFetcher {
    fn category(&self) -> Category {
        Category::Article
    }

    #[instrument(level = "info", skip_all, fields(topic = %request.topic(), level = %request.level()))]
    async fn fetch(&self, request: &RankingRequest) -> Vec<CandidateResource> {
        let batches: Vec<Vec<CandidateResource>> =
            stream::iter(search_queries(QUERIES, request))
                .map(|query| self.search(query))
                .buffered(SITE_CONCURRENCY)
                .collect()
                .await;

        let articles = finalize(batches, self.settings.max_results_per_fetcher);
        info!(count = articles.len(), "Articles fetcher found unique articles");
        articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIKI_BODY: &str = r#"{
        "batchcomplete": "",
        "query": {
            "searchinfo": {"totalhits": 2},
            "search": [
                {"ns": 0, "title": "Python (programming language)",
                 "snippet": "<span class=\"searchmatch\">Python</span> is a high-level language"},
                {"ns": 0, "title": "Zen of Python", "snippet": ""},
                {"ns": 0, "title": "Third hit", "snippet": "x"}
            ]
        }
    }"#;

    #[test]
    fn test_parse_wikipedia_builds_article_links() {
        let out = parse_wikipedia(WIKI_BODY, 2, 200).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(
            out[0].link(),
            "https://en.wikipedia.org/wiki/Python_(programming_language)"
        );
        assert_eq!(out[0].snippet(), "Python is a high-level language");
        assert_eq!(out[0].source_name(), "wikipedia");
        assert_eq!(out[0].category(), Category::Article);
    }

    #[test]
    fn test_wikipedia_links_encode_reserved_characters() {
        let body = r#"{"query": {"search": [
            {"title": "F Sharp (programming language)", "snippet": ""},
            {"title": "F# (programming language)", "snippet": ""},
            {"title": "What?", "snippet": ""},
            {"title": "100% Rust", "snippet": ""}
        ]}}"#;
        let out = parse_wikipedia(body, 10, 200).unwrap();
        let links: Vec<_> = out.iter().map(|c| c.link()).collect();
        assert_eq!(
            links,
            vec![
                "https://en.wikipedia.org/wiki/F_Sharp_(programming_language)",
                "https://en.wikipedia.org/wiki/F%23_(programming_language)",
                "https://en.wikipedia.org/wiki/What%3F",
                "https://en.wikipedia.org/wiki/100%25_Rust",
            ]
        );
        let parsed = Url::parse(out[1].link()).unwrap();
        assert_eq!(parsed.fragment(), None);
        assert_eq!(parsed.path(), "/wiki/F%23_(programming_language)");
        assert_eq!(out[1].title(), "F# (programming language)");
    }

    #[tokio::test]
    async fn test_fetch_degrades_to_empty_when_offline() {
        let fetcher = ArticlesFetcher::with_client(
            crate::scrapers::offline_client(),
            Arc::new(FetchSettings::default()),
        );
        let request = RankingRequest::new("Rust", "beginner").unwrap();
        assert!(fetcher.fetch(&request).await.is_empty());
        assert_eq!(fetcher.category(), Category::Article);
    }

    #[test]
    fn test_parse_wikipedia_without_results() {
        assert!(parse_wikipedia(r#"{"batchcomplete": ""}"#, 5, 200)
            .unwrap()
            .is_empty());
        assert!(matches!(
            parse_wikipedia("<html>oops</html>", 5, 200),
            Err(FetchError::Parse { .. })
        ));
    }

    #[test]
    fn test_site_rules_accept_article_links() {
        let devto = &SITES[0];
        assert!((devto.accept)("/jane/learning-rust-1a2b", "learning rust"));
        assert!(!(devto.accept)("//cdn.example/x", "learning rust"));
        let medium = &SITES[1];
        assert!((medium.accept)("/@jane/rust-ownership-123", "rust ownership"));
        assert!(!(medium.accept)("/@jane/rust?source=search", "rust ownership"));
    }
}
