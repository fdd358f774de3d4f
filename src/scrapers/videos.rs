//! Video adapter: YouTube results plus Vimeo, edX and Coursera course pages.

use super::{
    LinkHit, SITE_CONCURRENCY, SiteRule, SourceFetcher, build_client, extract_links, finalize,
    get_text, into_candidates, scrape_sites, search_queries,
};
use crate::config::FetchSettings;
use crate::error::FetchError;
use crate::models::{CandidateResource, Category, RankingRequest};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::Url;

const YOUTUBE_SEARCH: &str = "https://www.youtube.com/results?search_query={q}";

const QUERIES: &[&str] = &[
    "{topic} {level} tutorial",
    "learn {topic} {level}",
    "{topic} {level} course",
    "{topic} {level} video",
];

const SITES: &[SiteRule] = &[
    SiteRule {
        source: "vimeo",
        search_url: "https://vimeo.com/search?q={q}",
        min_title: 10,
        accept: |href, _| {
            href.strip_prefix('/')
                .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        },
    },
    SiteRule {
        source: "edx",
        search_url: "https://www.edx.org/search?q={q}",
        min_title: 10,
        accept: |href, _| href.contains("/course/") || href.contains("/learn/"),
    },
    SiteRule {
        source: "coursera",
        search_url: "https://www.coursera.org/search?query={q}",
        min_title: 10,
        accept: |href, _| href.contains("/learn/") || href.contains("/course/"),
    },
];

/// Canonical watch URL for a YouTube link, dropping playlist and timing params.
pub(crate) fn canonical_watch_url(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let id = url
        .query_pairs()
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())?;
    Some(format!("https://www.youtube.com/watch?v={id}"))
}

/// Parse a YouTube results page into video candidates.
pub(crate) fn parse_youtube(html: &str, limit: usize, snippet_max: usize) -> Vec<CandidateResource> {
    let Ok(base) = Url::parse("https://www.youtube.com/") else {
        return Vec::new();
    };
    let hits: Vec<LinkHit> = extract_links(html, &base, 10, |href, _| href.starts_with("/watch?v="))
        .into_iter()
        .filter_map(|hit| {
            let link = canonical_watch_url(&hit.link)?;
            Some(LinkHit { link, ..hit })
        })
        .collect();
    into_candidates(hits, Category::Video, "youtube", limit, snippet_max)
}

/// Finds video lessons and online courses.
pub struct VideosFetcher {
    client: Client,
    settings: Arc<FetchSettings>,
}

impl VideosFetcher {
    pub fn new(settings: Arc<FetchSettings>) -> Result<Self, FetchError> {
        Ok(Self::with_client(build_client(&settings)?, settings))
    }

    pub(crate) fn with_client(client: Client, settings: Arc<FetchSettings>) -> Self {
        Self { client, settings }
    }

    /// YouTube and the course platforms for one query, requested at once.
    async fn search(&self, query: String) -> Vec<CandidateResource> {
        let (mut found, courses) = tokio::join!(
            self.search_youtube(&query),
            scrape_sites(
                &self.client,
                SITES,
                &query,
                Category::Video,
                self.settings.per_site_limit,
                self.settings.snippet_max_chars,
            )
        );
        found.extend(courses);
        found
    }

    async fn search_youtube(&self, query: &str) -> Vec<CandidateResource> {
        let url = YOUTUBE_SEARCH.replace("{q}", &urlencoding::encode(query));
        match get_text(&self.client, &url).await {
            Ok(html) => parse_youtube(
                &html,
                self.settings.video_site_limit,
                self.settings.snippet_max_chars,
            ),
            Err(e) => {
                warn!(source = "youtube", %url, error = %e, "YouTube search failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl SourceFetcher for VideosFetcher {
    fn category(&self) -> Category {
        Category::Video
    }

    #[instrument(level = "info", skip_all, fields(topic = %request.topic(), level = %request.level()))]
    async fn fetch(&self, request: &RankingRequest) -> Vec<CandidateResource> {
        let batches: Vec<Vec<CandidateResource>> =
            stream::iter(search_queries(QUERIES, request))
                .map(|query| self.search(query))
                .buffered(SITE_CONCURRENCY)
                .collect()
                .await;

        let videos = finalize(batches, self.settings.max_results_per_fetcher);
        info!(count = videos.len(), "Videos fetcher found unique video resources");
        videos
    }
}
