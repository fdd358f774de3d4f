//! Blog adapter: dev.to and Medium tag feeds plus Hashnode search.
//!
//! dev.to and Medium both publish an RSS feed per tag, which is far steadier
//! than their search markup. The tag is derived from the topic.

use super::{
    SITE_CONCURRENCY, SiteRule, SourceFetcher, build_client, finalize, get_text, html_to_text,
    scrape_sites, search_queries,
};
use crate::config::FetchSettings;
use crate::error::FetchError;
use crate::models::{CandidateResource, Category, RankingRequest};
use crate::ranking::relevance::tokenize;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

const QUERIES: &[&str] = &[
    "{topic} {level} blog",
    "{topic} {level} post",
    "learn {topic} {level}",
    "{topic} {level} experience",
];

const HASHNODE: SiteRule = SiteRule {
    source: "hashnode",
    search_url: "https://hashnode.com/search?q={q}",
    min_title: 10,
    accept: |href, _| href.contains("/@") && !href.starts_with("//"),
};

/// A platform publishing one RSS feed per tag.
#[derive(Debug, Clone, Copy)]
struct TagFeed {
    source: &'static str,
    url: &'static str,
    /// Joins topic words into the platform's tag format.
    separator: &'static str,
}

const FEEDS: &[TagFeed] = &[
    TagFeed {
        source: "dev.to",
        url: "https://dev.to/feed/tag/{tag}",
        separator: "",
    },
    TagFeed {
        source: "medium",
        url: "https://medium.com/feed/tag/{tag}",
        separator: "-",
    },
];

impl TagFeed {
    fn url_for(&self, topic: &str) -> Option<String> {
        let tag = tokenize(topic).join(self.separator);
        if tag.is_empty() {
            return None;
        }
        Some(self.url.replace("{tag}", &urlencoding::encode(&tag)))
    }
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
}

/// Parse an RSS 2.0 feed into blog candidates, skipping items without a
/// title or link.
pub(crate) fn parse_feed(
    xml: &str,
    source: &str,
    limit: usize,
    snippet_max: usize,
) -> Result<Vec<CandidateResource>, FetchError> {
    let rss: Rss = quick_xml::de::from_str(xml).map_err(|e| FetchError::Parse {
        url: source.to_string(),
        reason: e.to_string(),
    })?;
    Ok(rss
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let title = item.title.filter(|t| !t.trim().is_empty())?;
            let link = item.link.filter(|l| !l.trim().is_empty())?;
            let snippet = item.description.as_deref().map(html_to_text).unwrap_or_default();
            Some(CandidateResource::new(
                Category::Blog,
                &title,
                &link,
                &snippet,
                source,
                snippet_max,
            ))
        })
        .take(limit)
        .collect())
}

/// Finds community blog posts.
pub struct BlogsFetcher {
    client: Client,
    settings: Arc<FetchSettings>,
}

impl BlogsFetcher {
    pub fn new(settings: Arc<FetchSettings>) -> Result<Self, FetchError> {
        Ok(Self::with_client(build_client(&settings)?, settings))
    }

    pub(crate) fn with_client(client: Client, settings: Arc<FetchSettings>) -> Self {
        Self { client, settings }
    }

    async fn read_feed(&self, feed: TagFeed, topic: &str) -> Vec<CandidateResource> {
        let Some(url) = feed.url_for(topic) else {
            return Vec::new();
        };
        let parsed = match get_text(&self.client, &url).await {
            Ok(xml) => parse_feed(
                &xml,
                feed.source,
                self.settings.per_site_limit,
                self.settings.snippet_max_chars,
            ),
            Err(e) => Err(e),
        };
        parsed.unwrap_or_else(|e| {
            warn!(source = feed.source, %url, error = %e, "Blog feed failed");
            Vec::new()
        })
    }

    async fn search_hashnode(&self, query: String) -> Vec<CandidateResource> {
        scrape_sites(
            &self.client,
            &[HASHNODE],
            &query,
            Category::Blog,
            self.settings.per_site_limit,
            self.settings.snippet_max_chars,
        )
        .await
    }
}

#[async_trait]
impl SourceFetcher for BlogsFetcher {
    fn category(&self) -> Category {
        Category::Blog
    }

    #[instrument(level = "info", skip_all, fields(topic = %request.topic(), level = %request.level()))]
    async fn fetch(&self, request: &RankingRequest) -> Vec<CandidateResource> {
        let topic = request.topic();
        let mut batches: Vec<Vec<CandidateResource>> = stream::iter(FEEDS.iter().copied())
            .map(|feed| self.read_feed(feed, topic))
            .buffered(SITE_CONCURRENCY)
            .collect()
            .await;

        let searched: Vec<Vec<CandidateResource>> =
            stream::iter(search_queries(QUERIES, request))
                .map(|query| self.search_hashnode(query))
                .buffered(SITE_CONCURRENCY)
                .collect()
                .await;
        batches.extend(searched);

        let blogs = finalize(batches, self.settings.max_results_per_fetcher);
        info!(count = blogs.len(), "Blogs fetcher found unique blog posts");
        blogs
    }
}
