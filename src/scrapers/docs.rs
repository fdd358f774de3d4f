//! Documentation adapter: official docs sites chosen by topic.
//!
//! The topic picks a set of documentation landing pages; each page is scraped
//! for anchors whose text mentions one of the topic's words.

use super::{SITE_CONCURRENCY, SourceFetcher, build_client, extract_links, finalize, get_text, into_candidates};
use crate::config::FetchSettings;
use crate::error::FetchError;
use crate::models::{CandidateResource, Category, RankingRequest};
use crate::ranking::relevance::tokenize;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// An official documentation site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DocSite {
    pub source: &'static str,
    pub url: &'static str,
}

const fn site(source: &'static str, url: &'static str) -> DocSite {
    DocSite { source, url }
}

/// Topic triggers and the documentation sites they select.
const DOC_GROUPS: &[(&[&str], &[DocSite])] = &[
    (
        &["python", "django", "flask", "fastapi"],
        &[
            site("python", "https://docs.python.org/3/"),
            site("django", "https://docs.djangoproject.com/"),
            site("fastapi", "https://fastapi.tiangolo.com/"),
        ],
    ),
    (
        &["javascript", "node", "react", "vue", "angular"],
        &[
            site("mdn", "https://developer.mozilla.org/"),
            site("node.js", "https://nodejs.org/docs/"),
            site("react", "https://react.dev/learn"),
        ],
    ),
    (
        &["java", "spring", "maven"],
        &[
            site("oracle", "https://docs.oracle.com/javase/"),
            site("spring", "https://spring.io/docs"),
        ],
    ),
    (
        &["machine learning", "ml", "tensorflow", "pytorch"],
        &[
            site("tensorflow", "https://www.tensorflow.org/learn"),
            site("pytorch", "https://pytorch.org/docs/"),
            site("scikit-learn", "https://scikit-learn.org/stable/"),
        ],
    ),
    (
        &["data science", "pandas", "numpy"],
        &[
            site("pandas", "https://pandas.pydata.org/docs/"),
            site("numpy", "https://numpy.org/doc/"),
        ],
    ),
    (
        &["web development", "html", "css"],
        &[
            site("mdn", "https://developer.mozilla.org/"),
            site("w3schools", "https://www.w3schools.com/"),
        ],
    ),
];

const FALLBACK_SITES: &[DocSite] = &[
    site("mdn", "https://developer.mozilla.org/"),
    site("w3schools", "https://www.w3schools.com/"),
];

/// Documentation sites for a topic, in group order, without repeats.
///
/// Single-word triggers match whole topic words; multi-word triggers match
/// anywhere in the topic.
pub(crate) fn doc_sites(topic: &str) -> Vec<DocSite> {
    let lower = topic.to_lowercase();
    let words = tokenize(topic);
    let mut sites: Vec<DocSite> = Vec::new();
    for (triggers, group) in DOC_GROUPS {
        let hit = triggers.iter().any(|t| {
            if t.contains(' ') {
                lower.contains(t)
            } else {
                words.iter().any(|w| w == t)
            }
        });
        if hit {
            for s in group.iter() {
                if !sites.iter().any(|known| known.url == s.url) {
                    sites.push(*s);
                }
            }
        }
    }
    if sites.is_empty() {
        sites.extend_from_slice(FALLBACK_SITES);
    }
    sites
}

/// Parse a documentation landing page for anchors mentioning the topic.
pub(crate) fn parse_doc_page(
    html: &str,
    site: &DocSite,
    topic_words: &[String],
    limit: usize,
    snippet_max: usize,
) -> Result<Vec<CandidateResource>, FetchError> {
    let base = Url::parse(site.url)?;
    let hits = extract_links(html, &base, 5, |_, title| {
        topic_words.iter().any(|w| title.contains(w.as_str()))
    });
    Ok(into_candidates(hits, Category::Doc, site.source, limit, snippet_max))
}

/// Finds reference material on official documentation sites.
pub struct DocsFetcher {
    client: Client,
    settings: Arc<FetchSettings>,
}

impl DocsFetcher {
    pub fn new(settings: Arc<FetchSettings>) -> Result<Self, FetchError> {
        Ok(Self::with_client(build_client(&settings)?, settings))
    }

    pub(crate) fn with_client(client: Client, settings: Arc<FetchSettings>) -> Self {
        Self { client, settings }
    }

    async fn scrape_doc_site(
        &self,
        site: DocSite,
        topic_words: &[String],
    ) -> Result<Vec<CandidateResource>, FetchError> {
        let html = get_text(&self.client, site.url).await?;
        parse_doc_page(
            &html,
            &site,
            topic_words,
            self.settings.docs_per_site_limit,
            self.settings.snippet_max_chars,
        )
    }

    /// Like [`Self::scrape_doc_site`], but a failing site only logs.
    async fn read_doc_site(&self, site: DocSite, topic_words: &[String]) -> Vec<CandidateResource> {
        self.scrape_doc_site(site, topic_words)
            .await
            .unwrap_or_else(|e| {
                warn!(source = site.source, url = site.url, error = %e, "Documentation site failed");
                Vec::new()
            })
    }
}

#[async_trait]
impl SourceFetcher for DocsFetcher {
    fn category(&self) -> Category {
        Category::Doc
    }

    #[instrument(level = "info", skip_all, fields(topic = %request.topic(), level = %request.level()))]
    async fn fetch(&self, request: &RankingRequest) -> Vec<CandidateResource> {
        let sites = doc_sites(request.topic());
        let topic_words = tokenize(request.topic());
        debug!(sites = ?sites.iter().map(|s| s.source).collect::<Vec<_>>(), "Selected documentation sites");

        let topic_words = topic_words.as_slice();
        let batches: Vec<Vec<CandidateResource>> = stream::iter(sites)
            .map(|site| self.read_doc_site(site, topic_words))
            .buffered(SITE_CONCURRENCY)
            .collect()
            .await;

        let docs = finalize(batches, self.settings.max_results_per_fetcher);
        info!(count = docs.len(), "Docs fetcher found unique documentation resources");
        docs
    }
}
