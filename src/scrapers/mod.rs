//! Source adapters that discover candidate learning resources.
//!
//! Each category of resource has one adapter implementing [`SourceFetcher`]:
//!
//! | Category | Module | Sources | Method |
//! |----------|--------|---------|--------|
//! | article | [`articles`] | Wikipedia, dev.to, Medium | Search API (JSON) + HTML scraping |
//! | doc | [`docs`] | Official docs picked by topic | HTML scraping of landing pages |
//! | tutorial | [`tutorials`] | TutorialsPoint, GeeksforGeeks, W3Schools, freeCodeCamp | HTML scraping of search pages |
//! | video | [`videos`] | YouTube, edX, Coursera | HTML scraping of search pages |
//! | blog | [`blogs`] | dev.to, Medium, Hashnode | Tag RSS feeds + HTML scraping |
//!
//! # Contract
//!
//! - `fetch` never fails: network and parse errors are logged and the adapter
//!   returns whatever it collected (possibly nothing).
//! - Results are capped per site and per adapter before returning.
//! - Every record carries the adapter's category and a lowercase source name
//!   present in the credibility table.
//! - Each adapter owns its own `reqwest::Client`.
//!
//! Site markup is parsed synchronously after the body has been downloaded, so
//! no parsed document is ever held across an `.await`.

pub mod articles;
pub mod blogs;
pub mod docs;
pub mod tutorials;
pub mod videos;

use crate::config::FetchSettings;
use crate::error::FetchError;
use crate::models::{CandidateResource, Category, RankingRequest};
use async_trait::async_trait;
use futures::future::join_all;
use itertools::Itertools;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Requests fetched at once inside a single adapter.
pub(crate) const SITE_CONCURRENCY: usize = 4;

/// A source of candidate resources for one category.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// The category stamped on every record this fetcher returns.
    fn category(&self) -> Category;

    /// Discover candidates for a validated request. Must not fail.
    async fn fetch(&self, request: &RankingRequest) -> Vec<CandidateResource>;
}

/// The built-in adapters in registration order, which is also merge priority.
pub fn default_fetchers(
    settings: &Arc<FetchSettings>,
) -> Result<Vec<Arc<dyn SourceFetcher>>, FetchError> {
    Ok(vec![
        Arc::new(articles::ArticlesFetcher::new(Arc::clone(settings))?),
        Arc::new(docs::DocsFetcher::new(Arc::clone(settings))?),
        Arc::new(tutorials::TutorialsFetcher::new(Arc::clone(settings))?),
        Arc::new(videos::VideosFetcher::new(Arc::clone(settings))?),
        Arc::new(blogs::BlogsFetcher::new(Arc::clone(settings))?),
    ])
}

/// Build an adapter's private HTTP client.
pub(crate) fn build_client(settings: &FetchSettings) -> Result<Client, FetchError> {
    Ok(Client::builder()
        .timeout(settings.request_timeout())
        .user_agent(settings.user_agent.as_str())
        .build()?)
}

/// GET a URL and return the body, treating non-2xx as an error.
#[instrument(level = "debug", skip(client))]
pub(crate) async fn get_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(resp.text().await?)
}

/// Expand `{topic}` and `{level}` in each template.
pub(crate) fn search_queries(templates: &[&str], request: &RankingRequest) -> Vec<String> {
    templates
        .iter()
        .map(|t| {
            t.replace("{topic}", request.topic())
                .replace("{level}", request.level().as_str())
        })
        .collect()
}

/// A scraping rule for one site's search or landing page.
#[derive(Clone, Copy)]
pub(crate) struct SiteRule {
    /// Key into the credibility table.
    pub source: &'static str,
    /// Search URL with a `{q}` placeholder for the encoded query.
    pub search_url: &'static str,
    /// Anchors with shorter text are navigation, not results.
    pub min_title: usize,
    /// Decides whether an anchor is a result, given `(href, lowercase title)`.
    pub accept: fn(&str, &str) -> bool,
}

impl SiteRule {
    pub fn url_for(&self, query: &str) -> String {
        self.search_url
            .replace("{q}", &urlencoding::encode(query))
    }
}

/// Fetch one page and turn the anchors `rule` accepts into candidates.
///
/// Errors are logged and yield an empty list.
pub(crate) async fn scrape_site(
    client: &Client,
    url: &str,
    rule: &SiteRule,
    category: Category,
    limit: usize,
    snippet_max: usize,
) -> Vec<CandidateResource> {
    let html = match get_text(client, url).await {
        Ok(html) => html,
        Err(e) => {
            warn!(source = rule.source, %url, error = %e, "Site fetch failed");
            return Vec::new();
        }
    };
    let base = match Url::parse(url) {
        Ok(base) => base,
        Err(e) => {
            warn!(source = rule.source, %url, error = %e, "Invalid site url");
            return Vec::new();
        }
    };
    let hits = extract_links(&html, &base, rule.min_title, rule.accept);
    debug!(source = rule.source, %url, hits = hits.len(), "Parsed site");
    into_candidates(hits, category, rule.source, limit, snippet_max)
}

/// Scrape the search page of every rule for one query at once.
///
/// Results keep rule order, so a slow site only delays the batch by its own
/// request timeout.
pub(crate) async fn scrape_sites(
    client: &Client,
    rules: &[SiteRule],
    query: &str,
    category: Category,
    limit: usize,
    snippet_max: usize,
) -> Vec<CandidateResource> {
    let pages = rules.iter().copied().map(|rule| async move {
        let url = rule.url_for(query);
        scrape_site(client, &url, &rule, category, limit, snippet_max).await
    });
    join_all(pages).await.into_iter().flatten().collect()
}

/// A client whose every request fails at once, for exercising `fetch`
/// without the network.
#[cfg(test)]
pub(crate) fn offline_client() -> Client {
    Client::builder()
        .proxy(reqwest::Proxy::all("http://127.0.0.1:9").unwrap())
        .timeout(std::time::Duration::from_secs(2))
        .build()
        .unwrap()
}

/// An anchor found on a page, with the text of its enclosing block.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LinkHit {
    pub title: String,
    pub link: String,
    pub context: String,
}

/// Collect anchors whose text is at least `min_title` characters and which
/// `accept` approves, resolving relative links against `base`.
pub(crate) fn extract_links(
    html: &str,
    base: &Url,
    min_title: usize,
    accept: impl Fn(&str, &str) -> bool,
) -> Vec<LinkHit> {
    let document = Html::parse_document(html);
    let mut hits = Vec::new();
    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let title = element_text(anchor);
        if title.chars().count() < min_title || !accept(href, &title.to_lowercase()) {
            continue;
        }
        let Some(link) = resolve_link(base, href) else {
            continue;
        };
        hits.push(LinkHit {
            title,
            link,
            context: block_text(anchor),
        });
    }
    hits
}

/// Absolute http(s) form of `href`, without its fragment.
pub(crate) fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

/// Plain text of an HTML fragment, e.g. a search-API snippet with highlight markup.
pub(crate) fn html_to_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    element_text(parsed.root_element())
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().split_whitespace().join(" ")
}

/// Text describing an anchor: the first paragraph of its enclosing block,
/// else the block itself, else the anchor.
fn block_text(anchor: ElementRef) -> String {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| matches!(e.value().name(), "p" | "li" | "div" | "article" | "section"))
        .map(|block| {
            block
                .select(&PARAGRAPH)
                .map(element_text)
                .find(|t| !t.is_empty())
                .unwrap_or_else(|| element_text(block))
        })
        .unwrap_or_else(|| element_text(anchor))
}

/// Turn parsed hits into at most `limit` candidates.
pub(crate) fn into_candidates(
    hits: Vec<LinkHit>,
    category: Category,
    source: &str,
    limit: usize,
    snippet_max: usize,
) -> Vec<CandidateResource> {
    hits.into_iter()
        .unique_by(|h| h.link.clone())
        .take(limit)
        .map(|h| CandidateResource::new(category, &h.title, &h.link, &h.context, source, snippet_max))
        .collect()
}

/// Drop repeated links (first wins) and apply the adapter-wide cap.
pub(crate) fn finalize(
    batches: Vec<Vec<CandidateResource>>,
    limit: usize,
) -> Vec<CandidateResource> {
    batches
        .into_iter()
        .flatten()
        .unique_by(|c| c.link().to_string())
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
        <html><body>
          <nav><a href="/">Home</a><a href="#top">Back to top of the page</a></nav>
          <div class="result">
            <a href="/rust/intro">Rust tutorial for newcomers</a>
            <p>Start here: ownership, borrowing and cargo.</p>
          </div>
          <li><a href="https://other.example/rust">Another Rust tutorial page</a></li>
          <a href="mailto:team@example.com">Write to the team about tutorials</a>
          <a href="/rust/intro#section">Rust tutorial for newcomers again</a>
        </body></html>
    "##;

    fn base() -> Url {
        Url::parse("https://www.example.com/search?q=rust").unwrap()
    }

    #[test]
    fn test_extract_links_filters_and_resolves() {
        let hits = extract_links(PAGE, &base(), 10, |_, title| title.contains("tutorial"));
        let links: Vec<_> = hits.iter().map(|h| h.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://www.example.com/rust/intro",
                "https://other.example/rust",
                "https://www.example.com/rust/intro",
            ]
        );
        assert_eq!(hits[0].title, "Rust tutorial for newcomers");
        assert_eq!(hits[0].context, "Start here: ownership, borrowing and cargo.");
        assert_eq!(hits[1].context, "Another Rust tutorial page");
    }

    #[test]
    fn test_min_title_drops_navigation() {
        let hits = extract_links(PAGE, &base(), 10, |_, _| true);
        assert!(hits.iter().all(|h| h.title != "Home"));
    }

    #[test]
    fn test_resolve_link_rejects_non_http() {
        let b = base();
        assert_eq!(resolve_link(&b, "#frag"), None);
        assert_eq!(resolve_link(&b, "javascript:void(0)"), None);
        assert_eq!(
            resolve_link(&b, "/a/b#c").as_deref(),
            Some("https://www.example.com/a/b")
        );
    }

    #[test]
    fn test_html_to_text_strips_markup() {
        assert_eq!(
            html_to_text(r#"The <span class="searchmatch">Rust</span> &amp; friends"#),
            "The Rust & friends"
        );
    }

    #[test]
    fn test_into_candidates_dedups_and_limits() {
        let hits = extract_links(PAGE, &base(), 10, |_, title| title.contains("tutorial"));
        let out = into_candidates(hits, Category::Tutorial, "w3schools", 5, 200);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|c| c.category() == Category::Tutorial));
        assert!(out.iter().all(|c| c.source_name() == "w3schools"));

        let hits = extract_links(PAGE, &base(), 10, |_, title| title.contains("tutorial"));
        assert_eq!(into_candidates(hits, Category::Tutorial, "w3schools", 1, 200).len(), 1);
    }

    #[test]
    fn test_search_queries_and_site_urls() {
        let req = RankingRequest::new("Machine Learning", "Beginner").unwrap();
        let qs = search_queries(&["{topic} {level} tutorial", "learn {topic}"], &req);
        assert_eq!(qs, vec!["Machine Learning beginner tutorial", "learn Machine Learning"]);

        let rule = SiteRule {
            source: "w3schools",
            search_url: "https://www.w3schools.com/search/search.php?q={q}",
            min_title: 5,
            accept: |_, _| true,
        };
        assert_eq!(
            rule.url_for("rust basics"),
            "https://www.w3schools.com/search/search.php?q=rust%20basics"
        );
    }

    #[test]
    fn test_finalize_first_link_wins() {
        let a = CandidateResource::new(Category::Blog, "A", "https://x/1", "", "medium", 200);
        let b = CandidateResource::new(Category::Blog, "B", "https://x/1", "", "dev.to", 200);
        let c = CandidateResource::new(Category::Blog, "C", "https://x/2", "", "dev.to", 200);
        let out = finalize(vec![vec![a], vec![b, c]], 10);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title(), "A");
    }
}
