//! Data models for learning resources and their ranked representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RankingRequest`]: A validated (topic, level) pair
//! - [`CandidateResource`]: An unscored record discovered by a single fetcher
//! - [`ScoredResource`]: A candidate plus its relevance, depth and credibility scores
//! - [`ScrapeResponse`]: The outbound shape returned to callers
//!
//! Candidates and scored resources live for exactly one ranking run.

use crate::error::ValidationError;
use crate::utils::truncate_snippet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of learning resource a fetcher produces.
///
/// Each registered fetcher owns exactly one category, and the ranking engine
/// caps its output per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Article,
    Doc,
    Tutorial,
    Video,
    Blog,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Article,
        Category::Doc,
        Category::Tutorial,
        Category::Video,
        Category::Blog,
    ];

    /// Lowercase wire name, used for `type` in responses and for log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Article => "article",
            Category::Doc => "doc",
            Category::Tutorial => "tutorial",
            Category::Video => "video",
            Category::Blog => "blog",
        }
    }

    /// Heading used when rendering a reading list.
    pub fn heading(&self) -> &'static str {
        match self {
            Category::Article => "Articles",
            Category::Doc => "Documentation",
            Category::Tutorial => "Tutorials",
            Category::Video => "Videos",
            Category::Blog => "Blog Posts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The learner's declared skill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ValidationError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            _ => Err(ValidationError::UnknownLevel(s.to_string())),
        }
    }
}

/// Longest topic accepted, in characters.
pub const MAX_TOPIC_CHARS: usize = 200;

/// A validated request for learning resources.
///
/// Construction goes through [`RankingRequest::new`], so holding one means the
/// topic is non-empty and the level is known. No fetch is issued before this
/// validation succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingRequest {
    topic: String,
    level: Level,
}

impl RankingRequest {
    pub fn new(topic: &str, level: &str) -> Result<Self, ValidationError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        let len = topic.chars().count();
        if len > MAX_TOPIC_CHARS {
            return Err(ValidationError::TopicTooLong {
                len,
                max: MAX_TOPIC_CHARS,
            });
        }
        Ok(Self {
            topic: topic.to_string(),
            level: level.parse()?,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

/// Raw inbound request body, before validation.
#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub topic: String,
    pub level: String,
}

impl ScrapeRequest {
    pub fn validate(&self) -> Result<RankingRequest, ValidationError> {
        RankingRequest::new(&self.topic, &self.level)
    }
}

/// An unscored learning resource as discovered by one fetcher.
///
/// `link` is the deduplication key for a ranking run. Fields are private so a
/// candidate cannot be altered after the fetcher builds it.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateResource {
    category: Category,
    title: String,
    link: String,
    snippet: String,
    source_name: String,
}

impl CandidateResource {
    /// Build a candidate, trimming the title and bounding the snippet to
    /// `snippet_max` characters.
    pub fn new(
        category: Category,
        title: &str,
        link: &str,
        snippet: &str,
        source_name: &str,
        snippet_max: usize,
    ) -> Self {
        Self {
            category,
            title: title.trim().to_string(),
            link: link.trim().to_string(),
            snippet: truncate_snippet(snippet.trim(), snippet_max),
            source_name: source_name.to_lowercase(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

/// A candidate together with its scores. Every score lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResource {
    pub resource: CandidateResource,
    pub relevance_score: f64,
    pub depth_score: f64,
    pub credibility_score: f64,
    /// Weighted combination, rounded to two decimals.
    pub final_score: f64,
}

/// One resource in the outbound response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceView {
    #[serde(rename = "type")]
    pub kind: Category,
    pub title: String,
    pub link: String,
    pub score: f64,
}

impl From<&ScoredResource> for ResourceView {
    fn from(scored: &ScoredResource) -> Self {
        Self {
            kind: scored.resource.category(),
            title: scored.resource.title().to_string(),
            link: scored.resource.link().to_string(),
            score: scored.final_score,
        }
    }
}

/// The outbound response for one ranking run.
///
/// An empty `resources` list is a legitimate outcome (e.g. every source failed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub content: String,
    pub resources: Vec<ResourceView>,
}

impl ScrapeResponse {
    pub fn new(request: &RankingRequest, ranked: &[ScoredResource]) -> Self {
        Self {
            content: format!(
                "Learning resources for {} at {} level",
                request.topic(),
                request.level()
            ),
            resources: ranked.iter().map(ResourceView::from).collect(),
        }
    }
}

/// Liveness check payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "learning-scout".to_string(),
        }
    }
}
