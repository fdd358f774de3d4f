//! Runtime configuration for fetching, ranking and serving.
//!
//! [`Settings`] is read once at startup, either from a YAML file or from the
//! built-in defaults below, and then shared read-only behind an `Arc`. Every
//! field is optional in YAML; anything omitted keeps its default.
//!
//! ```yaml
//! ranking:
//!   min_score: 0.45
//!   max_per_category: 3
//!   credibility:
//!     wikipedia: 1.0
//!     my-internal-wiki: 0.95
//! fetch:
//!   fetcher_timeout_secs: 15
//! server:
//!   bind: 127.0.0.1:8080
//! ```

use crate::models::Level;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};

/// Reputation of known platforms, keyed by lowercase source name.
static DEFAULT_CREDIBILITY: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    [
        ("wikipedia", 1.0),
        ("mdn", 0.95),
        ("python", 0.9),
        ("oracle", 0.9),
        ("tensorflow", 0.9),
        ("pytorch", 0.9),
        ("scikit-learn", 0.9),
        ("pandas", 0.9),
        ("numpy", 0.9),
        ("spring", 0.9),
        ("django", 0.9),
        ("fastapi", 0.9),
        ("react", 0.9),
        ("node.js", 0.9),
        ("tutorialspoint", 0.8),
        ("geeksforgeeks", 0.8),
        ("w3schools", 0.8),
        ("freecodecamp", 0.8),
        ("edx", 0.85),
        ("coursera", 0.85),
        ("youtube", 0.7),
        ("vimeo", 0.7),
        ("hashnode", 0.75),
        ("dev.to", 0.75),
        ("medium", 0.7),
        ("personal_blog", 0.6),
        ("blogspot", 0.6),
        ("wordpress", 0.6),
        ("tumblr", 0.5),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
});

/// Link substrings that raise credibility; the first match wins.
static DEFAULT_LINK_OVERRIDES: Lazy<Vec<LinkOverride>> = Lazy::new(|| {
    [
        ("wikipedia.org", 1.0),
        ("github.com", 0.8),
        ("stackoverflow.com", 0.8),
        ("docs.", 0.9),
        ("tutorial", 0.7),
    ]
    .into_iter()
    .map(|(pattern, score)| LinkOverride {
        pattern: pattern.to_string(),
        score,
    })
    .collect()
});

/// Terms indicating that content targets a level.
static DEFAULT_LEVEL_KEYWORDS: Lazy<HashMap<Level, Vec<String>>> = Lazy::new(|| {
    level_table([
        (
            Level::Beginner,
            &[
                "beginner",
                "basic",
                "intro",
                "introduction",
                "getting started",
                "learn",
                "tutorial",
                "guide",
                "simple",
                "easy",
            ][..],
        ),
        (
            Level::Intermediate,
            &[
                "intermediate",
                "advanced",
                "deep dive",
                "comprehensive",
                "detailed",
                "expert",
                "professional",
                "production",
            ][..],
        ),
        (
            Level::Advanced,
            &[
                "advanced",
                "expert",
                "master",
                "professional",
                "production",
                "enterprise",
                "optimization",
                "performance",
            ][..],
        ),
    ])
});

/// Title words that confirm the requested level and earn the bonus.
static DEFAULT_CONFIRMING_SIGNALS: Lazy<HashMap<Level, Vec<String>>> = Lazy::new(|| {
    level_table([
        (
            Level::Beginner,
            &["tutorial", "guide", "learn", "intro", "beginner"][..],
        ),
        (Level::Intermediate, &["advanced", "deep", "comprehensive"][..]),
        (Level::Advanced, &["expert", "master", "professional"][..]),
    ])
});

/// Title words that contradict the requested level and incur the penalty.
static DEFAULT_MISMATCH_SIGNALS: Lazy<HashMap<Level, Vec<String>>> = Lazy::new(|| {
    level_table([
        (Level::Beginner, &["expert", "advanced", "master"][..]),
        (Level::Intermediate, &[][..]),
        (Level::Advanced, &["beginner", "intro", "basic"][..]),
    ])
});

fn level_table<const N: usize>(rows: [(Level, &[&str]); N]) -> HashMap<Level, Vec<String>> {
    rows.into_iter()
        .map(|(level, words)| (level, words.iter().map(|w| w.to_string()).collect()))
        .collect()
}

/// A link pattern that raises a candidate's credibility to at least `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkOverride {
    pub pattern: String,
    pub score: f64,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ranking: RankingSettings,
    pub fetch: FetchSettings,
    pub server: ServerSettings,
}

/// Heuristic constants and lookup tables for the ranking engine.
///
/// The numeric defaults are heuristics carried over unchanged; they are
/// exposed here so deployments can tune them without a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    pub relevance_weight: f64,
    pub depth_weight: f64,
    pub credibility_weight: f64,
    /// Candidates whose rounded final score falls below this are dropped.
    pub min_score: f64,
    /// Maximum number of resources kept per category.
    pub max_per_category: usize,
    pub level_bonus: f64,
    pub mismatch_penalty: f64,
    /// Depth score used when a level has no configured keywords.
    pub neutral_depth: f64,
    /// Credibility of a source missing from `credibility`.
    pub default_credibility: f64,
    pub credibility: HashMap<String, f64>,
    pub link_overrides: Vec<LinkOverride>,
    pub level_keywords: HashMap<Level, Vec<String>>,
    pub confirming_signals: HashMap<Level, Vec<String>>,
    pub mismatch_signals: HashMap<Level, Vec<String>>,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            relevance_weight: 0.4,
            depth_weight: 0.3,
            credibility_weight: 0.3,
            min_score: 0.4,
            max_per_category: 5,
            level_bonus: 0.2,
            mismatch_penalty: 0.3,
            neutral_depth: 0.5,
            default_credibility: 0.5,
            credibility: DEFAULT_CREDIBILITY.clone(),
            link_overrides: DEFAULT_LINK_OVERRIDES.clone(),
            level_keywords: DEFAULT_LEVEL_KEYWORDS.clone(),
            confirming_signals: DEFAULT_CONFIRMING_SIGNALS.clone(),
            mismatch_signals: DEFAULT_MISMATCH_SIGNALS.clone(),
        }
    }
}

/// Network limits for the source adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Upper bound on one fetcher's whole run, all of its requests included.
    pub fetcher_timeout_secs: u64,
    /// Upper bound on a single HTTP request.
    pub request_timeout_secs: u64,
    /// Results kept per site or platform.
    pub per_site_limit: usize,
    /// Results kept per documentation site.
    pub docs_per_site_limit: usize,
    /// Results kept from the YouTube results page.
    pub video_site_limit: usize,
    /// Cap on everything one fetcher returns.
    pub max_results_per_fetcher: usize,
    pub snippet_max_chars: usize,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            fetcher_timeout_secs: 20,
            request_timeout_secs: 10,
            per_site_limit: 5,
            docs_per_site_limit: 10,
            video_site_limit: 10,
            max_results_per_fetcher: 40,
            snippet_max_chars: 200,
            user_agent: concat!("learning_scout/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchSettings {
    pub fn fetcher_timeout(&self) -> Duration {
        Duration::from_secs(self.fetcher_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from an optional YAML file.
    ///
    /// With no path the built-in defaults are used. A path that cannot be read
    /// or parsed is an error; startup should not silently fall back.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let settings = Self::from_yaml(&raw)?;
                info!(path, "Loaded configuration file");
                settings
            }
            None => {
                info!("No configuration file given; using defaults");
                Self::default()
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from YAML. Credibility keys are lowercased to match
    /// the source names stamped on candidates.
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        let mut settings: Self = serde_yaml::from_str(raw)?;
        let mut table = HashMap::new();
        for (source, score) in std::mem::take(&mut settings.ranking.credibility) {
            let key = source.trim().to_lowercase();
            if table.insert(key.clone(), score).is_some() {
                return Err(serde::de::Error::custom(format!(
                    "ranking.credibility lists '{key}' more than once"
                )));
            }
        }
        settings.ranking.credibility = table;
        Ok(settings)
    }

    /// Reject values that would break the `[0, 1]` score invariant.
    pub fn validate(&self) -> Result<(), String> {
        let r = &self.ranking;
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(format!("{name} must be within [0, 1], got {v}"))
            }
        };
        unit("ranking.relevance_weight", r.relevance_weight)?;
        unit("ranking.depth_weight", r.depth_weight)?;
        unit("ranking.credibility_weight", r.credibility_weight)?;
        unit("ranking.min_score", r.min_score)?;
        unit("ranking.neutral_depth", r.neutral_depth)?;
        unit("ranking.default_credibility", r.default_credibility)?;
        let total = r.relevance_weight + r.depth_weight + r.credibility_weight;
        if total > 1.0 + f64::EPSILON {
            return Err(format!("ranking weights must sum to at most 1, got {total}"));
        }
        for (source, v) in &r.credibility {
            if *source != source.to_lowercase() {
                return Err(format!("ranking.credibility key '{source}' must be lowercase"));
            }
            unit(&format!("ranking.credibility.{source}"), *v)?;
        }
        for o in &r.link_overrides {
            unit(&format!("ranking.link_overrides.{}", o.pattern), o.score)?;
        }
        if r.max_per_category == 0 {
            return Err("ranking.max_per_category must be at least 1".to_string());
        }
        if self.fetch.fetcher_timeout_secs == 0 {
            return Err("fetch.fetcher_timeout_secs must be at least 1".to_string());
        }
        if self.fetch.request_timeout_secs >= self.fetch.fetcher_timeout_secs {
            return Err(format!(
                "fetch.request_timeout_secs ({}) must be shorter than fetch.fetcher_timeout_secs ({})",
                self.fetch.request_timeout_secs, self.fetch.fetcher_timeout_secs
            ));
        }
        Ok(())
    }
}
