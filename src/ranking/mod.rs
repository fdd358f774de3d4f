//! Multi-criterion ranking of merged candidates.
//!
//! Every candidate is scored on three independent axes:
//!
//! | Axis | Module | Default weight |
//! |------|--------|----------------|
//! | Topic relevance | [`relevance`] | 0.4 |
//! | Level fit (depth) | [`depth`] | 0.3 |
//! | Source credibility | [`credibility`] | 0.3 |
//!
//! The weighted sum is rounded to two decimals. Candidates below the minimum
//! score are dropped, each category keeps its best `max_per_category`, and the
//! survivors come back as one list sorted by score descending. Ties keep
//! discovery order.
//!
//! Scoring a candidate reads nothing but that candidate and the immutable
//! settings, so evaluation order never changes the result.

pub mod credibility;
pub mod depth;
pub mod relevance;

use crate::config::RankingSettings;
use crate::error::ScoringError;
use crate::models::{CandidateResource, Level, ScoredResource};
use itertools::Itertools;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

use credibility::credibility_score;
use depth::depth_score;
use relevance::relevance_score;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Scores {
    relevance: f64,
    depth: f64,
    credibility: f64,
    final_score: f64,
}

/// Scores, filters, balances and sorts candidates.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    settings: Arc<RankingSettings>,
}

impl RankingEngine {
    pub fn new(settings: Arc<RankingSettings>) -> Self {
        Self { settings }
    }

    /// Rank `candidates` for a topic and level.
    ///
    /// Deterministic for a given input list. A candidate that cannot be scored
    /// is logged and left out; the rest are unaffected.
    #[instrument(level = "info", skip_all, fields(%topic, %level, candidates = candidates.len()))]
    pub fn evaluate(
        &self,
        candidates: Vec<CandidateResource>,
        topic: &str,
        level: Level,
    ) -> Vec<ScoredResource> {
        let total = candidates.len();
        let mut failed = 0usize;
        let mut below_threshold = 0usize;

        let survivors: Vec<(usize, ScoredResource)> = candidates
            .into_iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                match self.score(&candidate, topic, level) {
                    Ok(scores) if scores.final_score >= self.settings.min_score => {
                        debug!(title = %candidate.title(), score = scores.final_score, "Candidate kept");
                        Some((index, scored(candidate, scores)))
                    }
                    Ok(scores) => {
                        below_threshold += 1;
                        debug!(title = %candidate.title(), score = scores.final_score, "Candidate below threshold");
                        None
                    }
                    Err(e) => {
                        failed += 1;
                        warn!(link = %candidate.link(), error = %e, "Could not score candidate; skipping");
                        None
                    }
                }
            })
            .collect();

        let ranked = self.balance(survivors);
        info!(
            total,
            failed,
            below_threshold,
            returned = ranked.len(),
            "Ranking complete"
        );
        ranked
    }

    /// Score one candidate on every axis.
    pub fn score_candidate(
        &self,
        candidate: &CandidateResource,
        topic: &str,
        level: Level,
    ) -> Result<ScoredResource, ScoringError> {
        self.score(candidate, topic, level)
            .map(|scores| scored(candidate.clone(), scores))
    }

    fn score(
        &self,
        candidate: &CandidateResource,
        topic: &str,
        level: Level,
    ) -> Result<Scores, ScoringError> {
        if candidate.title().is_empty() {
            return Err(ScoringError::EmptyTitle);
        }
        Url::parse(candidate.link()).map_err(|e| ScoringError::InvalidLink {
            link: candidate.link().to_string(),
            reason: e.to_string(),
        })?;

        let s = &self.settings;
        let relevance = finite("relevance", relevance_score(candidate, topic))?;
        let depth = finite("depth", depth_score(candidate, level, s))?;
        let credibility = finite("credibility", credibility_score(candidate, s))?;

        let weighted = relevance * s.relevance_weight
            + depth * s.depth_weight
            + credibility * s.credibility_weight;
        let final_score = finite("final", round2(weighted))?.clamp(0.0, 1.0);

        Ok(Scores {
            relevance,
            depth,
            credibility,
            final_score,
        })
    }

    /// Keep the best `max_per_category` of each category, then order globally.
    fn balance(&self, survivors: Vec<(usize, ScoredResource)>) -> Vec<ScoredResource> {
        let cap = self.settings.max_per_category;
        survivors
            .into_iter()
            .into_group_map_by(|(_, s)| s.resource.category())
            .into_values()
            .flat_map(|group| group.into_iter().sorted_by(by_rank).take(cap))
            .sorted_by(by_rank)
            .map(|(_, s)| s)
            .collect()
    }
}

fn scored(resource: CandidateResource, scores: Scores) -> ScoredResource {
    ScoredResource {
        resource,
        relevance_score: scores.relevance,
        depth_score: scores.depth,
        credibility_score: scores.credibility,
        final_score: scores.final_score,
    }
}

/// Score descending, then discovery index ascending.
fn by_rank(a: &(usize, ScoredResource), b: &(usize, ScoredResource)) -> Ordering {
    b.1.final_score
        .total_cmp(&a.1.final_score)
        .then_with(|| a.0.cmp(&b.0))
}

fn finite(axis: &'static str, value: f64) -> Result<f64, ScoringError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScoringError::NonFiniteScore { axis })
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
