//! Source credibility from the reputation table and link patterns.

use crate::config::RankingSettings;
use crate::models::CandidateResource;

/// Score how trustworthy a candidate's source is, in `[0, 1]`.
///
/// Link overrides only ever raise the table value, and only the first
/// matching pattern applies.
pub fn credibility_score(candidate: &CandidateResource, settings: &RankingSettings) -> f64 {
    let base = settings
        .credibility
        .get(candidate.source_name())
        .copied()
        .unwrap_or(settings.default_credibility);

    let link = candidate.link().to_lowercase();
    let score = settings
        .link_overrides
        .iter()
        .find(|o| link.contains(&o.pattern.to_lowercase()))
        .map_or(base, |o| base.max(o.score));

    score.clamp(0.0, 1.0)
}
