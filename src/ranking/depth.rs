//! Level fit: does the resource read like it targets the requested level?

use crate::config::RankingSettings;
use crate::models::{CandidateResource, Level};

/// Score how well a candidate fits `level`, in `[0, 1]`.
///
/// The base is the share of the level's keywords found in the title or
/// snippet. A title carrying a confirming signal word adds the bonus; a title
/// carrying a word of the opposite level subtracts the penalty.
pub fn depth_score(candidate: &CandidateResource, level: Level, settings: &RankingSettings) -> f64 {
    let title = candidate.title().to_lowercase();
    let snippet = candidate.snippet().to_lowercase();

    let mut score = match settings.level_keywords.get(&level) {
        Some(keywords) if !keywords.is_empty() => {
            let found = keywords
                .iter()
                .filter(|k| {
                    let k = k.to_lowercase();
                    title.contains(&k) || snippet.contains(&k)
                })
                .count();
            found as f64 / keywords.len() as f64
        }
        _ => settings.neutral_depth,
    };

    if title_has_any(&title, settings.confirming_signals.get(&level)) {
        score += settings.level_bonus;
    }
    if title_has_any(&title, settings.mismatch_signals.get(&level)) {
        score -= settings.mismatch_penalty;
    }

    score.clamp(0.0, 1.0)
}

fn title_has_any(title: &str, words: Option<&Vec<String>>) -> bool {
    words.is_some_and(|words| words.iter().any(|w| title.contains(&w.to_lowercase())))
}
