//! Topic relevance: keyword hits in title and snippet plus fuzzy similarity.

use crate::models::CandidateResource;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use strsim::normalized_levenshtein;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

const TITLE_WEIGHT: f64 = 0.6;
const SNIPPET_WEIGHT: f64 = 0.2;
const TITLE_FUZZY_WEIGHT: f64 = 0.1;
const SNIPPET_FUZZY_WEIGHT: f64 = 0.1;

const STANDALONE_HIT: f64 = 1.0;
const SUBSTRING_HIT: f64 = 0.7;
const SNIPPET_HIT: f64 = 0.5;

/// Split text into lowercase word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Score how well a candidate matches the topic, in `[0, 1]`.
///
/// A topic without any word characters matches nothing and scores 0.
pub fn relevance_score(candidate: &CandidateResource, topic: &str) -> f64 {
    let tokens = tokenize(topic);
    if tokens.is_empty() {
        return 0.0;
    }
    let n = tokens.len() as f64;

    let topic = topic.to_lowercase();
    let title = candidate.title().to_lowercase();
    let snippet = candidate.snippet().to_lowercase();
    let title_words: HashSet<String> = tokenize(&title).into_iter().collect();

    let title_hits: f64 = tokens
        .iter()
        .map(|t| {
            if title_words.contains(t) {
                STANDALONE_HIT
            } else if title.contains(t.as_str()) {
                SUBSTRING_HIT
            } else {
                0.0
            }
        })
        .sum();
    let snippet_hits: f64 = tokens
        .iter()
        .filter(|t| snippet.contains(t.as_str()))
        .map(|_| SNIPPET_HIT)
        .sum();

    let score = (title_hits / n) * TITLE_WEIGHT
        + (snippet_hits / n) * SNIPPET_WEIGHT
        + partial_ratio(&topic, &title) * TITLE_FUZZY_WEIGHT
        + partial_ratio(&topic, &snippet) * SNIPPET_FUZZY_WEIGHT;
    score.clamp(0.0, 1.0)
}

/// Best similarity between the shorter string and any equally long window of
/// the longer one, in `[0, 1]`. Empty input scores 0.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0.0;
    }

    let needle: String = short.iter().collect();
    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let hay: String = window.iter().collect();
        let sim = normalized_levenshtein(&needle, &hay);
        if sim > best {
            best = sim;
            if best >= 1.0 {
                break;
            }
        }
    }
    best
}
