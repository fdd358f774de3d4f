//! Error types for request validation, fetching and scoring.
//!
//! Only [`ValidationError`] ever reaches a request's caller. During a run
//! [`FetchError`] stays inside the source adapters (they log it and return
//! what they have; at startup it can fail client construction), and
//! [`ScoringError`] drops a single candidate from a ranking run.

use thiserror::Error;

/// A malformed request, rejected before any fetch is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error("topic must be at most {max} characters, got {len}")]
    TopicTooLong { len: usize, max: usize },
    #[error("invalid level '{0}': must be one of beginner, intermediate, advanced")]
    UnknownLevel(String),
}

/// A single source that could not be reached or parsed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("could not parse response from {url}: {reason}")]
    Parse { url: String, reason: String },
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// A candidate that cannot be scored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("candidate has an empty title")]
    EmptyTitle,
    #[error("candidate link '{link}' is not a valid url: {reason}")]
    InvalidLink { link: String, reason: String },
    #[error("{axis} score is not a finite number")]
    NonFiniteScore { axis: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::EmptyTopic.to_string(), "topic must not be empty");
        assert!(ValidationError::UnknownLevel("pro".into())
            .to_string()
            .contains("'pro'"));
    }

    #[test]
    fn test_fetch_status_message() {
        let err = FetchError::Status {
            status: 503,
            url: "https://example.com".into(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected status 503 from https://example.com"
        );
    }
}
