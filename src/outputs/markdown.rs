//! Markdown reading list for a ranking run.
//!
//! ```text
//! # Learning Rust (Beginner)
//!
//! _Learning resources for Rust at beginner level._
//!
//! ## Articles
//!
//! - [Rust (programming language)](https://en.wikipedia.org/wiki/...) (score 0.71)
//! ```

use crate::models::{Category, RankingRequest, ResourceView, ScrapeResponse};
use crate::utils::upcase;
use chrono::Local;
use itertools::Itertools;
use std::fmt::Write;

/// Render a response as a Markdown reading list, one section per category.
///
/// Sections follow the fixed category order; within a section resources keep
/// their ranked order. Categories with no resources are left out.
pub fn to_markdown(request: &RankingRequest, response: &ScrapeResponse) -> String {
    let mut md = String::new();
    let _ = writeln!(
        md,
        "# Learning {} ({})\n",
        request.topic(),
        upcase(request.level().as_str())
    );
    let _ = writeln!(md, "_{}._\n", response.content);
    let _ = writeln!(
        md,
        "Generated {}\n",
        Local::now().format("%Y-%m-%d %H:%M")
    );

    if response.resources.is_empty() {
        md.push_str("No resources met the quality bar for this topic.\n");
        return md;
    }

    let mut groups = response.resources.iter().into_group_map_by(|r| r.kind);
    for category in Category::ALL {
        let Some(resources) = groups.remove(&category) else {
            continue;
        };
        let _ = writeln!(md, "## {}\n", category.heading());
        for resource in resources {
            md.push_str(&entry(resource));
        }
        md.push('\n');
    }
    md
}

fn entry(resource: &ResourceView) -> String {
    let title = resource.title.replace('[', "\\[").replace(']', "\\]");
    format!(
        "- [{}]({}) (score {:.2})\n",
        title, resource.link, resource.score
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(kind: Category, title: &str, score: f64) -> ResourceView {
        ResourceView {
            kind,
            title: title.to_string(),
            link: format!("https://example.com/{}", title.len()),
            score,
        }
    }

    #[test]
    fn test_sections_in_category_order() {
        let request = RankingRequest::new("Rust", "beginner").unwrap();
        let response = ScrapeResponse {
            content: "Learning resources for Rust at beginner level".to_string(),
            resources: vec![
                view(Category::Video, "Rust crash course", 0.8),
                view(Category::Article, "Rust (programming language)", 0.7),
                view(Category::Video, "Ownership explained", 0.5),
            ],
        };
        let md = to_markdown(&request, &response);

        assert!(md.starts_with("# Learning Rust (Beginner)\n"));
        let articles = md.find("## Articles").unwrap();
        let videos = md.find("## Videos").unwrap();
        assert!(articles < videos);
        assert!(!md.contains("## Blog Posts"));

        let crash = md.find("Rust crash course").unwrap();
        let ownership = md.find("Ownership explained").unwrap();
        assert!(crash < ownership);
        assert!(md.contains("(score 0.70)"));
    }

    #[test]
    fn test_empty_reading_list() {
        let request = RankingRequest::new("Cobol", "advanced").unwrap();
        let response = ScrapeResponse::new(&request, &[]);
        let md = to_markdown(&request, &response);
        assert!(md.contains("No resources met the quality bar"));
    }

    #[test]
    fn test_entry_escapes_brackets() {
        let r = view(Category::Blog, "[Guide] Rust", 0.456);
        assert_eq!(
            entry(&r),
            "- [\\[Guide\\] Rust](https://example.com/12) (score 0.46)\n"
        );
    }
}
