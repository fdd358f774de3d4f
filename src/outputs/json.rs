//! JSON output, identical in shape to the `/scrape_resources` response.

use crate::models::ScrapeResponse;
use tracing::instrument;

/// Pretty-printed JSON for a response.
#[instrument(level = "debug", skip_all, fields(resources = response.resources.len()))]
pub fn to_json(response: &ScrapeResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(response)
}
