//! Rendering a ranking run for the command line.
//!
//! # Submodules
//!
//! - [`json`]: The same JSON document the HTTP endpoint returns
//! - [`markdown`]: A reading list grouped by resource category

pub mod json;
pub mod markdown;

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write rendered output to `path`, creating missing parent directories.
#[instrument(level = "info", skip(contents))]
pub async fn write_output(path: &str, contents: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }
    fs::write(path, contents).await?;
    info!(path, bytes = contents.len(), "Wrote results");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_output_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("learning_scout_{}", std::process::id()));
        let path = dir.join("nested").join("out.md");
        let path = path.to_str().unwrap();

        write_output(path, "# Reading list\n").await.unwrap();
        assert_eq!(fs::read_to_string(path).await.unwrap(), "# Reading list\n");

        fs::remove_dir_all(&dir).await.unwrap();
    }
}
