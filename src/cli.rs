//! Command-line interface definitions for Learning Scout.
//!
//! All options can be given as flags; the configuration path can also come
//! from the environment.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for the Learning Scout application.
///
/// # Examples
///
/// ```sh
/// # One-off search printed as JSON
/// learning_scout search --topic "Machine Learning" --level beginner
///
/// # Reading list written to a file
/// learning_scout search -t rust -l advanced -f markdown -o ./rust.md
///
/// # HTTP service with a tuned config
/// learning_scout --config ./scout.yaml serve --bind 127.0.0.1:8000
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "LEARNING_SCOUT_CONFIG", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find and rank resources for one topic, then exit
    Search {
        /// Subject to learn, e.g. "Python"
        #[arg(short, long)]
        topic: String,

        /// beginner, intermediate or advanced
        #[arg(short, long)]
        level: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Run the HTTP service
    Serve {
        /// Address to listen on; overrides the configuration file
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Markdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_parsing() {
        let cli = Cli::parse_from([
            "learning_scout",
            "search",
            "--topic",
            "Machine Learning",
            "--level",
            "Beginner",
        ]);
        match cli.command {
            Command::Search {
                topic,
                level,
                format,
                output,
            } => {
                assert_eq!(topic, "Machine Learning");
                assert_eq!(level, "Beginner");
                assert_eq!(format, Format::Json);
                assert_eq!(output, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_search_short_flags() {
        let cli = Cli::parse_from([
            "learning_scout",
            "search",
            "-t",
            "rust",
            "-l",
            "advanced",
            "-f",
            "markdown",
            "-o",
            "/tmp/rust.md",
        ]);
        match cli.command {
            Command::Search { format, output, .. } => {
                assert_eq!(format, Format::Markdown);
                assert_eq!(output.as_deref(), Some("/tmp/rust.md"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_serve_with_global_config() {
        let cli = Cli::parse_from([
            "learning_scout",
            "serve",
            "--bind",
            "127.0.0.1:9000",
            "--config",
            "./scout.yaml",
        ]);
        assert_eq!(cli.config.as_deref(), Some("./scout.yaml"));
        match cli.command {
            Command::Serve { bind } => assert_eq!(bind.as_deref(), Some("127.0.0.1:9000")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_search_requires_topic() {
        assert!(Cli::try_parse_from(["learning_scout", "search", "--level", "beginner"]).is_err());
    }
}
