//! Command-line interface definitions for AI Pulse.
//!
//! Every option has a default or an environment variable, so running the
//! binary with no arguments performs a full build into `dist/`.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the AI Pulse build.
///
/// # Examples
///
/// ```sh
/// # Build into ./dist with the built-in configuration
/// ai_pulse
///
/// # Custom output directory and configuration file
/// ai_pulse -o ./public -c ./pulse.yaml
///
/// # Credential from the environment enables translation and briefings
/// DEEPSEEK_API_KEY=sk-... ai_pulse
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory the daily page, index.html and history.json are written to
    #[arg(short, long, env = "AI_PULSE_OUTPUT_DIR", default_value = "dist")]
    pub output_dir: PathBuf,

    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "AI_PULSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// DeepSeek API key; without it translation and briefings are skipped
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    pub deepseek_api_key: Option<String>,
}

impl Cli {
    /// The credential, treating an empty value as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.deepseek_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "ai_pulse",
            "--output-dir",
            "./public",
            "--config",
            "./pulse.yaml",
            "--deepseek-api-key",
            "sk-test",
        ]);

        assert_eq!(cli.output_dir, PathBuf::from("./public"));
        assert_eq!(cli.config, Some(PathBuf::from("./pulse.yaml")));
        assert_eq!(cli.api_key(), Some("sk-test"));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["ai_pulse", "-o", "/tmp/out", "-c", "/tmp/c.yaml"]);

        assert_eq!(cli.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
    }

    #[test]
    fn test_blank_key_is_absent() {
        let cli = Cli::parse_from(["ai_pulse", "--deepseek-api-key", "   "]);
        assert_eq!(cli.api_key(), None);
    }
}
