//! Command-line interface definitions for trendpress.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Scheduling knobs can be provided via command-line flags or environment
//! variables; credentials come only from the environment (see `config`).

use clap::Parser;

/// Command-line arguments for the trendpress pipeline.
///
/// # Examples
///
/// ```sh
/// # Publish once and exit
/// trendpress --runs 1
///
/// # Publish every two hours until killed
/// trendpress --interval-secs 7200
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Number of pipeline runs before exiting; omit to run indefinitely
    #[arg(short, long, env = "TRENDPRESS_RUNS")]
    pub runs: Option<u64>,

    /// Seconds to sleep between pipeline runs
    #[arg(short, long, env = "TRENDPRESS_INTERVAL_SECS", default_value_t = 120)]
    pub interval_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["trendpress"]);
        assert_eq!(cli.runs, None);
        assert_eq!(cli.interval_secs, 120);
    }

    #[test]
    fn test_cli_bounded_runs() {
        let cli = Cli::parse_from(["trendpress", "--runs", "3", "--interval-secs", "60"]);
        assert_eq!(cli.runs, Some(3));
        assert_eq!(cli.interval_secs, 60);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["trendpress", "-r", "1", "-i", "30"]);
        assert_eq!(cli.runs, Some(1));
        assert_eq!(cli.interval_secs, 30);
    }
}
