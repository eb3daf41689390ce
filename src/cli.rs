//! Command-line interface for gossamer.
//!
//! Handles argument parsing and the profile-maintenance subcommands, and
//! produces the runtime options the shell starts with.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gossamer - a tabbed browser window shell
#[derive(Parser)]
#[command(name = "gossamer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Page to open at startup (defaults to the configured start page)
    pub url: Option<String>,

    /// Use an alternate profile directory
    #[arg(long, value_name = "DIR")]
    pub profile_dir: Option<PathBuf>,

    /// Do not save or restore session state
    #[arg(long)]
    pub private: bool,

    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remove the saved session from a profile
    ClearSession {
        /// Profile directory to clear
        #[arg(long, value_name = "DIR")]
        profile_dir: Option<PathBuf>,
    },
}

/// Runtime options passed from the CLI to the application.
#[derive(Clone, Debug)]
pub struct RuntimeOptions {
    /// Page to open at startup
    pub url: Option<String>,
    /// Profile directory holding config and session state
    pub profile_dir: PathBuf,
    /// Skip session save/restore
    pub private: bool,
    /// Log level filter override
    pub log_level: Option<String>,
}

/// Result of CLI processing.
pub enum CliResult {
    /// Continue with normal application startup.
    Continue(RuntimeOptions),
    /// Exit with the given code (subcommand completed).
    Exit(i32),
}

/// Process CLI arguments and handle subcommands.
pub fn process_cli() -> CliResult {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::ClearSession { profile_dir }) => {
            let dir = profile_dir.unwrap_or_else(gossamer_config::Config::profile_dir);
            match crate::session::storage::clear_session(&dir) {
                Ok(()) => {
                    println!("Cleared saved session in {}", dir.display());
                    CliResult::Exit(0)
                }
                Err(error) => {
                    eprintln!("gossamer: {error:#}");
                    CliResult::Exit(1)
                }
            }
        }
        None => CliResult::Continue(RuntimeOptions {
            url: cli.url,
            profile_dir: cli
                .profile_dir
                .unwrap_or_else(gossamer_config::Config::profile_dir),
            private: cli.private,
            log_level: cli.log_level,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_url_and_flags_parse() {
        let cli = Cli::parse_from([
            "gossamer",
            "https://example.org/",
            "--private",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.url.as_deref(), Some("https://example.org/"));
        assert!(cli.private);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
