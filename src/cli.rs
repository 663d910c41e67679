//! CLI definitions for autoquality.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// autoquality CLI.
#[derive(Parser)]
#[command(name = "autoquality")]
#[command(about = "Pick the best stream quality in the w.tv player")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (a missing file means defaults)
    #[arg(short, long, default_value = "config/autoquality.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Watch matching browser tabs and select quality on each page load (default)
    Run {
        /// Chrome remote debugging endpoint (overrides the config)
        #[arg(long, env = "AUTOQUALITY_ENDPOINT")]
        endpoint: Option<String>,

        /// Page URL prefix to watch; repeatable (overrides the config)
        #[arg(long = "match", value_name = "PREFIX")]
        matches: Vec<String>,
    },

    /// Show which of the offered labels would be selected
    Pick {
        /// Labels as they appear in the menu, in menu order
        #[arg(required = true)]
        labels: Vec<String>,
    },

    /// Run the watcher against an in-memory player
    Simulate {
        /// Retry step at which the menu becomes visible
        #[arg(long, default_value_t = 3)]
        delay_step: usize,

        /// Labels offered by the simulated player, comma separated
        #[arg(long, value_delimiter = ',')]
        labels: Option<Vec<String>>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Load and validate the configuration file
    Check,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "autoquality",
            "run",
            "--endpoint",
            "http://127.0.0.1:9333",
            "--match",
            "https://w.tv/",
            "--match",
            "https://www.w.tv/",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Run { endpoint, matches }) => {
                assert_eq!(endpoint.as_deref(), Some("http://127.0.0.1:9333"));
                assert_eq!(matches, vec!["https://w.tv/", "https://www.w.tv/"]);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_pick_requires_labels() {
        assert!(Cli::try_parse_from(["autoquality", "pick"]).is_err());
    }

    #[test]
    fn test_simulate_labels_split_on_commas() {
        let cli =
            Cli::try_parse_from(["autoquality", "simulate", "--labels", "720p,480p,Auto"]).unwrap();
        match cli.command {
            Some(Commands::Simulate { delay_step, labels }) => {
                assert_eq!(delay_step, 3);
                assert_eq!(labels.unwrap(), vec!["720p", "480p", "Auto"]);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["autoquality", "config", "check", "--config", "/tmp/aq.toml"])
                .unwrap();
        assert_eq!(cli.config, PathBuf::from("/tmp/aq.toml"));
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Check
            })
        ));
    }
}
