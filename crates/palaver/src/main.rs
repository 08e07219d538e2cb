// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Palaver - a terminal chat client for a remote completion service.
//!
//! This is the binary entry point.

mod render;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use palaver_config::model::PalaverConfig;
use palaver_core::PalaverError;
use tracing::debug;

/// Palaver - chat with a remote completion service from the terminal.
#[derive(Parser, Debug)]
#[command(name = "palaver", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Start an interactive chat (the default).
    Chat,
    /// Send one message and print the reply.
    Ask {
        /// Message text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => palaver_config::load_and_validate_path(path),
        None => palaver_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            palaver_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.shell.log_level);
    debug!(endpoint = %config.endpoint.url, "config loaded");

    let result = match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => shell::run_chat(config).await,
        Commands::Ask { text } => run_ask(config, &text.join(" ")).await,
        Commands::Config => print_config(&config),
    };

    if let Err(e) = result {
        debug!(error = %e, "command failed");
        eprintln!("{}: {}", "error".red(), e.user_message());
        std::process::exit(1);
    }
}

/// One-shot submit: prints the reply text on success.
async fn run_ask(config: PalaverConfig, text: &str) -> Result<(), PalaverError> {
    let controller = shell::build_controller(&config)?;
    let turn = controller.submit(text).await?;
    println!("{}", turn.content());
    Ok(())
}

fn print_config(config: &PalaverConfig) -> Result<(), PalaverError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| PalaverError::Internal(format!("failed to serialize config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level. Logs go to
/// stderr so they never interleave with replies on stdout.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("palaver={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["palaver"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn ask_joins_words() {
        let cli = Cli::try_parse_from(["palaver", "ask", "hello", "there"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Ask {
                text: vec!["hello".into(), "there".into()]
            })
        );
    }

    #[test]
    fn ask_requires_text() {
        assert!(Cli::try_parse_from(["palaver", "ask"]).is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["palaver", "config", "--config", "/tmp/p.toml"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Config));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
    }

    #[test]
    fn default_config_prints_as_toml() {
        let config = palaver_config::load_and_validate_str("").expect("defaults are valid");
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("[endpoint]"));
        assert!(rendered.contains("inactivity_timeout_secs = 1800"));
    }
}
