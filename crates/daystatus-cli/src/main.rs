//! `daystatus` CLI — compose today's availability status and publish it to
//! every configured Slack workspace.
//!
//! ## Usage
//!
//! ```sh
//! # Reads ./config.json and asks the rest interactively
//! daystatus
//!
//! # Use another configuration file
//! daystatus --config ~/.config/daystatus.json
//!
//! # Show what the calendar integrations and publisher are doing
//! RUST_LOG=daystatus=debug daystatus
//! ```

mod terminal;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use daystatus_core::{Config, Session};
use daystatus_integrations::{build_providers, http_client, SlackPublisher};
use tracing_subscriber::EnvFilter;

use crate::terminal::TerminalPrompt;

const MISSING_CONFIG: &str =
    "Configuration file is not present. Please load the 'config.json' file into the directory!";

#[derive(Parser)]
#[command(
    name = "daystatus",
    version,
    about = "Compose today's availability status and publish it to Slack"
)]
struct Cli {
    /// Path of the JSON configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    if !cli.config.is_file() {
        println!("{MISSING_CONFIG}");
        process::exit(1);
    }
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(error) => {
            println!(
                "Configuration file {} could not be used: {}",
                cli.config.display(),
                error
            );
            process::exit(1);
        }
    };

    run(&config)
}

fn run(config: &Config) -> Result<()> {
    let client = http_client().context("Failed to build HTTP client")?;
    let mut providers = build_providers(config, &client);
    let mut prompt = TerminalPrompt::stdio();

    let mut session =
        Session::new(config, config.zone.now()).context("Failed to start the session")?;
    let update = session
        .compose(&mut prompt, &mut providers)
        .context("Failed to compose the status")?;

    let publisher = SlackPublisher::new(client);
    session.publish(&update, &publisher, &mut prompt);
    Ok(())
}

/// Log records go to stderr so they never interleave with the dialogue.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
