//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod config_cmd;
mod extract;
mod helpers;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pagecheck::config::load_settings;
use pagecheck::report::ReportFormat;

#[derive(Parser)]
#[command(name = "pagecheck")]
#[command(about = "Check social pages for recent activity")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Classify "last posted" strings as active or not
    Check {
        /// Strings as shown on the page (e.g. "3d", "March 30", "August 18, 2022")
        #[arg(required = true)]
        texts: Vec<String>,
        /// Reference time (RFC 3339, default: now)
        #[arg(long)]
        now: Option<String>,
        /// Recency window in days (overrides config)
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
        window_days: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Normalize abbreviated follower counts ("1.2K" -> "1200")
    Followers {
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Extract page details from a saved HTML file
    Extract {
        /// HTML file to read
        html_file: PathBuf,
        /// URL the page was saved from
        #[arg(long)]
        url: String,
        /// Reference time (RFC 3339, default: now)
        #[arg(long)]
        now: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check every page in a link list and write a report
    Scrape {
        /// CSV file with a URL column, or a text file with one link per line
        links_file: Option<PathBuf>,
        /// Page link to check (can specify multiple)
        #[arg(long = "url")]
        urls: Vec<String>,
        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Report format (overrides config)
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
        /// Recency window in days (overrides config)
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
        window_days: Option<i64>,
        /// Delay between requests in milliseconds (overrides config)
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Check {
            texts,
            now,
            window_days,
            json,
        } => {
            if let Some(days) = window_days {
                settings.window_days = days;
            }
            check::cmd_check(&settings, &texts, now.as_deref(), json)
        }
        Commands::Followers { texts } => check::cmd_followers(&texts),
        Commands::Extract {
            html_file,
            url,
            now,
            json,
        } => extract::cmd_extract(&settings, &html_file, &url, now.as_deref(), json),
        Commands::Scrape {
            links_file,
            urls,
            output,
            format,
            window_days,
            delay_ms,
        } => {
            if let Some(output) = output {
                settings.output_dir = output;
            }
            if let Some(format) = format {
                settings.report_format = format;
            }
            if let Some(days) = window_days {
                settings.window_days = days;
            }
            if let Some(delay) = delay_ms {
                settings.request_delay_ms = delay;
            }
            scrape::cmd_scrape(&settings, links_file.as_deref(), urls).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show { json } => {
                config_cmd::cmd_config_show(&settings, cli.config.as_deref(), json).await
            }
        },
    }
}
