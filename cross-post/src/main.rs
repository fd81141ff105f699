//! cross-post - Post one message to several social platforms at once

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use libcrosscast::config::{load_env_file, Config};
use libcrosscast::logging::LoggingConfig;
use libcrosscast::{CrossPostError, Dispatcher, PlatformId, Registry, RequestFlags, Result};

#[derive(Parser, Debug)]
#[command(name = "cross-post", version)]
#[command(about = "Post one message to several social platforms at once", long_about = None)]
struct Cli {
    /// Message to post; multiple words are joined with spaces
    message: Vec<String>,

    /// Post to every platform
    #[arg(long)]
    all: bool,

    /// Post to Twitter
    #[arg(long)]
    twitter: bool,

    /// Post to Mastodon
    #[arg(long)]
    mastodon: bool,

    /// Post to Threads (currently disabled, always reports false)
    #[arg(long)]
    threads: bool,

    /// Post to Bluesky
    #[arg(long)]
    bluesky: bool,

    /// Post to Nostr
    #[arg(long, alias = "noster")]
    nostr: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Load credentials from this env file instead of ./.env
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn request_flags(&self) -> RequestFlags {
        if self.all {
            return RequestFlags::all();
        }

        RequestFlags {
            twitter: self.twitter,
            mastodon: self.mastodon,
            threads: self.threads,
            bluesky: self.bluesky,
            nostr: self.nostr,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let flags = cli.request_flags();
    if flags.is_empty() {
        let names: Vec<String> = PlatformId::ALL.iter().map(|id| format!("--{}", id)).collect();
        return Err(CrossPostError::InvalidInput(format!(
            "At least one flag is required: {}, or --all",
            names.join(", ")
        )));
    }

    if cli.message.is_empty() {
        return Err(CrossPostError::InvalidInput(
            "Please provide a message to post in quotes.".to_string(),
        ));
    }
    let message = cli.message.join(" ");

    load_env_file(cli.env_file.as_deref())?;

    let mut registry = Registry::build(Config::from_env());
    for id in flags.requested() {
        if !registry.is_configured(id) {
            tracing::info!("{} requested but not configured, skipping", id.display_name());
        }
    }

    if let Err(e) = registry.activate().await {
        tracing::warn!("{}", e);
    }

    let outcome = Dispatcher::new(&registry).cross_post(&message, &flags).await?;

    match cli.format {
        OutputFormat::Text => println!("{}", outcome),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_overrides_individual_flags() {
        let cli = Cli::parse_from(["cross-post", "--all", "--twitter", "hi"]);
        assert_eq!(cli.request_flags(), RequestFlags::all());
    }

    #[test]
    fn test_individual_flags() {
        let cli = Cli::parse_from(["cross-post", "--mastodon", "--noster", "hello", "there"]);

        assert_eq!(
            cli.request_flags(),
            RequestFlags::only(&[PlatformId::Mastodon, PlatformId::Nostr])
        );
        assert_eq!(cli.message.join(" "), "hello there");
    }

    #[test]
    fn test_no_flags() {
        let cli = Cli::parse_from(["cross-post", "hello"]);
        assert!(cli.request_flags().is_empty());
    }

    #[test]
    fn test_format_json() {
        let cli = Cli::parse_from(["cross-post", "--bluesky", "-f", "json", "hi"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
