//! tag-sync CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tag_sync::{
    client::CatalogClient,
    error::Result,
    models::{Config, PolicyKind},
    pipeline,
    utils::log as console,
};

/// tag-sync - Discount tag synchronizer
#[derive(Parser, Debug)]
#[command(
    name = "tag-sync",
    version,
    about = "Keeps a discount tag in sync with product eligibility"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "tag-sync.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add or remove the tag on every product of the catalog
    Sync {
        /// Report changes without writing them
        #[arg(long)]
        dry_run: bool,

        /// Override the qualification policy (collection, compare_at_price)
        #[arg(long)]
        policy: Option<PolicyKind>,

        /// Override the tag name
        #[arg(long)]
        tag: Option<String>,
    },

    /// Print the id of the collection with the given title
    Resolve {
        /// Collection title (case-insensitive, exact)
        title: String,
    },

    /// Validate configuration without contacting the store
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match Config::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            console::error(&format!("Cannot load {}: {}", cli.config.display(), e));
            return Err(e);
        }
    };
    config.apply_env()?;
    console::init(if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    });

    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Sync {
            dry_run,
            policy,
            tag,
        } => {
            if dry_run {
                config.sync.dry_run = true;
            }
            if let Some(policy) = policy {
                config.sync.policy = policy;
            }
            if let Some(tag) = tag {
                config.sync.tag_name = tag;
            }

            if let Err(e) = config.validate() {
                console::error(&e.to_string());
                return Err(e);
            }
            let client = CatalogClient::from_config(&config)?;
            pipeline::run_sync(&config, &client).await?;
        }

        Command::Resolve { title } => {
            if let Err(e) = config.validate_connection() {
                console::error(&e.to_string());
                return Err(e);
            }
            let client = CatalogClient::from_config(&config)?;
            pipeline::run_resolve(&client, &title).await?;
        }

        Command::Validate => pipeline::run_validate(&config)?,
    }

    Ok(())
}
