//! samples CLI - Create projects from Stripe sample repositories

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use samples_core::tui::{CacheArgs, CreateArgs};
use samples_core::ProductConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Stripe samples product configuration
#[derive(Clone)]
pub struct StripeSamplesConfig;

impl ProductConfig for StripeSamplesConfig {
    fn name(&self) -> &'static str {
        "stripe-samples"
    }

    fn display_name(&self) -> &'static str {
        "Stripe Samples"
    }

    fn default_repo_base_url(&self) -> &'static str {
        "https://github.com/stripe-samples"
    }

    fn repo_base_url_env(&self) -> &'static str {
        "STRIPE_SAMPLES_REPO_URL"
    }

    fn default_api_base_url(&self) -> &'static str {
        "https://api.stripe.com"
    }

    fn api_base_url_env(&self) -> &'static str {
        "STRIPE_API_BASE"
    }

    fn docs_url(&self) -> &'static str {
        "https://docs.stripe.com/samples"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for scaffolding Stripe sample projects"
    }

    fn user_agent(&self) -> &'static str {
        concat!("stripe-samples-cli/", env!("CARGO_PKG_VERSION"))
    }

    fn next_steps(&self, dir: &Path) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        // Step 1: cd to directory if not current
        if current.as_deref() != Some(dir) {
            steps.push(format!("cd {}", dir.display()));
        }

        // Step 2: The README explains how to run client and server
        steps.push("Open README.md to get started".to_string());

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "samples")]
#[command(about = "CLI for scaffolding Stripe sample projects")]
#[command(version)]
pub struct Args {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory samples are cached in
    #[arg(long = "cache-dir", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Config file holding profiles and created resource ids
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project from a sample
    Create(CliCreateArgs),
    /// Remove the cached copy of a sample
    DeleteCache(DeleteCacheArgs),
}

#[derive(Parser, Debug)]
pub struct CliCreateArgs {
    /// Sample name (e.g. accept-a-payment) or git URL
    pub sample: String,

    /// Directory to create (defaults to the sample name)
    pub destination: Option<PathBuf>,

    /// Integration to use
    #[arg(long)]
    pub integration: Option<String>,

    /// Client variant to use
    #[arg(long)]
    pub client: Option<String>,

    /// Server variant to use
    #[arg(long)]
    pub server: Option<String>,

    /// Create required resources without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Delete the cached copy before downloading
    #[arg(long = "force-refresh")]
    pub force_refresh: bool,

    /// Profile to read credentials from
    #[arg(short, long)]
    pub profile: Option<String>,
}

#[derive(Parser, Debug)]
pub struct DeleteCacheArgs {
    /// Sample name or git URL
    pub sample: String,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stderr keeps log lines out of the prompts
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_logging(args.verbose);
    tracing::debug!("Parsed arguments: {:?}", args);
    let config = StripeSamplesConfig;

    match args.command {
        Some(Command::Create(create)) => {
            let create_args = CreateArgs {
                sample: create.sample,
                destination: create.destination,
                integration: create.integration,
                client: create.client,
                server: create.server,
                yes: create.yes,
                force_refresh: create.force_refresh,
                profile: create.profile,
                cache_dir: args.cache_dir,
                config_file: args.config,
            };
            let result = samples_core::run(&config, create_args).await;

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
        Some(Command::DeleteCache(delete)) => samples_core::tui::delete_cache(
            &config,
            CacheArgs {
                sample: delete.sample,
                cache_dir: args.cache_dir,
            },
        ),
        None => {
            Args::command().print_help()?;
            Ok(())
        }
    }
}
