//! Charm-style CLI prompts using cliclack

use crate::api::HttpClient;
use crate::error::Error;
use crate::git::CommandGit;
use crate::product::{self, ProductConfig};
use crate::profile::{FileProfile, DEFAULT_PROFILE};
use crate::prompt::{kind, Prompter, YES};
use crate::samples::{RepositoryCache, Sample, SampleSource, Samples, SelectionState};
use anyhow::{bail, Result};
use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Sample name or git URL
    pub sample: String,

    /// Directory to create; defaults to `./<sample name>`
    pub destination: Option<PathBuf>,

    /// Integration to use instead of prompting
    pub integration: Option<String>,

    /// Client variant to use instead of prompting
    pub client: Option<String>,

    /// Server variant to use instead of prompting
    pub server: Option<String>,

    /// Create missing required resources without asking
    pub yes: bool,

    /// Drop the cached copy of the sample before syncing
    pub force_refresh: bool,

    /// Profile to read credentials from
    pub profile: Option<String>,

    /// Override for the sample cache root
    pub cache_dir: Option<PathBuf>,

    /// Override for the profile config file
    pub config_file: Option<PathBuf>,
}

/// Arguments shared by commands that only touch the cache
#[derive(Debug, Clone, Default)]
pub struct CacheArgs {
    pub sample: String,
    pub cache_dir: Option<PathBuf>,
}

/// [`Prompter`] that asks through cliclack, answering from presets first
#[derive(Debug, Clone, Default)]
pub struct CliclackPrompter {
    integration: Option<String>,
    client: Option<String>,
    server: Option<String>,
    yes: bool,
}

impl CliclackPrompter {
    pub fn from_args(args: &CreateArgs) -> Self {
        Self {
            integration: args.integration.clone(),
            client: args.client.clone(),
            server: args.server.clone(),
            yes: args.yes,
        }
    }

    fn preset(&self, kind: &str) -> Option<String> {
        match kind {
            kind::INTEGRATION => self.integration.clone(),
            kind::CLIENT => self.client.clone(),
            kind::SERVER => self.server.clone(),
            kind::AUTO_CREATE if self.yes => Some(YES.to_string()),
            _ => None,
        }
    }
}

impl Prompter for CliclackPrompter {
    fn select(&self, kind: &str, label: &str, options: &[String]) -> crate::Result<String> {
        if let Some(answer) = self.preset(kind) {
            cliclack::log::info(format!("Using {}: {}", kind, answer)).map_err(prompt_error)?;
            return Ok(answer);
        }

        let mut select = cliclack::select(label);
        for option in options {
            select = select.item(option.clone(), option, "");
        }

        select.interact().map_err(prompt_error)
    }
}

fn prompt_error(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::Interrupted {
        Error::Cancelled
    } else {
        Error::io("<terminal>", err)
    }
}

/// Run the create flow with interactive prompts
pub async fn run<C: ProductConfig>(config: &C, args: CreateArgs) -> Result<()> {
    cliclack::intro(config.display_name())?;

    // Step 1: git does the downloading
    if !CommandGit::is_available() {
        bail!("git is required to download samples; install it and try again");
    }

    // Step 2: Resolve the sample and where it goes
    let source = SampleSource::resolve(&args.sample, &product::repo_base_url(config)?)?;
    let destination = select_destination(&args, &source)?;

    // Step 3: Wire up collaborators
    let mut samples = build_samples(config, &args)?;

    if args.force_refresh {
        samples.delete_cache(&source.name)?;
        cliclack::log::info(format!("Cleared cached copy of {}", source.name))?;
    }

    // Step 4: Clone or update the sample
    let sample = download(&samples, &source)?;

    // Step 5: Choose variants, create missing resources
    let prompter = CliclackPrompter::from_args(&args);
    let selection = match samples.select_options(&sample, &prompter).await {
        Ok(selection) => selection,
        Err(Error::Cancelled) => {
            cliclack::outro_cancel("Setup cancelled.")?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // Step 6: Copy files and write .env
    create_project(&samples, &sample, &selection, &destination).await?;

    // Step 7: Post-install message and next steps
    let message = sample.manifest.post_install_message();
    if !message.is_empty() {
        cliclack::note("Post-install", message)?;
    }
    print_next_steps(config, &destination)?;

    Ok(())
}

/// Remove the cached copy of a sample
pub fn delete_cache<C: ProductConfig>(config: &C, args: CacheArgs) -> Result<()> {
    let root = match args.cache_dir {
        Some(dir) => dir,
        None => product::default_cache_root(config)?,
    };
    let source = SampleSource::resolve(&args.sample, &product::repo_base_url(config)?)?;

    RepositoryCache::new(Box::new(CommandGit::new()), root).delete(&source.name)?;
    println!(
        "{}",
        format!("Removed cached copy of {}", source.name).green()
    );
    Ok(())
}

fn build_samples<C: ProductConfig>(config: &C, args: &CreateArgs) -> Result<Samples> {
    let cache_root = match &args.cache_dir {
        Some(dir) => dir.clone(),
        None => product::default_cache_root(config)?,
    };
    let config_file = match &args.config_file {
        Some(file) => file.clone(),
        None => product::default_config_file(config)?,
    };
    let profile_name = args.profile.as_deref().unwrap_or(DEFAULT_PROFILE);
    let profile = FileProfile::load(config_file, profile_name)?;

    let http = HttpClient::new(product::api_base_url(config)?, config.user_agent());

    Ok(Samples::new(
        RepositoryCache::new(Box::new(CommandGit::new()), cache_root),
        Box::new(http.clone()),
        Box::new(http),
        Box::new(profile),
    ))
}

fn select_destination(args: &CreateArgs, source: &SampleSource) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let path = match &args.destination {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => current_dir.join(dir),
        None => current_dir.join(&source.name),
    };

    if path.exists() {
        bail!("Path already exists, aborting: {}", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.exists() && parent != Path::new("") {
            bail!("Parent directory does not exist: {}", parent.display());
        }
    }

    cliclack::log::info(format!("Creating sample in {}", path.display()))?;
    Ok(path)
}

fn download(samples: &Samples, source: &SampleSource) -> Result<Sample> {
    let spinner = cliclack::spinner();
    spinner.start(format!("Downloading {}...", source.name));

    match samples.initialize(source) {
        Ok(sample) => {
            spinner.stop(format!("Downloaded {}", sample.manifest.name));
            Ok(sample)
        }
        Err(e) => {
            spinner.stop(format!("Failed to download {}", source.name));
            cliclack::log::error(e.to_string())?;
            cliclack::log::info(format!(
                "If the cached copy is broken, run again with {}",
                "--force-refresh".bold()
            ))?;
            Err(e.into())
        }
    }
}

async fn create_project(
    samples: &Samples,
    sample: &Sample,
    selection: &SelectionState,
    destination: &Path,
) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Copying files...");

    let copied = samples.copy(sample, selection, destination).await?;
    spinner.stop(format!(
        "Copied {} entries into {}",
        copied.len(),
        destination.display()
    ));

    let spinner = cliclack::spinner();
    spinner.start("Configuring .env...");

    match samples.configure_dotenv(sample, selection, destination).await {
        Ok(Some(path)) => spinner.stop(format!("Wrote {}", path.display())),
        Ok(None) => spinner.stop("No .env to configure"),
        Err(e) => {
            spinner.stop("Failed to configure .env");
            return Err(e.into());
        }
    }

    Ok(())
}

fn print_next_steps<C: ProductConfig>(config: &C, dir: &Path) -> Result<()> {
    let steps = config.next_steps(dir);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    println!();
    println!("  Docs: {}", config.docs_url());

    cliclack::outro("Happy coding!")?;

    Ok(())
}
