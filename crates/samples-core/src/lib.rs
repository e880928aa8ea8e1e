//! Samples Core - scaffolding projects from git-hosted sample repositories
//!
//! A sample repository carries a `.cli.json` descriptor listing its
//! integrations, the client and server variants of each, and any API
//! resources the sample needs. This library turns such a repository into a
//! ready-to-run project:
//!
//! 1. Clone or pull the repository into a local cache
//! 2. Ask which integration, client and server to use
//! 3. Create missing required resources and record their ids in the profile
//! 4. Copy the selected variants into a flat target directory
//! 5. Write the server's `.env` with keys, the webhook secret and resource ids
//!
//! # Architecture
//!
//! - **Collaborators** - [`git::GitClient`], [`api::ApiClient`],
//!   [`api::Authorizer`], [`profile::ProfileStore`] and [`prompt::Prompter`]
//!   are traits so each step can run against fakes
//! - **Workflow** - [`samples::Samples`] strings the steps together
//! - **CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based interactive flow
//! - `rpc` (default): Enables the tonic request guard in [`rpc`]
//!
//! # Concurrency
//!
//! Every step runs sequentially. Nothing locks the cache directory or the
//! profile file, so two runs sharing either can corrupt them.
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use samples_core::{samples::{RepositoryCache, SampleSource, Samples}, git::CommandGit};
//!
//! let cache = RepositoryCache::new(Box::new(CommandGit::new()), cache_root);
//! let mut samples = Samples::new(cache, Box::new(http.clone()), Box::new(http), Box::new(profile));
//!
//! let sample = samples.initialize(&SampleSource::resolve("accept-a-payment", &base)?)?;
//! let selection = samples.select_options(&sample, &my_prompter).await?;
//! samples.copy(&sample, &selection, &target).await?;
//! samples.configure_dotenv(&sample, &selection, &target).await?;
//! ```

pub mod api;
pub mod error;
pub mod git;
pub mod product;
pub mod profile;
pub mod prompt;
pub mod samples;

#[cfg(feature = "rpc")]
pub mod rpc;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use product::ProductConfig;
pub use samples::{Sample, SampleManifest, SampleSource, Samples, SelectionState};

#[cfg(feature = "tui")]
pub use tui::run;
