//! Sample scaffolding workflow
//!
//! This module provides:
//! - The repository cache (clone or pull of sample repositories)
//! - `.cli.json` parsing
//! - Variant selection and required-resource provisioning
//! - Copying the selected variants and composing the server's .env
//!
//! [`Samples`] strings these together. A run is:
//! `initialize` -> `select_options` -> `copy` -> `configure_dotenv`.

pub mod cache;
pub mod copier;
pub mod dotenv;
pub mod manifest;
pub mod resources;
pub mod selector;

use crate::api::{ApiClient, Authorizer};
use crate::error::Result;
use crate::profile::ProfileStore;
use crate::prompt::Prompter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use cache::{RepositoryCache, SampleSource};
pub use copier::copy_sample;
pub use dotenv::configure_dotenv;
pub use manifest::{Integration, RequiredResourceRef, SampleManifest, MANIFEST_FILE};
pub use resources::{
    missing_required_resources, RequiredResourceTemplate, ResourceCatalog, ResourceProvisioner,
};
pub use selector::{confirm_auto_create, select_variants, SelectionState};

/// A sample whose working copy is present and whose descriptor was parsed
#[derive(Debug, Clone)]
pub struct Sample {
    pub name: String,
    /// Cached working copy
    pub repo: PathBuf,
    pub manifest: SampleManifest,
}

/// Runs the scaffolding steps against a set of collaborators
pub struct Samples {
    cache: RepositoryCache,
    api: Box<dyn ApiClient>,
    authorizer: Box<dyn Authorizer>,
    profile: Box<dyn ProfileStore>,
    catalog: &'static ResourceCatalog,
}

impl Samples {
    pub fn new(
        cache: RepositoryCache,
        api: Box<dyn ApiClient>,
        authorizer: Box<dyn Authorizer>,
        profile: Box<dyn ProfileStore>,
    ) -> Self {
        Self {
            cache,
            api,
            authorizer,
            profile,
            catalog: ResourceCatalog::builtin(),
        }
    }

    pub fn profile(&self) -> &dyn ProfileStore {
        self.profile.as_ref()
    }

    /// Bring the cached working copy up to date and parse its descriptor
    pub fn initialize(&self, source: &SampleSource) -> Result<Sample> {
        let repo = self.cache.sync(source)?;
        let manifest = SampleManifest::load(&repo)?;
        debug!(
            "Loaded {} with {} integration(s)",
            manifest.name,
            manifest.integrations.len()
        );

        Ok(Sample {
            name: source.name.clone(),
            repo,
            manifest,
        })
    }

    /// Choose variants, then offer to create any required resources the
    /// profile does not have ids for yet.
    ///
    /// Declining leaves the selection intact; the sample is still created
    /// and the matching .env entries keep their example values.
    pub async fn select_options(
        &mut self,
        sample: &Sample,
        prompter: &dyn Prompter,
    ) -> Result<SelectionState> {
        let selection = select_variants(&sample.manifest, prompter)?;

        let missing =
            missing_required_resources(&sample.manifest, self.profile.as_ref(), self.catalog);
        if missing.is_empty() {
            return Ok(selection);
        }

        if !confirm_auto_create(prompter, &missing)? {
            info!("Skipping creation of {} required resource(s)", missing.len());
            return Ok(selection);
        }

        let mut provisioner =
            ResourceProvisioner::new(self.api.as_ref(), self.profile.as_mut(), self.catalog);
        provisioner.create_all(&missing).await?;

        Ok(selection)
    }

    /// Copy the selected variants into `target`
    pub async fn copy(
        &self,
        sample: &Sample,
        selection: &SelectionState,
        target: &Path,
    ) -> Result<Vec<PathBuf>> {
        copy_sample(&sample.repo, selection, target).await
    }

    /// Write `<target>/server/.env` when the sample asks for it
    pub async fn configure_dotenv(
        &self,
        sample: &Sample,
        selection: &SelectionState,
        target: &Path,
    ) -> Result<Option<PathBuf>> {
        configure_dotenv(
            &sample.manifest,
            selection,
            target,
            self.profile.as_ref(),
            self.authorizer.as_ref(),
        )
        .await
    }

    /// Drop the cached working copy of `name`
    pub fn delete_cache(&self, name: &str) -> Result<()> {
        self.cache.delete(name)
    }
}
