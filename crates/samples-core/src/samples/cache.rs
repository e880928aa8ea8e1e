//! Local cache of sample repositories
//!
//! Each sample is kept as a git working copy under the cache root:
//! - Absent: cloned from the sample's source URL
//! - Present: pulled, where "already up to date" counts as success
//!
//! The cache can be dropped at any time; the next sync clones again.

use crate::error::{Error, Result};
use crate::git::{GitClient, GitError};
use std::path::PathBuf;
use tracing::{debug, info};
use url::Url;

/// Where a sample comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSource {
    /// Sample name, also the cache folder name
    pub name: String,
    /// Remote to clone from
    pub url: String,
}

impl SampleSource {
    /// Resolve an identifier given on the command line.
    ///
    /// Bare names resolve to `<base>/<name>.git`; anything that looks like a
    /// git URL is used as-is and named after its last path segment.
    pub fn resolve(identifier: &str, base: &Url) -> Result<Self> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(Error::Configuration("Sample name cannot be empty".to_string()));
        }

        if Self::is_url(identifier) {
            let name = identifier
                .trim_end_matches('/')
                .rsplit(['/', ':'])
                .next()
                .map(|segment| segment.trim_end_matches(".git"))
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| {
                    Error::Configuration(format!("Cannot derive a sample name from {}", identifier))
                })?;

            return Ok(Self {
                name: name.to_string(),
                url: identifier.to_string(),
            });
        }

        if identifier.contains(['/', '\\']) || identifier == "." || identifier == ".." {
            return Err(Error::Configuration(format!(
                "Invalid sample name: {}",
                identifier
            )));
        }

        let url = Self::build_url(base, &format!("{}.git", identifier))?;
        Ok(Self {
            name: identifier.to_string(),
            url: url.to_string(),
        })
    }

    fn is_url(identifier: &str) -> bool {
        identifier.contains("://") || identifier.starts_with("git@")
    }

    /// Build a URL by appending a path segment, preserving query parameters
    fn build_url(base: &Url, path_segment: &str) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Configuration(format!("URL cannot have path segments: {}", base)))?
            .pop_if_empty()
            .push(path_segment);
        Ok(url)
    }
}

/// Keeps sample working copies up to date under a cache root
///
/// No locking is done: two processes syncing the same sample at once can
/// corrupt the working copy.
pub struct RepositoryCache {
    git: Box<dyn GitClient>,
    root: PathBuf,
}

impl RepositoryCache {
    pub fn new(git: Box<dyn GitClient>, root: impl Into<PathBuf>) -> Self {
        Self {
            git,
            root: root.into(),
        }
    }

    /// Deterministic cache location for a sample
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Make sure a current working copy of `source` exists and return its path
    pub fn sync(&self, source: &SampleSource) -> Result<PathBuf> {
        let path = self.path_for(&source.name);

        if !path.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))?;
            info!("Cloning {} into {}", source.url, path.display());
            self.git.clone_repo(&path, &source.url)?;
            return Ok(path);
        }

        match self.git.pull(&path) {
            Ok(()) => debug!("Pulled updates for {}", source.name),
            Err(GitError::AlreadyUpToDate) => debug!("{} is already up to date", source.name),
            Err(e) => return Err(e.into()),
        }

        Ok(path)
    }

    /// Remove the cached copy of a sample. Absent caches are fine.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        if !path.exists() {
            debug!("No cache to delete at {}", path.display());
            return Ok(());
        }

        info!("Deleting sample cache {}", path.display());
        std::fs::remove_dir_all(&path).map_err(|e| Error::io(&path, e))
    }
}
