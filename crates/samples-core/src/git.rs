//! Version-control collaborator
//!
//! The scaffolder only needs two primitives: clone a repository into a
//! directory, and pull an existing working copy. [`CommandGit`] implements
//! them by shelling out to the `git` binary.

use std::path::Path;
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Errors reported by a [`GitClient`].
#[derive(Error, Debug)]
pub enum GitError {
    /// A pull found nothing new. Callers treat this as success.
    #[error("already up-to-date")]
    AlreadyUpToDate,

    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
}

/// Clone and pull primitives used by the repository cache.
#[cfg_attr(test, mockall::automock)]
pub trait GitClient: Send + Sync {
    /// Clone `url` into `destination`.
    fn clone_repo(&self, destination: &Path, url: &str) -> Result<(), GitError>;

    /// Pull the working copy at `path`.
    ///
    /// Returns [`GitError::AlreadyUpToDate`] when there was nothing to fetch.
    fn pull(&self, path: &Path) -> Result<(), GitError>;
}

/// [`GitClient`] backed by the system `git` binary
#[derive(Debug, Default, Clone)]
pub struct CommandGit;

impl CommandGit {
    pub fn new() -> Self {
        Self
    }

    /// Check if git is available in PATH
    pub fn is_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

/// Both spellings have been used by git over the years.
fn reports_up_to_date(stdout: &str) -> bool {
    stdout.contains("Already up to date") || stdout.contains("Already up-to-date")
}

impl GitClient for CommandGit {
    fn clone_repo(&self, destination: &Path, url: &str) -> Result<(), GitError> {
        debug!("git clone {} {}", url, destination.display());

        let output = Command::new("git")
            .args(["clone", "--quiet", url])
            .arg(destination)
            .output()?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: "clone".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    fn pull(&self, path: &Path) -> Result<(), GitError> {
        debug!("git pull in {}", path.display());

        let output = Command::new("git")
            .args(["pull", "--ff-only"])
            .current_dir(path)
            .output()?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: "pull".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if reports_up_to_date(&String::from_utf8_lossy(&output.stdout)) {
            return Err(GitError::AlreadyUpToDate);
        }

        Ok(())
    }
}
