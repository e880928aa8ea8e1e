//! Copying the selected parts of a sample into the target directory
//!
//! The goal is a flat project the user does not have to dig through:
//!
//! ```text
//! my-sample/
//! +-- client/
//! +-- server/
//! +-- README.md
//! `-- .env.example
//! ```
//!
//! Sources, in order: the chosen server variant, the chosen client variant,
//! the top-level files of the integration folder, then the top-level files of
//! the repository shared by every integration.

use crate::error::{Error, Result};
use crate::samples::manifest::MANIFEST_FILE;
use crate::samples::selector::SelectionState;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Copy the selected sample files from `repo` into `target`.
///
/// Returns the top-level paths written. Any copy failure aborts; whatever
/// was already copied is left in place.
pub async fn copy_sample(
    repo: &Path,
    selection: &SelectionState,
    target: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(target)
        .await
        .map_err(|e| Error::io(target, e))?;

    let integration_dir = repo.join(selection.integration.path());
    let mut written = Vec::new();

    if selection.integration.has_servers() {
        let source = variant_dir(&integration_dir, "server", selection.server_variant());
        let destination = target.join("server");
        copy_entry(&source, &destination).await?;
        written.push(destination);
    }

    if selection.integration.has_clients() {
        let source = variant_dir(&integration_dir, "client", selection.client_variant());
        let destination = target.join("client");
        copy_entry(&source, &destination).await?;
        written.push(destination);
    }

    for name in list_top_level_files(&integration_dir).await? {
        let destination = target.join(&name);
        copy_entry(&integration_dir.join(&name), &destination).await?;
        written.push(destination);
    }

    // Files shared by every integration of the sample
    for name in list_top_level_files(repo).await? {
        let destination = target.join(&name);
        copy_entry(&repo.join(&name), &destination).await?;
        if !written.contains(&destination) {
            written.push(destination);
        }
    }

    Ok(written)
}

fn variant_dir(integration_dir: &Path, axis: &str, variant: Option<&str>) -> PathBuf {
    let dir = integration_dir.join(axis);
    match variant {
        Some(variant) => dir.join(variant),
        None => dir,
    }
}

/// Names of the regular files directly inside `dir`, sorted.
/// Subdirectories and the sample descriptor are left out.
pub async fn list_top_level_files(dir: &Path) -> Result<Vec<String>> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| Error::io(dir, e))?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(|e| Error::io(dir, e))? {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| Error::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if name == MANIFEST_FILE {
            continue;
        }
        names.push(name);
    }

    names.sort();
    Ok(names)
}

/// Copy a file, or a directory and everything below it, to `destination`
pub async fn copy_entry(source: &Path, destination: &Path) -> Result<()> {
    let metadata = fs::metadata(source)
        .await
        .map_err(|e| Error::io(source, e))?;

    if !metadata.is_dir() {
        return copy_file(source, destination).await;
    }

    debug!("Copying {} -> {}", source.display(), destination.display());
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            Error::io(path, e.into())
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .unwrap_or_else(|_| entry.path());
        let target_path = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path)
                .await
                .map_err(|e| Error::io(&target_path, e))?;
        } else {
            copy_file(entry.path(), &target_path).await?;
        }
    }

    Ok(())
}

async fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(parent, e))?;
    }
    fs::copy(source, destination)
        .await
        .map_err(|e| Error::io(source, e))?;
    Ok(())
}
