//! Product configuration trait for CLI binaries
//!
//! The scaffolding workflow is product-agnostic. Each binary implements this
//! trait to say where samples live, which API they provision against, and what
//! to tell the user once the project exists.

use std::path::{Path, PathBuf};
use url::Url;

/// Configuration trait for CLI products built on the scaffolder
///
/// Each product implements this trait to define:
/// - Product identity (name, display name)
/// - Sample repository location
/// - API base URL for provisioning required resources
/// - Documentation links
/// - Post-setup instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for platform directories)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Base URL that bare sample names are resolved against
    fn default_repo_base_url(&self) -> &'static str;

    /// Environment variable name for overriding the repository base URL
    fn repo_base_url_env(&self) -> &'static str;

    /// Default base URL for API requests
    fn default_api_base_url(&self) -> &'static str;

    /// Environment variable name for overriding the API base URL
    fn api_base_url_env(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path) -> Vec<String>;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}

/// Read a URL from `env`, falling back to `default`
pub(crate) fn url_from_env(env: &str, default: &str) -> crate::Result<Url> {
    let raw = std::env::var(env).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw)
        .map_err(|e| crate::Error::Configuration(format!("Invalid URL '{}' ({}): {}", raw, env, e)))
}

/// Repository base URL for a product, honouring its override env var
pub fn repo_base_url<C: ProductConfig>(config: &C) -> crate::Result<Url> {
    url_from_env(config.repo_base_url_env(), config.default_repo_base_url())
}

/// API base URL for a product, honouring its override env var
pub fn api_base_url<C: ProductConfig>(config: &C) -> crate::Result<Url> {
    url_from_env(config.api_base_url_env(), config.default_api_base_url())
}

/// Platform cache directory for downloaded sample repositories
pub fn default_cache_root<C: ProductConfig>(config: &C) -> crate::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", config.name()).ok_or_else(|| {
        crate::Error::Configuration("Failed to determine project directories".to_string())
    })?;
    Ok(dirs.cache_dir().join("samples-cache"))
}

/// Platform location of the profile config file
pub fn default_config_file<C: ProductConfig>(config: &C) -> crate::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", config.name()).ok_or_else(|| {
        crate::Error::Configuration("Failed to determine project directories".to_string())
    })?;
    Ok(dirs.config_dir().join("config.toml"))
}
