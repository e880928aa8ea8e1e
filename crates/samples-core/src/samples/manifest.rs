//! Sample manifest types and parsing

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Descriptor file at the root of every sample repository
pub const MANIFEST_FILE: &str = ".cli.json";

/// Integration name meaning "files live at the repository root"
pub const MAIN_INTEGRATION: &str = "main";

/// A named grouping of client and server variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    pub name: String,

    /// Frontend clients built for this integration
    #[serde(default)]
    pub clients: Vec<String>,

    /// Backend server implementations available for this integration
    #[serde(default)]
    pub servers: Vec<String>,
}

impl Integration {
    pub fn has_clients(&self) -> bool {
        !self.clients.is_empty()
    }

    pub fn has_servers(&self) -> bool {
        !self.servers.is_empty()
    }

    pub fn has_multiple_clients(&self) -> bool {
        self.clients.len() > 1
    }

    pub fn has_multiple_servers(&self) -> bool {
        self.servers.len() > 1
    }

    /// Folder holding this integration, relative to the repository root.
    /// Empty for the `main` integration.
    pub fn path(&self) -> &str {
        if self.name == MAIN_INTEGRATION {
            ""
        } else {
            &self.name
        }
    }
}

/// A resource the sample needs, and the env var that receives its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredResourceRef {
    /// Catalog name, also the key of the ledger entry
    pub name: String,
    pub env_var: String,
}

/// Parsed `.cli.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleManifest {
    pub name: String,

    /// Whether the server's .env should be generated
    #[serde(default)]
    pub configure_dot_env: bool,

    #[serde(default)]
    pub post_install: HashMap<String, String>,

    pub integrations: Vec<Integration>,

    #[serde(default)]
    pub required_resources: Vec<RequiredResourceRef>,
}

impl SampleManifest {
    /// Parse and validate a manifest from JSON text
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: SampleManifest = serde_json::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse {}: {}", MANIFEST_FILE, e)))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read the descriptor at the root of `repo`
    pub fn load(repo: &Path) -> Result<Self> {
        let path = repo.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.integrations.is_empty() {
            return Err(Error::Configuration(format!(
                "Sample '{}' declares no integrations in {}",
                self.name, MANIFEST_FILE
            )));
        }
        Ok(())
    }

    /// Whether the user has to choose between integrations
    pub fn has_multiple_integrations(&self) -> bool {
        self.integrations.len() > 1
    }

    pub fn integration_names(&self) -> Vec<String> {
        self.integrations.iter().map(|i| i.name.clone()).collect()
    }

    pub fn integration(&self, name: &str) -> Option<&Integration> {
        self.integrations.iter().find(|i| i.name == name)
    }

    /// Message shown once the sample has been created
    pub fn post_install_message(&self) -> &str {
        self.post_install
            .get("message")
            .map(String::as_str)
            .unwrap_or("")
    }
}
