//! Variant selection
//!
//! Each axis (integration, then client, then server) is only prompted for
//! when it offers more than one option.

use crate::error::{Error, Result};
use crate::prompt::{kind, Prompter, NO, YES};
use crate::samples::manifest::{Integration, SampleManifest};
use crate::samples::resources::RequiredResourceTemplate;
use tracing::debug;

/// Choices made for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub integration: Integration,
    /// Prompted client; `None` when the axis offered at most one option
    pub client: Option<String>,
    /// Prompted server; `None` when the axis offered at most one option
    pub server: Option<String>,
}

impl SelectionState {
    /// Client folder to copy: the prompted one, else the only one offered
    pub fn client_variant(&self) -> Option<&str> {
        resolve_variant(self.client.as_deref(), &self.integration.clients)
    }

    /// Server folder to copy: the prompted one, else the only one offered
    pub fn server_variant(&self) -> Option<&str> {
        resolve_variant(self.server.as_deref(), &self.integration.servers)
    }
}

fn resolve_variant<'a>(chosen: Option<&'a str>, options: &'a [String]) -> Option<&'a str> {
    match (chosen, options) {
        (Some(chosen), _) => Some(chosen),
        (None, [only]) => Some(only.as_str()),
        _ => None,
    }
}

/// Resolve integration, client and server for `manifest`
pub fn select_variants(manifest: &SampleManifest, prompter: &dyn Prompter) -> Result<SelectionState> {
    let integration = if manifest.has_multiple_integrations() {
        let name = choose(
            prompter,
            kind::INTEGRATION,
            "What type of integration would you like to use",
            &manifest.integration_names(),
        )?;
        manifest
            .integration(&name)
            .ok_or_else(|| Error::Configuration(format!("Unknown integration: {}", name)))?
    } else {
        manifest.integrations.first().ok_or_else(|| {
            Error::Configuration(format!("Sample '{}' declares no integrations", manifest.name))
        })?
    };

    let client = if integration.has_multiple_clients() {
        Some(choose(
            prompter,
            kind::CLIENT,
            "Which client would you like to use",
            &integration.clients,
        )?)
    } else {
        None
    };

    let server = if integration.has_multiple_servers() {
        Some(choose(
            prompter,
            kind::SERVER,
            "What server would you like to use",
            &integration.servers,
        )?)
    } else {
        None
    };

    debug!(
        "Selected integration={} client={:?} server={:?}",
        integration.name, client, server
    );

    Ok(SelectionState {
        integration: integration.clone(),
        client,
        server,
    })
}

fn choose(prompter: &dyn Prompter, kind: &str, label: &str, options: &[String]) -> Result<String> {
    let selected = prompter.select(kind, label, options)?;
    if !options.contains(&selected) {
        return Err(Error::Configuration(format!(
            "'{}' is not a valid {} (expected one of: {})",
            selected,
            kind,
            options.join(", ")
        )));
    }
    Ok(selected)
}

/// Ask whether the missing resources should be created automatically
pub fn confirm_auto_create(
    prompter: &dyn Prompter,
    missing: &[&RequiredResourceTemplate],
) -> Result<bool> {
    let descriptions: Vec<&str> = missing.iter().map(|r| r.description).collect();
    let label = format!(
        "This sample requires a few pre-existing resources to exist in test mode on your account:\n  * {}\nWould you like us to automatically create these and configure their IDs?",
        descriptions.join("\n  * ")
    );

    let selected = choose(
        prompter,
        kind::AUTO_CREATE,
        &label,
        &[YES.to_string(), NO.to_string()],
    )?;
    Ok(selected == YES)
}
