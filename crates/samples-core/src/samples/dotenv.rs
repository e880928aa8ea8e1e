//! Generating the server's .env from the sample's .env.example

use crate::api::Authorizer;
use crate::error::{Error, Result};
use crate::profile::ProfileStore;
use crate::samples::manifest::SampleManifest;
use crate::samples::selector::SelectionState;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const EXAMPLE_FILE: &str = ".env.example";

pub const PUBLISHABLE_KEY: &str = "STRIPE_PUBLISHABLE_KEY";
pub const SECRET_KEY: &str = "STRIPE_SECRET_KEY";
pub const WEBHOOK_SECRET: &str = "STRIPE_WEBHOOK_SECRET";
pub const STATIC_DIR: &str = "STATIC_DIR";

/// Static assets are served from the client folder next to the server
const STATIC_DIR_VALUE: &str = "../client";

/// Capability the webhook signing secret is scoped to
const WEBHOOKS_CAPABILITY: &str = "webhooks";

/// Key/value contents of an env file, kept sorted by key
pub type EnvMap = BTreeMap<String, String>;

/// Read an env file into a map
pub fn read_env_file(path: &Path) -> Result<EnvMap> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| env_error(path, e))?;

    let mut values = EnvMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| env_error(path, e))?;
        values.insert(key, value);
    }
    Ok(values)
}

fn env_error(path: &Path, err: dotenvy::Error) -> Error {
    match err {
        dotenvy::Error::Io(source) => Error::io(path, source),
        other => Error::Configuration(format!("Failed to parse {}: {}", path.display(), other)),
    }
}

/// Render `values` as `KEY=value` lines.
///
/// Integers are written bare; everything else is double-quoted. Carriage
/// returns are dropped since the reader has no escape for them.
pub fn render_env(values: &EnvMap) -> String {
    let mut out = String::new();
    for (key, value) in values {
        out.push_str(key);
        out.push('=');
        if !value.is_empty() && value.parse::<i64>().is_ok() {
            out.push_str(value);
        } else {
            out.push('"');
            out.push_str(&escape(value));
            out.push('"');
        }
        out.push('\n');
    }
    out
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '$' => escaped.push_str("\\$"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

/// Write `values` to `path`, replacing the file
pub async fn write_env_file(path: &Path, values: &EnvMap) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(parent, e))?;
    }
    tokio::fs::write(path, render_env(values))
        .await
        .map_err(|e| Error::io(path, e))
}

/// Fill in `<location>/server/.env` from `<location>/.env.example`.
///
/// Only runs when the integration has a server and the manifest asks for it.
/// Returns the path written, or `None` when there was nothing to do.
pub async fn configure_dotenv(
    manifest: &SampleManifest,
    selection: &SelectionState,
    location: &Path,
    profile: &dyn ProfileStore,
    authorizer: &dyn Authorizer,
) -> Result<Option<PathBuf>> {
    if !selection.integration.has_servers() || !manifest.configure_dot_env {
        debug!("Skipping .env configuration");
        return Ok(None);
    }

    let mut values = read_env_file(&location.join(EXAMPLE_FILE))?;

    let publishable_key = profile.publishable_key().ok_or_else(|| {
        Error::Configuration(
            "we could not set the publishable key in the .env file; please set this manually or login again to set it automatically next time"
                .to_string(),
        )
    })?;
    let api_key = profile.api_key(false)?;
    let device_name = profile.device_name()?;

    let session = authorizer
        .authorize(&api_key, &device_name, WEBHOOKS_CAPABILITY)
        .await?;

    values.insert(PUBLISHABLE_KEY.to_string(), publishable_key);
    values.insert(SECRET_KEY.to_string(), api_key);
    values.insert(WEBHOOK_SECRET.to_string(), session.secret);
    values.insert(STATIC_DIR.to_string(), STATIC_DIR_VALUE.to_string());

    for reference in &manifest.required_resources {
        if let Some(id) = profile.sample_resource_id(&reference.name) {
            values.insert(reference.env_var.clone(), id);
        }
    }

    let env_file = location.join("server").join(".env");
    write_env_file(&env_file, &values).await?;
    debug!("Wrote {}", env_file.display());

    Ok(Some(env_file))
}
