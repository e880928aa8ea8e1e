//! User profile store
//!
//! The profile holds the account credentials and the resource ledger: the ids
//! of the resources created for samples, keyed by catalog name. Ledger entries
//! outlive the repository cache and are shared by every sample.

use crate::error::{Error, Result};
use std::fs;
use std::path::PathBuf;
use toml::{Table, Value};
use tracing::debug;

/// Env var that overrides the stored secret key
pub const API_KEY_ENV: &str = "STRIPE_API_KEY";

/// Env var that overrides the stored device name
pub const DEVICE_NAME_ENV: &str = "STRIPE_DEVICE_NAME";

/// Profile used when none is specified
pub const DEFAULT_PROFILE: &str = "default";

/// Account and ledger accessors consumed by the workflow.
pub trait ProfileStore: Send + Sync {
    /// Account identifier, used to tag RPC requests
    fn account_id(&self) -> Result<String>;

    /// Secret API key for test mode (`livemode == false`) or live mode
    fn api_key(&self, livemode: bool) -> Result<String>;

    /// Publishable key; `None` when the user never logged in with one
    fn publishable_key(&self) -> Option<String>;

    fn device_name(&self) -> Result<String>;

    /// Stored identifier for a required resource, if any
    fn sample_resource_id(&self, name: &str) -> Option<String>;

    /// Record an identifier in memory for the rest of this run
    fn set_sample_resource_id(&mut self, name: &str, id: &str);

    /// Durably write a field of the current profile
    fn write_config_field(&mut self, field: &str, value: &str) -> Result<()>;
}

/// [`ProfileStore`] backed by a TOML config file with one table per profile
///
/// ```toml
/// [default]
/// device_name = "laptop"
/// test_mode_api_key = "sk_test_..."
/// test_mode_pub_key = "pk_test_..."
/// stripe_samples_price_recurring_basic_id = "price_123"
/// ```
///
/// There is no file locking: two processes writing the same profile at the
/// same time can lose a ledger entry.
#[derive(Debug, Clone)]
pub struct FileProfile {
    path: PathBuf,
    profile: String,
    document: Table,
}

impl FileProfile {
    /// Load `profile` from the config file at `path`.
    /// A missing file behaves like an empty one.
    pub fn load(path: impl Into<PathBuf>, profile: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let document = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            content.parse::<Table>().map_err(|e| {
                Error::Configuration(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            debug!("No config file at {}, starting empty", path.display());
            Table::new()
        };

        Ok(Self {
            path,
            profile: profile.into(),
            document,
        })
    }

    fn field(&self, key: &str) -> Option<String> {
        self.document
            .get(&self.profile)
            .and_then(Value::as_table)
            .and_then(|table| table.get(key))
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn set_field(&mut self, key: &str, value: &str) {
        let mut table = match self.document.remove(&self.profile) {
            Some(Value::Table(table)) => table,
            _ => Table::new(),
        };
        table.insert(key.to_string(), Value::String(value.to_string()));
        self.document.insert(self.profile.clone(), Value::Table(table));
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let content = toml::to_string(&self.document)
            .map_err(|e| Error::Configuration(format!("Failed to serialize config: {}", e)))?;

        // Write next to the target and rename so a crash never leaves half a file
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content).map_err(|e| Error::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| Error::io(&self.path, e))?;
        Ok(())
    }
}

fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

impl ProfileStore for FileProfile {
    fn account_id(&self) -> Result<String> {
        self.field("account_id").ok_or_else(|| {
            Error::Configuration(format!(
                "No account id configured for profile '{}'",
                self.profile
            ))
        })
    }

    fn api_key(&self, livemode: bool) -> Result<String> {
        if let Some(key) = env_override(API_KEY_ENV) {
            return Ok(key);
        }

        let field = if livemode {
            "live_mode_api_key"
        } else {
            "test_mode_api_key"
        };

        self.field(field).ok_or_else(|| {
            Error::Configuration(
                "your API key has not been configured. Log in again or set STRIPE_API_KEY"
                    .to_string(),
            )
        })
    }

    fn publishable_key(&self) -> Option<String> {
        self.field("test_mode_pub_key")
    }

    fn device_name(&self) -> Result<String> {
        if let Some(name) = env_override(DEVICE_NAME_ENV) {
            return Ok(name);
        }
        if let Some(name) = self.field("device_name") {
            return Ok(name);
        }

        env_override("HOSTNAME")
            .or_else(|| env_override("COMPUTERNAME"))
            .ok_or_else(|| Error::Configuration("Could not determine the device name".to_string()))
    }

    fn sample_resource_id(&self, name: &str) -> Option<String> {
        self.field(name)
    }

    fn set_sample_resource_id(&mut self, name: &str, id: &str) {
        self.set_field(name, id);
    }

    fn write_config_field(&mut self, field: &str, value: &str) -> Result<()> {
        self.set_field(field, value);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_profile() {
        let dir = TempDir::new().unwrap();
        let profile = FileProfile::load(dir.path().join("config.toml"), DEFAULT_PROFILE).unwrap();

        assert!(profile.publishable_key().is_none());
        assert!(profile.sample_resource_id("anything").is_none());
        assert!(profile.account_id().is_err());
    }

    #[test]
    fn test_reads_fields_of_selected_profile() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[default]
test_mode_pub_key = "pk_test_default"

[work]
account_id = "acct_123"
test_mode_pub_key = "pk_test_work"
empty_value = ""
"#,
        )
        .unwrap();

        let work = FileProfile::load(&path, "work").unwrap();
        assert_eq!(work.publishable_key().as_deref(), Some("pk_test_work"));
        assert_eq!(work.account_id().unwrap(), "acct_123");
        // Empty strings count as unset
        assert!(work.sample_resource_id("empty_value").is_none());

        let default = FileProfile::load(&path, DEFAULT_PROFILE).unwrap();
        assert_eq!(default.publishable_key().as_deref(), Some("pk_test_default"));
    }

    #[test]
    fn test_written_field_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut profile = FileProfile::load(&path, DEFAULT_PROFILE).unwrap();
        profile.set_sample_resource_id("stripe_samples_price_recurring_basic_id", "price_123");
        profile
            .write_config_field("stripe_samples_price_recurring_basic_id", "price_123")
            .unwrap();

        let reloaded = FileProfile::load(&path, DEFAULT_PROFILE).unwrap();
        assert_eq!(
            reloaded
                .sample_resource_id("stripe_samples_price_recurring_basic_id")
                .as_deref(),
            Some("price_123")
        );
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_in_memory_set_is_not_durable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut profile = FileProfile::load(&path, DEFAULT_PROFILE).unwrap();
        profile.set_sample_resource_id("some_resource", "id_1");
        assert_eq!(profile.sample_resource_id("some_resource").as_deref(), Some("id_1"));

        let reloaded = FileProfile::load(&path, DEFAULT_PROFILE).unwrap();
        assert!(reloaded.sample_resource_id("some_resource").is_none());
    }

    /// Restores an env var to its prior value when dropped
    struct EnvGuard {
        name: &'static str,
        previous: Option<String>,
    }

    impl EnvGuard {
        fn set(name: &'static str, value: Option<&str>) -> Self {
            let previous = std::env::var(name).ok();
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
            Self { name, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.previous {
                Some(value) => std::env::set_var(self.name, value),
                None => std::env::remove_var(self.name),
            }
        }
    }

    // Env vars are process-wide: every env-dependent assertion stays in this test
    #[test]
    fn test_env_overrides_and_device_name_fallback() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[default]
test_mode_api_key = "sk_test_file"
live_mode_api_key = "sk_live_file"
device_name = "file-device"
"#,
        )
        .unwrap();
        let configured = FileProfile::load(&path, DEFAULT_PROFILE).unwrap();
        let empty = FileProfile::load(dir.path().join("missing.toml"), DEFAULT_PROFILE).unwrap();

        let _api_key = EnvGuard::set(API_KEY_ENV, None);
        let _device = EnvGuard::set(DEVICE_NAME_ENV, None);
        let _hostname = EnvGuard::set("HOSTNAME", None);
        let _computername = EnvGuard::set("COMPUTERNAME", None);

        // File values when nothing overrides them
        assert_eq!(configured.api_key(false).unwrap(), "sk_test_file");
        assert_eq!(configured.api_key(true).unwrap(), "sk_live_file");
        assert_eq!(configured.device_name().unwrap(), "file-device");
        assert!(matches!(empty.api_key(false), Err(Error::Configuration(_))));

        let err = empty.device_name().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(err.to_string(), "Could not determine the device name");

        // Host name env vars only fill in for a missing device name
        std::env::set_var("COMPUTERNAME", "windows-box");
        assert_eq!(empty.device_name().unwrap(), "windows-box");
        std::env::set_var("HOSTNAME", "linux-box");
        assert_eq!(empty.device_name().unwrap(), "linux-box");
        assert_eq!(configured.device_name().unwrap(), "file-device");

        // Explicit overrides win over the file
        std::env::set_var(API_KEY_ENV, "sk_test_env");
        std::env::set_var(DEVICE_NAME_ENV, "env-device");
        assert_eq!(configured.api_key(false).unwrap(), "sk_test_env");
        assert_eq!(configured.api_key(true).unwrap(), "sk_test_env");
        assert_eq!(configured.device_name().unwrap(), "env-device");
        assert_eq!(empty.api_key(false).unwrap(), "sk_test_env");

        // Empty overrides count as unset
        std::env::set_var(API_KEY_ENV, "");
        std::env::set_var(DEVICE_NAME_ENV, "");
        assert_eq!(configured.api_key(false).unwrap(), "sk_test_file");
        assert_eq!(configured.device_name().unwrap(), "file-device");
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not = [valid").unwrap();

        let err = FileProfile::load(&path, DEFAULT_PROFILE).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
