//! Required resources
//!
//! Some samples only work once particular API objects (typically prices)
//! exist on the user's account. The manifest names them; this module knows
//! how to create each named kind, and records the created ids in the
//! profile so later runs do not create them again.

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::profile::ProfileStore;
use crate::samples::manifest::SampleManifest;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// How to create one kind of required resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredResourceTemplate {
    /// Name used in `.cli.json` and as the ledger key in the profile
    pub name: &'static str,
    /// Shown when asking whether to create the resource
    pub description: &'static str,
    /// API path the create request is POSTed to
    pub path: &'static str,
    /// Ordered `key=value` form fields
    pub data: &'static [&'static str],
}

impl RequiredResourceTemplate {
    pub fn form_data(&self) -> Vec<String> {
        self.data.iter().map(|field| field.to_string()).collect()
    }
}

/// Immutable registry of the resource kinds the CLI can create
#[derive(Debug)]
pub struct ResourceCatalog {
    templates: &'static [RequiredResourceTemplate],
}

static BUILTIN: ResourceCatalog = ResourceCatalog {
    templates: &[
        RequiredResourceTemplate {
            name: "stripe_samples_price_recurring_basic_id",
            description: "recurring price for a 'basic' plan",
            path: "/v1/prices",
            data: &[
                "currency=usd",
                "unit_amount=1000",
                "product_data[name]=Stripe Sample Basic",
                "recurring[interval]=month",
            ],
        },
        RequiredResourceTemplate {
            name: "stripe_samples_price_recurring_pro_id",
            description: "recurring price for a 'pro' plan",
            path: "/v1/prices",
            data: &[
                "currency=usd",
                "unit_amount=1000",
                "product_data[name]=Stripe Sample Pro",
                "recurring[interval]=month",
            ],
        },
    ],
};

impl ResourceCatalog {
    /// The catalog shipped with the CLI
    pub fn builtin() -> &'static ResourceCatalog {
        &BUILTIN
    }

    pub fn get(&self, name: &str) -> Option<&'static RequiredResourceTemplate> {
        self.templates.iter().find(|template| template.name == name)
    }

    pub fn templates(&self) -> &'static [RequiredResourceTemplate] {
        self.templates
    }
}

/// Resources declared by the manifest that have no id in the profile yet.
///
/// Names missing from the catalog cannot be created and are skipped with a
/// warning. Each name appears at most once, in manifest order.
pub fn missing_required_resources(
    manifest: &SampleManifest,
    profile: &dyn ProfileStore,
    catalog: &ResourceCatalog,
) -> Vec<&'static RequiredResourceTemplate> {
    let mut seen = HashSet::new();
    let mut missing = Vec::new();

    for reference in &manifest.required_resources {
        let Some(template) = catalog.get(&reference.name) else {
            warn!(
                "Sample '{}' requires unknown resource '{}', skipping",
                manifest.name, reference.name
            );
            continue;
        };

        if !seen.insert(template.name) {
            continue;
        }

        if profile.sample_resource_id(template.name).is_none() {
            missing.push(template);
        }
    }

    missing
}

/// Creates required resources and records their ids in the ledger
pub struct ResourceProvisioner<'a> {
    api: &'a dyn ApiClient,
    profile: &'a mut dyn ProfileStore,
    catalog: &'a ResourceCatalog,
}

impl<'a> ResourceProvisioner<'a> {
    pub fn new(
        api: &'a dyn ApiClient,
        profile: &'a mut dyn ProfileStore,
        catalog: &'a ResourceCatalog,
    ) -> Self {
        Self {
            api,
            profile,
            catalog,
        }
    }

    /// Create the resource named `name` (test mode) and return its id
    pub async fn create(&self, name: &str) -> Result<String> {
        let template = self.catalog.get(name).ok_or_else(|| {
            Error::Configuration(format!(
                "Unexpected: tried to create unknown required resource {}",
                name
            ))
        })?;

        let api_key = self.profile.api_key(false)?;
        debug!("Creating required resource {} via {}", name, template.path);

        let body = self
            .api
            .post_form(&api_key, template.path, &template.form_data())
            .await?;

        extract_id(name, &body)
    }

    /// Record `id` in memory and on disk
    pub fn persist(&mut self, name: &str, id: &str) -> Result<()> {
        self.profile.set_sample_resource_id(name, id);
        self.profile.write_config_field(name, id)
    }

    /// Create each template in order, persisting every id before moving on.
    /// Stops at the first failure; ids persisted so far stay persisted.
    pub async fn create_all(
        &mut self,
        templates: &[&RequiredResourceTemplate],
    ) -> Result<Vec<(String, String)>> {
        let mut created = Vec::with_capacity(templates.len());
        for template in templates {
            let id = self.create(template.name).await?;
            self.persist(template.name, &id)?;
            info!("Created {} ({})", template.name, id);
            created.push((template.name.to_string(), id));
        }
        Ok(created)
    }
}

fn extract_id(name: &str, body: &[u8]) -> Result<String> {
    let unexpected = || {
        Error::Data(format!(
            "Unexpected response from the API when creating {}, did not contain ID: {}",
            name,
            String::from_utf8_lossy(body)
        ))
    };

    let fields: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(body).map_err(|_| unexpected())?;

    fields
        .get("id")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(unexpected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApiClient;
    use crate::testing::MemoryProfile;

    const BASIC: &str = "stripe_samples_price_recurring_basic_id";
    const PRO: &str = "stripe_samples_price_recurring_pro_id";

    fn manifest(resources: &[&str]) -> SampleManifest {
        let refs: Vec<String> = resources
            .iter()
            .map(|name| format!(r#"{{"name": "{}", "envVar": "PRICE"}}"#, name))
            .collect();
        SampleManifest::parse(&format!(
            r#"{{"name": "demo", "integrations": [{{"name": "main"}}], "requiredResources": [{}]}}"#,
            refs.join(",")
        ))
        .unwrap()
    }

    fn names(templates: &[&RequiredResourceTemplate]) -> Vec<&'static str> {
        templates.iter().map(|t| t.name).collect()
    }

    #[test]
    fn test_builtin_catalog_lookup() {
        let catalog = ResourceCatalog::builtin();
        let basic = catalog.get(BASIC).unwrap();
        assert_eq!(basic.path, "/v1/prices");
        assert_eq!(basic.data[2], "product_data[name]=Stripe Sample Basic");
        assert!(catalog.get("nope").is_none());
        assert_eq!(catalog.templates().len(), 2);
    }

    #[test]
    fn test_gap_check_excludes_recorded_ids() {
        let profile = MemoryProfile::default().with_resource(BASIC, "price_123");
        let missing =
            missing_required_resources(&manifest(&[BASIC, PRO]), &profile, ResourceCatalog::builtin());
        assert_eq!(names(&missing), vec![PRO]);
    }

    #[test]
    fn test_gap_check_is_idempotent() {
        let profile = MemoryProfile::default();
        let manifest = manifest(&[BASIC, PRO]);

        let first = missing_required_resources(&manifest, &profile, ResourceCatalog::builtin());
        let second = missing_required_resources(&manifest, &profile, ResourceCatalog::builtin());
        assert_eq!(first, second);
        assert_eq!(names(&first), vec![BASIC, PRO]);
    }

    #[test]
    fn test_gap_check_skips_unknown_names() {
        let profile = MemoryProfile::default();
        let missing = missing_required_resources(
            &manifest(&[BASIC, "not_in_catalog", PRO]),
            &profile,
            ResourceCatalog::builtin(),
        );
        assert_eq!(names(&missing), vec![BASIC, PRO]);
    }

    #[test]
    fn test_gap_check_collapses_duplicates() {
        let profile = MemoryProfile::default();
        let missing = missing_required_resources(
            &manifest(&[BASIC, BASIC]),
            &profile,
            ResourceCatalog::builtin(),
        );
        assert_eq!(names(&missing), vec![BASIC]);
    }

    #[test]
    fn test_extract_id() {
        assert_eq!(
            extract_id(BASIC, br#"{"id": "price_1", "object": "price"}"#).unwrap(),
            "price_1"
        );

        let err = extract_id(BASIC, br#"{"object": "price"}"#).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
        assert!(err.to_string().contains(BASIC));

        assert!(matches!(extract_id(BASIC, br#"{"id": 42}"#), Err(Error::Data(_))));
        assert!(matches!(extract_id(BASIC, b"<html>"), Err(Error::Data(_))));
        assert!(matches!(extract_id(BASIC, b"[1, 2]"), Err(Error::Data(_))));
    }

    #[tokio::test]
    async fn test_create_posts_template_fields_with_test_key() {
        let mut api = MockApiClient::new();
        api.expect_post_form()
            .withf(|key, path, data| {
                key == "sk_test_123"
                    && path == "/v1/prices"
                    && data.len() == 4
                    && data[0] == "currency=usd"
                    && data[3] == "recurring[interval]=month"
            })
            .times(1)
            .returning(|_, _, _| Ok(br#"{"id": "price_basic"}"#.to_vec()));

        let mut profile = MemoryProfile::default();
        let provisioner = ResourceProvisioner::new(&api, &mut profile, ResourceCatalog::builtin());

        assert_eq!(provisioner.create(BASIC).await.unwrap(), "price_basic");
    }

    #[tokio::test]
    async fn test_create_unknown_name_is_error() {
        let mut api = MockApiClient::new();
        api.expect_post_form().never();

        let mut profile = MemoryProfile::default();
        let provisioner = ResourceProvisioner::new(&api, &mut profile, ResourceCatalog::builtin());

        let err = provisioner.create("mystery").await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_creations_persisted() {
        let mut api = MockApiClient::new();
        let mut seq = mockall::Sequence::new();
        api.expect_post_form()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(br#"{"id": "price_basic"}"#.to_vec()));
        api.expect_post_form()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(br#"{"error": {"message": "nope"}}"#.to_vec()));

        let mut profile = MemoryProfile::default();
        let catalog = ResourceCatalog::builtin();
        let templates = vec![catalog.get(BASIC).unwrap(), catalog.get(PRO).unwrap()];

        let err = {
            let mut provisioner = ResourceProvisioner::new(&api, &mut profile, catalog);
            provisioner.create_all(&templates).await.unwrap_err()
        };

        assert!(matches!(err, Error::Data(_)));
        assert_eq!(profile.sample_resource_id(BASIC).as_deref(), Some("price_basic"));
        assert_eq!(profile.written(BASIC).as_deref(), Some("price_basic"));
        assert!(profile.sample_resource_id(PRO).is_none());

        // A later run only needs the one that was not made
        let missing = missing_required_resources(&manifest(&[BASIC, PRO]), &profile, catalog);
        assert_eq!(names(&missing), vec![PRO]);
    }
}
