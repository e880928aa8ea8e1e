//! In-memory collaborators for unit tests

use crate::api::{AuthSession, Authorizer};
use crate::error::{Error, Result};
use crate::profile::ProfileStore;
use crate::prompt::Prompter;
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Profile held entirely in memory; durable writes are tracked separately
#[derive(Debug, Clone)]
pub struct MemoryProfile {
    pub account_id: Option<String>,
    pub api_key: Option<String>,
    pub publishable_key: Option<String>,
    pub device_name: Option<String>,
    resources: HashMap<String, String>,
    written: HashMap<String, String>,
}

impl Default for MemoryProfile {
    fn default() -> Self {
        Self {
            account_id: Some("acct_test".to_string()),
            api_key: Some("sk_test_123".to_string()),
            publishable_key: Some("pk_test_123".to_string()),
            device_name: Some("test-device".to_string()),
            resources: HashMap::new(),
            written: HashMap::new(),
        }
    }
}

impl MemoryProfile {
    pub fn with_resource(mut self, name: &str, id: &str) -> Self {
        self.resources.insert(name.to_string(), id.to_string());
        self
    }

    /// Value durably written for `field`, if any
    pub fn written(&self, field: &str) -> Option<String> {
        self.written.get(field).cloned()
    }
}

fn required(value: &Option<String>, what: &str) -> Result<String> {
    value
        .clone()
        .ok_or_else(|| Error::Configuration(format!("{} not configured", what)))
}

impl ProfileStore for MemoryProfile {
    fn account_id(&self) -> Result<String> {
        required(&self.account_id, "account id")
    }

    fn api_key(&self, _livemode: bool) -> Result<String> {
        required(&self.api_key, "api key")
    }

    fn publishable_key(&self) -> Option<String> {
        self.publishable_key.clone()
    }

    fn device_name(&self) -> Result<String> {
        required(&self.device_name, "device name")
    }

    fn sample_resource_id(&self, name: &str) -> Option<String> {
        self.resources.get(name).filter(|id| !id.is_empty()).cloned()
    }

    fn set_sample_resource_id(&mut self, name: &str, id: &str) {
        self.resources.insert(name.to_string(), id.to_string());
    }

    fn write_config_field(&mut self, field: &str, value: &str) -> Result<()> {
        self.written.insert(field.to_string(), value.to_string());
        Ok(())
    }
}

/// One prompt the scripted prompter was asked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskedPrompt {
    pub kind: String,
    pub options: Vec<String>,
}

/// Answers prompts from a queue; an exhausted queue means the user cancelled
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<AskedPrompt>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<AskedPrompt> {
        self.asked.borrow().clone()
    }

    pub fn asked_kinds(&self) -> Vec<String> {
        self.asked.borrow().iter().map(|p| p.kind.clone()).collect()
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, kind: &str, _label: &str, options: &[String]) -> Result<String> {
        self.asked.borrow_mut().push(AskedPrompt {
            kind: kind.to_string(),
            options: options.to_vec(),
        });
        self.answers.borrow_mut().pop_front().ok_or(Error::Cancelled)
    }
}

/// Authorizer returning a fixed secret and counting calls
#[derive(Debug)]
pub struct StaticAuthorizer {
    pub secret: String,
    calls: Mutex<Vec<(String, String)>>,
}

impl StaticAuthorizer {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(device_name, capability)` of every call so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Authorizer for StaticAuthorizer {
    async fn authorize(
        &self,
        _api_key: &str,
        device_name: &str,
        capability: &str,
    ) -> Result<AuthSession> {
        self.calls
            .lock()
            .unwrap()
            .push((device_name.to_string(), capability.to_string()));
        Ok(AuthSession {
            secret: self.secret.clone(),
            websocket_id: None,
            websocket_url: None,
        })
    }
}
