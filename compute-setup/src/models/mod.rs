//! Domain models for the compute configuration pipeline.
//!
//! - [`RawConfig`] - the author-supplied cluster description, kept as JSON
//! - [`ComputeConfig`] - the provider-shaped document submitted for provisioning
//! - [`ConfigSummary`] - the handful of fields printed before a run
//! - [`catalog`] - closed value sets (instance types, service types, plugins)

pub mod catalog;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use catalog::{DlType, MandatoryPlugin, ServeAgentServiceType, ORG_ID_PLACEHOLDERS};

/// Artifact file name used when `output.base64ConfigFile` is not set.
pub const DEFAULT_OUTPUT_FILE: &str = "base64_config.txt";

/// Environment used when `organization.env` is not set.
pub const DEFAULT_ENVIRONMENT: &str = "rc";

// =============================================================================
// Raw input
// =============================================================================

/// The cluster description as written by the user.
///
/// The document stays a [`Value`] so that wrongly-shaped sections (a scalar
/// `metadata`, a string `dlTypes`) survive loading and can be reported by the
/// validator instead of failing deserialization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawConfig {
    doc: Value,
}

impl RawConfig {
    pub fn new(doc: Value) -> Self {
        Self { doc }
    }

    pub fn as_value(&self) -> &Value {
        &self.doc
    }

    /// Top-level key, `None` if the document is not an object or the key is absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.doc.get(key)
    }

    /// Whether a top-level key is present, even if `null`.
    pub fn contains(&self, key: &str) -> bool {
        self.doc.as_object().is_some_and(|o| o.contains_key(key))
    }

    /// Nested key lookup, e.g. `lookup(&["cluster", "name"])`.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(&self.doc, |v, key| v.get(key))
    }

    fn lookup_str(&self, path: &[&str]) -> Option<&str> {
        self.lookup(path).and_then(Value::as_str)
    }

    /// `organization.orgId`, empty when absent.
    pub fn org_id(&self) -> &str {
        self.lookup_str(&["organization", "orgId"]).unwrap_or("")
    }

    /// `organization.env`, defaulting to `rc`.
    pub fn environment(&self) -> &str {
        self.lookup_str(&["organization", "env"])
            .unwrap_or(DEFAULT_ENVIRONMENT)
    }

    /// `output.base64ConfigFile`, defaulting to `base64_config.txt`.
    pub fn output_file(&self) -> &str {
        self.lookup_str(&["output", "base64ConfigFile"])
            .unwrap_or(DEFAULT_OUTPUT_FILE)
    }

    /// Summary fields for display; missing values read `unknown`.
    pub fn summary(&self) -> ConfigSummary {
        let field = |path: &[&str]| self.lookup_str(path).unwrap_or("unknown").to_string();
        ConfigSummary {
            cluster: field(&["cluster", "name"]),
            namespace: field(&["cluster", "defaultNamespace"]),
            provider: field(&["cluster", "provider"]),
            environment: self.environment().to_string(),
            org_id: self.org_id().to_string(),
        }
    }
}

impl From<Value> for RawConfig {
    fn from(doc: Value) -> Self {
        Self::new(doc)
    }
}

/// Human-facing overview of a configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub cluster: String,
    pub namespace: String,
    pub provider: String,
    pub environment: String,
    pub org_id: String,
}

// =============================================================================
// Provider document
// =============================================================================

/// Provider-shaped compute configuration.
///
/// Field order here is the serialization order, which keeps the encoded
/// artifact stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeConfig {
    pub authentication: Authentication,
    pub config: ClusterSpec,
}

/// Credentials the provider uses to reach the cluster API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authentication {
    pub ca: Value,
    pub token: Value,
}

/// Cluster description in provider shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    pub endpoint: Value,
    pub kubernetes_version: Value,
    pub name: Value,
    pub node_pools: Value,
    pub metadata: Value,
    pub settings: Settings,
    pub deployment_configuration: DeploymentConfiguration,
    pub plugins: Value,
    pub provider: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub default_namespace: Value,
}

/// How workloads are deployed onto the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfiguration {
    pub volumes: Value,
    pub service_account_name: Value,
    pub security_context: Value,
    pub registry: Registry,
    pub default_resources: Value,
    pub internal_requests_url: Value,
    pub environment_variables: Value,
}

/// Container registry the cluster pulls runtime images from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    pub domain: Value,
    pub faas_folder: Value,
    pub bootstrap_folder: Value,
}

impl Registry {
    pub const DEFAULT_DOMAIN: &'static str = "hub.dataloop.ai";
    pub const DEFAULT_FOLDER: &'static str = "customerhub";
}

impl ComputeConfig {
    /// Token as a string, empty when absent or not a string.
    pub fn token(&self) -> &str {
        self.authentication.token.as_str().unwrap_or("")
    }

    /// CA certificate as a string, empty when absent or not a string.
    pub fn ca(&self) -> &str {
        self.authentication.ca.as_str().unwrap_or("")
    }

    /// Endpoint as a string, empty when not a string.
    pub fn endpoint(&self) -> &str {
        self.config.endpoint.as_str().unwrap_or("")
    }

    /// Whether any volume is configured.
    pub fn has_volumes(&self) -> bool {
        match &self.config.deployment_configuration.volumes {
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
            Value::Null => false,
            _ => true,
        }
    }
}
