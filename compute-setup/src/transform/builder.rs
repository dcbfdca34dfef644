//! Raw cluster description to provider-shaped compute configuration.
//!
//! The mapping is purely structural: values are moved into their provider
//! location, defaults fill in optional fields the author left out, and nothing
//! is renamed or coerced. Missing required keys surface as [`StructuralError`].

use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use crate::error::{StructuralError, TransformResult};
use crate::models::{
    Authentication, ClusterSpec, ComputeConfig, DeploymentConfiguration, RawConfig, Registry,
    Settings,
};

/// Service account used by runtime pods when the cluster section names none.
pub const DEFAULT_SERVICE_ACCOUNT: &str = "faas";

/// Build the compute configuration from a raw cluster description.
///
/// Pure: the same input always yields the same output.
///
/// # Errors
/// [`StructuralError::MissingKey`] when a required section or key is absent,
/// [`StructuralError::WrongShape`] when a section is not of the expected type.
pub fn transform(raw: &RawConfig) -> TransformResult<ComputeConfig> {
    if !raw.as_value().is_object() {
        return Err(StructuralError::wrong_shape("(document)", "an object"));
    }

    let cluster = required_section(raw, "cluster")?;
    let auth = required_section(raw, "authentication")?;
    let network = optional_section(raw, "network")?;
    let registry = optional_section(raw, "registry")?;

    let node_pools = match raw.get("nodePools") {
        None => return Err(StructuralError::missing("nodePools")),
        Some(v @ Value::Array(_)) => v.clone(),
        Some(_) => return Err(StructuralError::wrong_shape("nodePools", "an array")),
    };

    // `metadata: null` is treated like an absent section.
    let metadata = match raw.get("metadata") {
        None | Some(Value::Null) => json!({}),
        Some(v) => v.clone(),
    };

    Ok(ComputeConfig {
        authentication: Authentication {
            ca: field_or(auth, "ca", json!("")),
            token: required(auth, "authentication", "token")?,
        },
        config: ClusterSpec {
            endpoint: required(cluster, "cluster", "endpoint")?,
            kubernetes_version: required(cluster, "cluster", "kubernetesVersion")?,
            name: required(cluster, "cluster", "name")?,
            node_pools,
            metadata,
            settings: Settings {
                default_namespace: required(cluster, "cluster", "defaultNamespace")?,
            },
            deployment_configuration: DeploymentConfiguration {
                volumes: top_level_or(raw, "volumes", json!([])),
                service_account_name: field_or(
                    cluster,
                    "serviceAccountName",
                    json!(DEFAULT_SERVICE_ACCOUNT),
                ),
                security_context: top_level_or(raw, "securityContext", json!({})),
                registry: Registry {
                    domain: field_or(registry, "domain", json!(Registry::DEFAULT_DOMAIN)),
                    faas_folder: field_or(registry, "faasFolder", json!(Registry::DEFAULT_FOLDER)),
                    bootstrap_folder: field_or(
                        registry,
                        "bootstrapFolder",
                        json!(Registry::DEFAULT_FOLDER),
                    ),
                },
                default_resources: top_level_or(raw, "defaultResources", json!({})),
                internal_requests_url: field_or(network, "internalRequestsUrl", Value::Null),
                environment_variables: field_or(network, "environmentVariables", json!([])),
            },
            plugins: top_level_or(raw, "plugins", json!([])),
            provider: required(cluster, "cluster", "provider")?,
        },
    })
}

static EMPTY: Lazy<Map<String, Value>> = Lazy::new(Map::new);

fn required_section<'a>(raw: &'a RawConfig, key: &str) -> TransformResult<&'a Map<String, Value>> {
    match raw.get(key) {
        None => Err(StructuralError::missing(key)),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(StructuralError::wrong_shape(key, "an object")),
    }
}

/// Absent or `null` sections read as empty so every field takes its default.
fn optional_section<'a>(raw: &'a RawConfig, key: &str) -> TransformResult<&'a Map<String, Value>> {
    match raw.get(key) {
        None | Some(Value::Null) => Ok(&EMPTY),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(StructuralError::wrong_shape(key, "an object")),
    }
}

fn required(section: &Map<String, Value>, prefix: &str, key: &str) -> TransformResult<Value> {
    section
        .get(key)
        .cloned()
        .ok_or_else(|| StructuralError::missing(format!("{prefix}.{key}")))
}

fn field_or(section: &Map<String, Value>, key: &str, default: Value) -> Value {
    section.get(key).cloned().unwrap_or(default)
}

fn top_level_or(raw: &RawConfig, key: &str, default: Value) -> Value {
    raw.get(key).cloned().unwrap_or(default)
}
