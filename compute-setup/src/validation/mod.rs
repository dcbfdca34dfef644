//! Semantic validation of a compute configuration.
//!
//! Rules run in fixed groups. Each group gathers every violation it finds
//! into a [`ViolationCollector`]; the first group that collected anything
//! fails the run with one [`ValidationError`] listing all of them.
//!
//! | Group        | Checks                                                   |
//! |--------------|----------------------------------------------------------|
//! | `Required`   | token, endpoint and organization id present              |
//! | `Endpoint`   | endpoint starts with `http://` or `https://`             |
//! | (warnings)   | CA certificate set, at least one volume                  |
//! | `Metadata`   | object-shaped, `serveAgentServiceType` in the catalog    |
//! | `Plugins`    | every mandatory plugin declared                          |
//! | `NodePools`  | every `dlTypes` is an array of catalog tags              |
//!
//! # Example
//!
//! ```rust,ignore
//! use compute_setup::{transform, validate, RawConfig};
//!
//! let raw = RawConfig::new(serde_json::from_str(&text)?);
//! let compute = transform(&raw)?;
//! for warning in validate(&raw, &compute)? {
//!     println!("{warning}");
//! }
//! ```

pub mod schema;

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{RuleCategory, ValidationError, ValidationResult};
use crate::logs::log_warning;
use crate::models::catalog::is_placeholder_org_id;
use crate::models::{ComputeConfig, DlType, MandatoryPlugin, RawConfig, ServeAgentServiceType};

pub use schema::{is_valid_compute_config, validate_compute_config};

const README_HINT: &str = "See README.md for detailed instructions.";

// =============================================================================
// Warnings
// =============================================================================

/// Recommended but optional setting left empty. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    MissingCa,
    NoVolumes,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingCa => f.write_str(
                "authentication.ca is empty. Set it if your cluster requires a CA certificate.",
            ),
            Warning::NoVolumes => {
                f.write_str("No volumes defined. Add volumes if your workloads need storage.")
            }
        }
    }
}

// =============================================================================
// Violation collector
// =============================================================================

/// Accumulates the violations of one rule group.
#[derive(Debug)]
pub struct ViolationCollector {
    category: RuleCategory,
    violations: Vec<String>,
    hint: Option<String>,
}

impl ViolationCollector {
    pub fn new(category: RuleCategory) -> Self {
        Self {
            category,
            violations: Vec::new(),
            hint: None,
        }
    }

    pub fn push(&mut self, violation: impl Into<String>) {
        self.violations.push(violation.into());
    }

    /// Guidance attached to the error if this group fails.
    pub fn set_hint(&mut self, hint: impl Into<String>) {
        self.hint = Some(hint.into());
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// `Ok` when nothing was collected, otherwise one error with every violation.
    pub fn finish(self) -> ValidationResult<()> {
        if self.violations.is_empty() {
            return Ok(());
        }
        let err = ValidationError::new(self.category, self.violations);
        Err(match self.hint {
            Some(hint) => err.with_hint(hint),
            None => err,
        })
    }
}

// =============================================================================
// Entry point
// =============================================================================

/// Validate the raw input together with its transformed document.
///
/// Returns the non-fatal warnings (also logged) when every rule group passes.
///
/// # Errors
/// [`ValidationError`] for the first failing rule group, carrying all of that
/// group's violations.
pub fn validate(raw: &RawConfig, compute: &ComputeConfig) -> ValidationResult<Vec<Warning>> {
    run_group(RuleCategory::Required, |c| check_required(raw, compute, c))?;
    run_group(RuleCategory::Endpoint, |c| check_endpoint(compute, c))?;

    let warnings = collect_warnings(compute);
    for warning in &warnings {
        log_warning(format!("Warning: {}", warning));
    }

    run_group(RuleCategory::Metadata, |c| check_metadata(raw, c))?;
    run_group(RuleCategory::Plugins, |c| check_plugins(raw, c))?;
    run_group(RuleCategory::NodePools, |c| check_node_pools(raw, c))?;

    Ok(warnings)
}

fn run_group(
    category: RuleCategory,
    rule: impl FnOnce(&mut ViolationCollector),
) -> ValidationResult<()> {
    let mut collector = ViolationCollector::new(category);
    rule(&mut collector);
    collector.finish()
}

// =============================================================================
// Rules
// =============================================================================

/// JSON "emptiness": null, false, zero, empty string or empty container.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Bool(true)) => false,
    }
}

pub fn check_required(raw: &RawConfig, compute: &ComputeConfig, c: &mut ViolationCollector) {
    if is_blank(Some(&compute.authentication.token)) {
        c.push("authentication.token");
    }
    if is_blank(Some(&compute.config.endpoint)) {
        c.push("cluster.endpoint");
    }
    let org_id = raw.lookup(&["organization", "orgId"]);
    let placeholder = org_id
        .and_then(Value::as_str)
        .is_some_and(is_placeholder_org_id);
    if is_blank(org_id) || placeholder {
        c.push("organization.orgId");
    }
    c.set_hint(format!(
        "Please edit your config file and re-run.\n{}",
        README_HINT
    ));
}

pub fn check_endpoint(compute: &ComputeConfig, c: &mut ViolationCollector) {
    let endpoint = compute.endpoint();
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        c.push(format!(
            "cluster.endpoint must start with http:// or https:// (got {})",
            display_value(&compute.config.endpoint)
        ));
    }
}

pub fn collect_warnings(compute: &ComputeConfig) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if is_blank(Some(&compute.authentication.ca)) {
        warnings.push(Warning::MissingCa);
    }
    if !compute.has_volumes() {
        warnings.push(Warning::NoVolumes);
    }
    warnings
}

pub fn check_metadata(raw: &RawConfig, c: &mut ViolationCollector) {
    let metadata = match raw.get("metadata") {
        None | Some(Value::Null) => return,
        Some(Value::Object(map)) => map,
        Some(_) => {
            c.push("metadata must be an object (JSON dict) when provided");
            return;
        }
    };

    let service_type = match metadata.get("serveAgentServiceType") {
        None | Some(Value::Null) => return,
        Some(v) => v,
    };
    let known = service_type
        .as_str()
        .and_then(ServeAgentServiceType::parse)
        .is_some();
    if !known {
        let allowed: Vec<_> = ServeAgentServiceType::ALL.iter().map(|t| t.as_str()).collect();
        c.push(format!(
            "Invalid metadata.serveAgentServiceType: {}. Allowed values: {}",
            display_value(service_type),
            allowed.join(", ")
        ));
    }
}

pub fn check_plugins(raw: &RawConfig, c: &mut ViolationCollector) {
    let present: BTreeSet<&str> = raw
        .get("plugins")
        .and_then(Value::as_array)
        .map(|plugins| {
            plugins
                .iter()
                .filter_map(|p| p.get("name").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    let mut missing: Vec<MandatoryPlugin> = MandatoryPlugin::ALL
        .into_iter()
        .filter(|p| !present.contains(p.name()))
        .collect();
    missing.sort_by_key(|p| p.name());

    for plugin in missing {
        c.push(format!("plugins: {}", plugin));
    }
    c.set_hint(
        "Please add them under the top-level 'plugins' array.\nSee README.md → Plugins for examples.",
    );
}

pub fn check_node_pools(raw: &RawConfig, c: &mut ViolationCollector) {
    let pools = match raw.get("nodePools").and_then(Value::as_array) {
        Some(pools) => pools,
        None => return,
    };

    for (idx, pool) in pools.iter().enumerate() {
        let Some(pool) = pool.as_object() else {
            continue;
        };
        let label = pool_label(pool, idx);

        let dl_types = match pool.get("dlTypes") {
            None => continue,
            Some(Value::Array(items)) => items,
            Some(_) => {
                c.push(format!("{}: dlTypes must be an array", label));
                continue;
            }
        };

        let invalid: Vec<&Value> = dl_types
            .iter()
            .filter(|t| t.as_str().and_then(DlType::parse).is_none())
            .collect();
        if !invalid.is_empty() {
            let rendered = serde_json::to_string(&invalid).unwrap_or_default();
            c.push(format!("{}: invalid dlTypes: {}", label, rendered));
        }
    }

    c.set_hint(format!(
        "Allowed values:\n  - {}\n\nSee README.md → Node Pools for examples.",
        DlType::sorted_tags().join(", ")
    ));
}

fn pool_label(pool: &Map<String, Value>, idx: usize) -> String {
    match pool.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        Some(other) if !is_blank(Some(other)) => other.to_string(),
        _ => format!("nodePools[{}]", idx),
    }
}

/// Strings unquoted, everything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::{LogLevel, LOG_BROADCASTER};
    use crate::transform::transform;
    use serde_json::json;
    use tokio::sync::broadcast::error::TryRecvError;

    fn valid_doc() -> Value {
        json!({
            "organization": { "orgId": "8a4c9f1e-2b7d-4c3a-9e5f-0d1b2c3a4f5e", "env": "rc" },
            "cluster": {
                "endpoint": "https://34.12.0.8",
                "kubernetesVersion": "1.29",
                "name": "gke-main",
                "defaultNamespace": "dataloop",
                "provider": "gcp"
            },
            "authentication": { "token": "eyJhbGciOi", "ca": "LS0tLS1CRUdJTi" },
            "network": {},
            "nodePools": [
                { "name": "cpu-pool", "dlTypes": ["regular-s", "regular-m"] },
                { "name": "gpu-pool", "dlTypes": ["gpu-t4"] }
            ],
            "plugins": [{ "name": "monitoring" }, { "name": "scaler" }],
            "volumes": [{ "name": "data" }]
        })
    }

    fn run(doc: Value) -> ValidationResult<Vec<Warning>> {
        let raw = RawConfig::new(doc);
        let compute = transform(&raw).unwrap();
        validate(&raw, &compute)
    }

    #[test]
    fn test_valid_config_passes_without_warnings() {
        assert_eq!(run(valid_doc()).unwrap(), vec![]);
    }

    #[test]
    fn test_warnings_are_not_fatal() {
        let mut doc = valid_doc();
        doc["authentication"].as_object_mut().unwrap().remove("ca");
        doc.as_object_mut().unwrap().remove("volumes");
        assert_eq!(
            run(doc).unwrap(),
            vec![Warning::MissingCa, Warning::NoVolumes]
        );
    }

    #[test]
    fn test_warnings_are_logged() {
        let mut rx = LOG_BROADCASTER.subscribe();
        let mut doc = valid_doc();
        doc["authentication"]["ca"] = json!("");
        doc["volumes"] = json!([]);
        run(doc).unwrap();

        let mut logged = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(entry) if entry.level == LogLevel::Warning => logged.push(entry.message),
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        for warning in [Warning::MissingCa, Warning::NoVolumes] {
            let expected = format!("Warning: {}", warning);
            assert!(logged.contains(&expected), "missing {:?} in {:?}", expected, logged);
        }
    }

    #[test]
    fn test_placeholder_org_id_rejected() {
        let mut doc = valid_doc();
        doc["organization"]["orgId"] = json!("{{org-id}}");
        let err = run(doc).unwrap_err();
        assert_eq!(err.category, RuleCategory::Required);
        assert_eq!(err.violations, vec!["organization.orgId"]);
    }

    #[test]
    fn test_required_values_reported_together() {
        let mut doc = valid_doc();
        doc["authentication"]["token"] = json!("");
        doc["cluster"]["endpoint"] = json!("");
        doc.as_object_mut().unwrap().remove("organization");
        let err = run(doc).unwrap_err();
        assert_eq!(
            err.violations,
            vec!["authentication.token", "cluster.endpoint", "organization.orgId"]
        );
        assert!(err.to_string().contains("Please edit your config file"));
    }

    #[test]
    fn test_endpoint_scheme() {
        let mut doc = valid_doc();
        doc["cluster"]["endpoint"] = json!("ftp://host");
        let err = run(doc).unwrap_err();
        assert_eq!(err.category, RuleCategory::Endpoint);
        assert!(err.violations[0].contains("ftp://host"));

        for endpoint in ["https://host", "http://host"] {
            let mut doc = valid_doc();
            doc["cluster"]["endpoint"] = json!(endpoint);
            assert!(run(doc).is_ok(), "{} should pass", endpoint);
        }
    }

    #[test]
    fn test_metadata_must_be_object() {
        let mut doc = valid_doc();
        doc["metadata"] = json!(["ClusterIP"]);
        let err = run(doc).unwrap_err();
        assert_eq!(err.category, RuleCategory::Metadata);
        assert!(err.violations[0].contains("must be an object"));
    }

    #[test]
    fn test_metadata_null_is_ignored() {
        let mut doc = valid_doc();
        doc["metadata"] = Value::Null;
        assert!(run(doc).is_ok());
    }

    #[test]
    fn test_service_type_enum() {
        let mut doc = valid_doc();
        doc["metadata"] = json!({ "serveAgentServiceType": "NodePort" });
        let err = run(doc).unwrap_err();
        assert_eq!(err.category, RuleCategory::Metadata);
        assert!(err.violations[0].contains("NodePort"));
        assert!(err.violations[0].contains("ClusterIP, LoadBalancer"));

        for service_type in ["ClusterIP", "LoadBalancer"] {
            let mut doc = valid_doc();
            doc["metadata"] = json!({ "serveAgentServiceType": service_type });
            assert!(run(doc).is_ok());
        }

        let mut doc = valid_doc();
        doc["metadata"] = json!({ "team": "ml" });
        assert_eq!(run(doc).unwrap(), vec![]);
    }

    #[test]
    fn test_missing_mandatory_plugin() {
        let mut doc = valid_doc();
        doc["plugins"] = json!([{ "name": "monitoring" }]);
        let err = run(doc).unwrap_err();
        assert_eq!(err.category, RuleCategory::Plugins);
        assert_eq!(err.violations, vec!["plugins: scaler"]);
    }

    #[test]
    fn test_all_missing_plugins_reported() {
        let mut doc = valid_doc();
        doc.as_object_mut().unwrap().remove("plugins");
        let err = run(doc).unwrap_err();
        assert_eq!(err.violations, vec!["plugins: monitoring", "plugins: scaler"]);
    }

    #[test]
    fn test_invalid_dl_type() {
        let mut doc = valid_doc();
        doc["nodePools"] = json!([{ "name": "gpu-pool", "dlTypes": ["regular-s", "gpu-h100"] }]);
        let err = run(doc).unwrap_err();
        assert_eq!(err.category, RuleCategory::NodePools);
        assert_eq!(err.violations, vec![r#"gpu-pool: invalid dlTypes: ["gpu-h100"]"#]);
        assert!(err.to_string().contains("gpu-a100-4g, gpu-a100-4g-m"));

        let mut doc = valid_doc();
        doc["nodePools"] = json!([{ "name": "gpu-pool", "dlTypes": ["regular-s", "gpu-t4"] }]);
        assert!(run(doc).is_ok());
    }

    #[test]
    fn test_invalid_pools_accumulate_into_one_error() {
        let mut doc = valid_doc();
        doc["nodePools"] = json!([
            { "name": "pool-a", "dlTypes": ["gpu-h100"] },
            { "name": "pool-b", "dlTypes": ["regular-s", 7] }
        ]);
        let err = run(doc).unwrap_err();
        assert_eq!(err.violations.len(), 2);
        let msg = err.to_string();
        assert!(msg.contains("pool-a"));
        assert!(msg.contains("pool-b: invalid dlTypes: [7]"));
    }

    #[test]
    fn test_scalar_dl_types_and_unnamed_pool() {
        let mut doc = valid_doc();
        doc["nodePools"] = json!([
            { "name": "pool-a", "dlTypes": "regular-s" },
            { "dlTypes": ["tiny"] }
        ]);
        let err = run(doc).unwrap_err();
        assert_eq!(
            err.violations,
            vec![
                "pool-a: dlTypes must be an array".to_string(),
                r#"nodePools[1]: invalid dlTypes: ["tiny"]"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_unnamed_pool_and_null_ca_pass() {
        let mut doc = valid_doc();
        doc["authentication"]["ca"] = Value::Null;
        doc["nodePools"] = json!([{ "dlTypes": ["regular-s"] }, "spare"]);
        doc["plugins"] = json!(["legacy", { "name": "monitoring" }, { "name": "scaler" }]);
        assert_eq!(run(doc).unwrap(), vec![Warning::MissingCa]);
    }

    #[test]
    fn test_pass_through_values_are_not_type_checked() {
        let mut doc = valid_doc();
        doc["cluster"]["name"] = json!(42);
        doc["volumes"] = json!({ "data": "/mnt" });
        assert_eq!(run(doc).unwrap(), vec![]);
    }

    #[test]
    fn test_collector_finish() {
        let collector = ViolationCollector::new(RuleCategory::Plugins);
        assert!(collector.is_empty());
        assert!(collector.finish().is_ok());

        let mut collector = ViolationCollector::new(RuleCategory::Plugins);
        collector.push("plugins: scaler");
        collector.set_hint("add it");
        assert_eq!(collector.violations(), ["plugins: scaler".to_string()]);
        let err = collector.finish().unwrap_err();
        assert_eq!(err.hint.as_deref(), Some("add it"));
    }
}
