//! JSON Schema of the provider document layout.
//!
//! The schema is embedded at compile time from
//! `schemas/compute-config.json` and evaluated with Draft 7 semantics. It
//! only fixes the sections and keys [`crate::transform::transform`] always
//! emits; pass-through values are left unconstrained. Decoding uses it to
//! reject artifacts that were not produced by this tool.

use serde_json::Value;

/// Provider schema for [`crate::models::ComputeConfig`].
pub const COMPUTE_CONFIG_SCHEMA: &str = include_str!("../../schemas/compute-config.json");

/// Validate a JSON value against a JSON Schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every schema error otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick yes/no variant of [`validate`].
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

fn compute_config_schema() -> Result<Value, Vec<String>> {
    serde_json::from_str(COMPUTE_CONFIG_SCHEMA)
        .map_err(|e| vec![format!("Embedded compute config schema is not valid JSON: {}", e)])
}

/// Validate a serialized compute configuration against the provider schema.
pub fn validate_compute_config(data: &Value) -> Result<(), Vec<String>> {
    let schema = compute_config_schema()?;
    validate(&schema, data)
}

/// Quick check against the provider schema.
pub fn is_valid_compute_config(data: &Value) -> bool {
    compute_config_schema().is_ok_and(|schema| is_valid(&schema, data))
}
