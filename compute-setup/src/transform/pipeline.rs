//! High-level pipeline API.
//!
//! Combines every stage: load, transform, validate and encode.
//!
//! # Example
//!
//! ```rust,ignore
//! use compute_setup::{run_pipeline, PipelineOptions};
//! use std::path::Path;
//!
//! let run = run_pipeline(Path::new("configs/config-prod.json"), &PipelineOptions::default())?;
//! if let Some(artifact) = &run.artifact {
//!     println!("wrote {} ({} chars)", artifact.path.display(), artifact.len());
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::builder::transform;
use crate::encode::{encode, EncodedArtifact};
use crate::error::PipelineResult;
use crate::logs::{log_info, log_info_indent, log_success};
use crate::models::{ComputeConfig, ConfigSummary, RawConfig};
use crate::parser::load_config;
use crate::validation::{validate, Warning};

/// Options for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Write the artifact here instead of `output.base64ConfigFile`
    pub output_override: Option<PathBuf>,

    /// Stop after validation when false
    pub write_artifact: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            output_override: None,
            write_artifact: true,
        }
    }
}

/// Everything a successful run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub summary: ConfigSummary,

    /// Provider document that was (or would be) encoded
    pub compute: ComputeConfig,

    /// Non-fatal validation findings
    #[serde(skip)]
    pub warnings: Vec<Warning>,

    /// Written artifact, `None` when `write_artifact` was false
    pub artifact: Option<EncodedArtifact>,
}

impl PipelineRun {
    pub fn org_id(&self) -> &str {
        &self.summary.org_id
    }

    pub fn environment(&self) -> &str {
        &self.summary.environment
    }
}

/// Run the pipeline over a configuration file.
///
/// 1. Loads the JSON document
/// 2. Builds the provider document
/// 3. Validates input and output together
/// 4. Encodes and writes the artifact
///
/// No artifact is written unless every earlier step succeeded.
pub fn run_pipeline(path: &Path, options: &PipelineOptions) -> PipelineResult<PipelineRun> {
    log_info(format!("📂 Loading configuration from: {}", path.display()));
    let raw = load_config(path)?;
    build_from_value(&raw, options)
}

/// Run the pipeline over an already-loaded document.
pub fn build_from_value(raw: &RawConfig, options: &PipelineOptions) -> PipelineResult<PipelineRun> {
    let summary = raw.summary();
    print_summary(&summary);

    log_info("📋 Building configuration...");
    let compute = transform(raw)?;

    log_info("🔍 Validating configuration...");
    let warnings = validate(raw, &compute)?;
    log_success("Configuration is valid");

    let artifact = if options.write_artifact {
        let destination = options
            .output_override
            .clone()
            .unwrap_or_else(|| PathBuf::from(raw.output_file()));
        log_info(format!("💾 Encoding configuration to {}...", destination.display()));
        let artifact = encode(&compute, &destination)?;
        log_success(format!("Base64 config saved (length={} chars)", artifact.len()));
        Some(artifact)
    } else {
        None
    };

    Ok(PipelineRun {
        summary,
        compute,
        warnings,
        artifact,
    })
}

fn print_summary(summary: &ConfigSummary) {
    log_info("📋 Configuration Summary");
    log_info_indent(format!("Cluster:     {}", summary.cluster), 1);
    log_info_indent(format!("Namespace:   {}", summary.namespace), 1);
    log_info_indent(format!("Provider:    {}", summary.provider), 1);
    log_info_indent(format!("Environment: {}", summary.environment), 1);
}
