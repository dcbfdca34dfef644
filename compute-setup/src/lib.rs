//! # compute-setup - Kubernetes cluster to Dataloop compute configuration
//!
//! Turns a human-authored JSON description of a Kubernetes cluster into the
//! provider-shaped compute configuration, validates it, writes it as a Base64
//! artifact and registers it with the platform.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ config.json │────▶│  Transform  │────▶│  Validate   │────▶│   Encode    │────▶│  Provision  │
//! │ (RawConfig) │     │ (+defaults) │     │ (per group) │     │  (Base64)   │     │  (gateway)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use compute_setup::{run_pipeline, PipelineOptions};
//!
//! let run = run_pipeline(Path::new("config.json"), &PipelineOptions::default())?;
//! println!("{} warnings", run.warnings.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`models`] - Raw input, provider document, catalogs
//! - [`parser`] - Config file loading
//! - [`transform`] - Builder and pipeline
//! - [`validation`] - Rule groups and the provider layout schema
//! - [`encode`] - Base64 artifact
//! - [`provision`] - Provisioning service client
//! - [`discovery`] - Config file discovery
//! - [`logs`] - Leveled progress output

// Core modules
pub mod error;
pub mod models;

// Input
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Output
pub mod encode;

// Provisioning
pub mod provision;

// Discovery
pub mod discovery;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    EncodeError, LoadError, PipelineError, ProvisionError, RuleCategory, StructuralError,
    ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ComputeConfig, ConfigSummary, DlType, MandatoryPlugin, RawConfig, ServeAgentServiceType,
    DEFAULT_ENVIRONMENT, DEFAULT_OUTPUT_FILE,
};

// =============================================================================
// Re-exports - Pipeline stages
// =============================================================================

pub use parser::{load_config, parse_config};

pub use transform::{build_from_value, run_pipeline, transform, PipelineOptions, PipelineRun};

pub use validation::{validate, ViolationCollector, Warning};

pub use encode::{decode, decode_file, encode, encode_to_string, EncodedArtifact};

// =============================================================================
// Re-exports - Provisioning & discovery
// =============================================================================

pub use provision::{provision, provision_with, Compute, ComputeApi, Environment, GatewayClient};

pub use discovery::{discover_configs, list_configs, summarize, DiscoveredConfig};
