//! Error types for the compute configuration pipeline.
//!
//! Each stage owns one error type:
//!
//! - [`LoadError`] - reading and parsing the input document
//! - [`StructuralError`] - required keys missing or sections of the wrong shape
//! - [`ValidationError`] - semantic rule violations, accumulated per rule group
//! - [`EncodeError`] - serializing, writing and decoding the artifact
//! - [`ProvisionError`] - provisioning service failures
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while reading the input configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File missing or unreadable.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON.
    #[error("Invalid JSON in config file {} (line {line}, column {column}): {message}", .path.display())]
    Json {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
}

impl LoadError {
    /// Whether the file itself could not be found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

// =============================================================================
// Structural Errors
// =============================================================================

/// The input document is missing a required key or a section has the wrong shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    /// Required key absent.
    #[error("Missing required key: {path}")]
    MissingKey { path: String },

    /// Section present but not of the expected JSON type.
    #[error("'{path}' must be {expected}")]
    WrongShape { path: String, expected: &'static str },
}

impl StructuralError {
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingKey { path: path.into() }
    }

    pub fn wrong_shape(path: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongShape {
            path: path.into(),
            expected,
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Rule group a validation failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    /// Token, endpoint and organization id presence.
    Required,
    /// Endpoint URL scheme.
    Endpoint,
    /// Metadata shape and enumerated values.
    Metadata,
    /// Mandatory plugin coverage.
    Plugins,
    /// Node pool instance types.
    NodePools,
}

impl RuleCategory {
    /// Headline printed above the violation list.
    pub fn headline(&self) -> &'static str {
        match self {
            RuleCategory::Required => "Missing required values in config file",
            RuleCategory::Endpoint => "Invalid cluster endpoint",
            RuleCategory::Metadata => "Invalid metadata",
            RuleCategory::Plugins => "Missing mandatory plugins in config file",
            RuleCategory::NodePools => "Invalid nodePools.dlTypes values",
        }
    }
}

/// Configuration is invalid. Carries every violation found in the failing rule group.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ValidationError {
    pub category: RuleCategory,
    pub violations: Vec<String>,
    /// Extra guidance appended after the violation list.
    pub hint: Option<String>,
}

impl ValidationError {
    pub fn new(category: RuleCategory, violations: Vec<String>) -> Self {
        Self {
            category,
            violations,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:\n  - {}",
            self.category.headline(),
            self.violations.join("\n  - ")
        )?;
        if let Some(ref hint) = self.hint {
            write!(f, "\n\n{}", hint)?;
        }
        Ok(())
    }
}

// =============================================================================
// Encoding Errors
// =============================================================================

/// Errors while producing or reading back the encoded artifact.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Serialization failed.
    #[error("Failed to serialize compute config: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Could not write the artifact.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read an artifact back.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact text is not valid Base64.
    #[error("Artifact is not valid Base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes are not valid UTF-8.
    #[error("Decoded artifact is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Decoded text is not JSON, or not a compute config.
    #[error("Decoded artifact is not a compute config: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// Decoded JSON lacks the compute config layout.
    #[error("Decoded artifact is not a compute config:\n  - {}", .0.join("\n  - "))]
    Layout(Vec<String>),
}

// =============================================================================
// Provisioning Errors
// =============================================================================

/// Errors from the provisioning service.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Missing API token.
    #[error("Missing API token: {0}")]
    MissingToken(String),

    /// Environment name is not known.
    #[error("Unknown environment '{0}' (expected prod, rc, dev or a gateway URL)")]
    UnknownEnvironment(String),

    /// Gateway URL cannot be used as a request base.
    #[error("Invalid gateway URL {0}")]
    InvalidGateway(String),

    /// Could not read the artifact to submit.
    #[error("Failed to read artifact {}: {source}", .path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// Service returned an error.
    #[error("API error: {0}")]
    Api(String),

    /// Response could not be parsed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::run_pipeline`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Input structure is broken.
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    /// Input failed validation.
    #[error("Configuration error: {0}")]
    Validation(#[from] ValidationError),

    /// Artifact could not be produced.
    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// Provisioning failed.
    #[error("Provisioning error: {0}")]
    Provision(#[from] ProvisionError),
}

impl PipelineError {
    /// Whether the error comes from the configuration content rather than I/O or the service.
    pub fn is_config_error(&self) -> bool {
        matches!(self, PipelineError::Structural(_) | PipelineError::Validation(_))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for transformation.
pub type TransformResult<T> = Result<T, StructuralError>;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for encoding.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Result type for provisioning.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
