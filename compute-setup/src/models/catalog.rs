//! Closed value sets the validator checks against.
//!
//! Each catalog has exactly one definition here; everything else goes through
//! [`DlType::parse`], [`ServeAgentServiceType::parse`] or [`MandatoryPlugin::ALL`].

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Node pool instance types
// =============================================================================

/// Instance-type tag a node pool may advertise in `dlTypes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DlType {
    #[serde(rename = "regular-xs")]
    RegularXs,
    #[serde(rename = "regular-s")]
    RegularS,
    #[serde(rename = "regular-m")]
    RegularM,
    #[serde(rename = "regular-l")]
    RegularL,
    #[serde(rename = "highmem-xs")]
    HighmemXs,
    #[serde(rename = "highmem-s")]
    HighmemS,
    #[serde(rename = "highmem-m")]
    HighmemM,
    #[serde(rename = "highmem-l")]
    HighmemL,
    #[serde(rename = "gpu-t4")]
    GpuT4,
    #[serde(rename = "gpu-t4-m")]
    GpuT4M,
    #[serde(rename = "gpu-a100-s")]
    GpuA100S,
    #[serde(rename = "gpu-a100-4g")]
    GpuA100_4g,
    #[serde(rename = "gpu-a100-4g-m")]
    GpuA100_4gM,
}

impl DlType {
    pub const ALL: [DlType; 13] = [
        DlType::RegularXs,
        DlType::RegularS,
        DlType::RegularM,
        DlType::RegularL,
        DlType::HighmemXs,
        DlType::HighmemS,
        DlType::HighmemM,
        DlType::HighmemL,
        DlType::GpuT4,
        DlType::GpuT4M,
        DlType::GpuA100S,
        DlType::GpuA100_4g,
        DlType::GpuA100_4gM,
    ];

    /// Tag as written in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            DlType::RegularXs => "regular-xs",
            DlType::RegularS => "regular-s",
            DlType::RegularM => "regular-m",
            DlType::RegularL => "regular-l",
            DlType::HighmemXs => "highmem-xs",
            DlType::HighmemS => "highmem-s",
            DlType::HighmemM => "highmem-m",
            DlType::HighmemL => "highmem-l",
            DlType::GpuT4 => "gpu-t4",
            DlType::GpuT4M => "gpu-t4-m",
            DlType::GpuA100S => "gpu-a100-s",
            DlType::GpuA100_4g => "gpu-a100-4g",
            DlType::GpuA100_4gM => "gpu-a100-4g-m",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// All tags in alphabetical order, for error messages.
    pub fn sorted_tags() -> Vec<&'static str> {
        let mut tags: Vec<_> = Self::ALL.iter().map(DlType::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl fmt::Display for DlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Serve agent service type
// =============================================================================

/// Kubernetes service type used to expose the serve agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServeAgentServiceType {
    ClusterIP,
    LoadBalancer,
}

impl ServeAgentServiceType {
    pub const ALL: [ServeAgentServiceType; 2] =
        [ServeAgentServiceType::ClusterIP, ServeAgentServiceType::LoadBalancer];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServeAgentServiceType::ClusterIP => "ClusterIP",
            ServeAgentServiceType::LoadBalancer => "LoadBalancer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for ServeAgentServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Mandatory plugins
// =============================================================================

/// Plugins every compute configuration must declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MandatoryPlugin {
    Monitoring,
    Scaler,
}

impl MandatoryPlugin {
    pub const ALL: [MandatoryPlugin; 2] = [MandatoryPlugin::Monitoring, MandatoryPlugin::Scaler];

    pub fn name(&self) -> &'static str {
        match self {
            MandatoryPlugin::Monitoring => "monitoring",
            MandatoryPlugin::Scaler => "scaler",
        }
    }
}

impl fmt::Display for MandatoryPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Placeholder organization ids
// =============================================================================

/// Values shipped in the config templates that must be replaced before use.
pub const ORG_ID_PLACEHOLDERS: [&str; 3] = [
    "{{org-id}}",
    "<REPLACE: Your Dataloop Organization ID>",
    "YOUR_ORG_ID_HERE",
];

pub fn is_placeholder_org_id(org_id: &str) -> bool {
    ORG_ID_PLACEHOLDERS.contains(&org_id)
}
