//! Config discovery - find configuration files in a project directory
//!
//! Looks for `config.json` at the root and `configs/config-*.json`
//! (templates excluded), and reads a short summary from each.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use crate::parser::load_config;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Directory holding per-environment configuration files
pub const CONFIGS_DIR: &str = "configs";

static CONFIG_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^config-.+\.json$").expect("static regex"));

/// What a discovered file describes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredConfig {
    pub path: PathBuf,
    /// `None` if the file could not be read or parsed
    pub summary: Option<ConfigOverview>,
}

/// Display fields of a config file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigOverview {
    pub cluster: String,
    pub namespace: String,
    pub environment: String,
}

/// Whether a file name looks like a per-environment config (not a template)
pub fn is_config_file_name(name: &str) -> bool {
    CONFIG_FILE_PATTERN.is_match(name) && !name.contains("template")
}

/// Configuration files under `root`, default file first, then sorted by name
pub fn discover_configs(root: &Path) -> Vec<PathBuf> {
    let mut configs = Vec::new();

    let default = root.join(DEFAULT_CONFIG_FILE);
    if default.is_file() {
        configs.push(default);
    }

    let entries = match fs::read_dir(root.join(CONFIGS_DIR)) {
        Ok(e) => e,
        Err(_) => return configs,
    };

    let mut found: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_config_file_name)
        })
        .collect();
    found.sort();

    configs.extend(found);
    configs
}

/// Read the overview of a config file; `None` if it is unreadable or not JSON
pub fn summarize(path: &Path) -> Option<ConfigOverview> {
    let raw = load_config(path).ok()?;
    if !raw.as_value().is_object() {
        return None;
    }
    let summary = raw.summary();
    Some(ConfigOverview {
        cluster: summary.cluster,
        namespace: summary.namespace,
        environment: raw
            .lookup(&["organization", "env"])
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string(),
    })
}

/// Discover and summarize every config file under `root`
pub fn list_configs(root: &Path) -> Vec<DiscoveredConfig> {
    discover_configs(root)
        .into_iter()
        .map(|path| {
            let summary = summarize(&path);
            DiscoveredConfig { path, summary }
        })
        .collect()
}

/// Human-readable listing of discovered configs, usage footer included.
pub fn render_listing(root: &Path, configs: &[DiscoveredConfig]) -> String {
    let rule = "=".repeat(50);
    let mut out = String::new();
    let _ = writeln!(out, "\n📁 Available Configuration Files:");
    let _ = writeln!(out, "{}", rule);

    if configs.is_empty() {
        let _ = writeln!(out, "  No config files found.");
        let _ = writeln!(out, "\n  Create a config file in: {}/", root.join(CONFIGS_DIR).display());
        let _ = writeln!(out, "  Or copy the template: configs/config-template.json");
        return out;
    }

    for config in configs {
        let shown = config.path.strip_prefix(root).unwrap_or(&config.path);
        match config.summary {
            Some(ref s) => {
                let _ = writeln!(out, "\n  📄 {}", shown.display());
                let _ = writeln!(out, "     Cluster: {}", s.cluster);
                let _ = writeln!(out, "     Namespace: {}", s.namespace);
                let _ = writeln!(out, "     Environment: {}", s.environment);
            }
            None => {
                let _ = writeln!(out, "\n  📄 {} (invalid or incomplete)", shown.display());
            }
        }
    }

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "\nUsage:");
    let _ = writeln!(out, "  compute-setup setup --config <config-file>");
    if let Some(first) = configs.first() {
        let shown = first.path.strip_prefix(root).unwrap_or(&first.path);
        let _ = writeln!(out, "\nExample:");
        let _ = writeln!(out, "  compute-setup setup --config {}", shown.display());
    }
    out
}
