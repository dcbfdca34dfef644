//! Configuration file loading.
//!
//! Reads a JSON document from disk into a [`RawConfig`]. Nothing here knows
//! about clusters; shape and content checks belong to the transformer and
//! the validator.

use std::fs;
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::RawConfig;

/// Read and parse a configuration file.
///
/// # Errors
/// [`LoadError::Io`] if the file cannot be read, [`LoadError::Json`] with the
/// parse position if it is not valid JSON.
pub fn load_config(path: &Path) -> LoadResult<RawConfig> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, path)
}

/// Parse configuration text. `origin` is only used in error messages.
pub fn parse_config(content: &str, origin: &Path) -> LoadResult<RawConfig> {
    serde_json::from_str(content)
        .map(RawConfig::new)
        .map_err(|e| LoadError::Json {
            path: origin.to_path_buf(),
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })
}
