//! Base64 artifact encoding.
//!
//! The compute configuration is serialized as pretty-printed JSON (two-space
//! indentation) and the UTF-8 bytes are encoded with the standard padded
//! Base64 alphabet. The encoded text is the whole content of the artifact.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EncodeError, EncodeResult};
use crate::models::ComputeConfig;
use crate::validation::validate_compute_config;

/// Result of writing an artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedArtifact {
    /// Base64 text written to `path`
    pub text: String,
    pub path: PathBuf,
}

impl EncodedArtifact {
    /// Length of the encoded text in characters.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Serialize and Base64-encode without touching the filesystem.
pub fn encode_to_string(compute: &ComputeConfig) -> EncodeResult<String> {
    let json = serde_json::to_string_pretty(compute).map_err(EncodeError::Serialize)?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Encode `compute` and write it to `destination`, replacing any existing file.
pub fn encode(compute: &ComputeConfig, destination: &Path) -> EncodeResult<EncodedArtifact> {
    let text = encode_to_string(compute)?;

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| EncodeError::Write {
            path: destination.to_path_buf(),
            source,
        })?;
    }
    fs::write(destination, &text).map_err(|source| EncodeError::Write {
        path: destination.to_path_buf(),
        source,
    })?;

    Ok(EncodedArtifact {
        text,
        path: destination.to_path_buf(),
    })
}

/// Decode artifact text back into JSON text.
pub fn decode_to_json(text: &str) -> EncodeResult<String> {
    let bytes = STANDARD.decode(text.trim())?;
    Ok(String::from_utf8(bytes)?)
}

/// Decode artifact text back into the compute configuration.
///
/// The decoded JSON must have the compute config layout; every missing
/// section is reported in one [`EncodeError::Layout`].
pub fn decode(text: &str) -> EncodeResult<ComputeConfig> {
    let json = decode_to_json(text)?;
    let value: serde_json::Value = serde_json::from_str(&json).map_err(EncodeError::Deserialize)?;
    validate_compute_config(&value).map_err(EncodeError::Layout)?;
    serde_json::from_value(value).map_err(EncodeError::Deserialize)
}

/// Read and decode an artifact file.
pub fn decode_file(path: &Path) -> EncodeResult<ComputeConfig> {
    let text = fs::read_to_string(path).map_err(|source| EncodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawConfig;
    use crate::transform::transform;
    use serde_json::json;

    fn compute() -> ComputeConfig {
        transform(&RawConfig::new(json!({
            "organization": { "orgId": "org-1" },
            "cluster": {
                "endpoint": "https://10.0.0.1",
                "kubernetesVersion": "1.29",
                "name": "eks-prod",
                "defaultNamespace": "dataloop",
                "provider": "aws"
            },
            "authentication": { "token": "secret", "ca": "Y2VydA==" },
            "network": { "environmentVariables": [{ "name": "NO_PROXY", "value": "10.0.0.0/8" }] },
            "nodePools": [{ "name": "cpu", "dlTypes": ["regular-s"], "tolerations": [] }],
            "plugins": [{ "name": "monitoring", "config": { "retention": 7.5 } }, { "name": "scaler" }],
            "metadata": { "serveAgentServiceType": "ClusterIP" }
        })))
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let original = compute();
        let text = encode_to_string(&original).unwrap();
        assert_eq!(decode(&text).unwrap(), original);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let cfg = compute();
        assert_eq!(encode_to_string(&cfg).unwrap(), encode_to_string(&cfg).unwrap());
    }

    #[test]
    fn test_alphabet_is_transport_safe() {
        let text = encode_to_string(&compute()).unwrap();
        assert!(text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='));
    }

    #[test]
    fn test_decoded_json_is_pretty_with_provider_layout() {
        let json = decode_to_json(&encode_to_string(&compute()).unwrap()).unwrap();
        assert!(json.starts_with("{\n  \"authentication\": {\n    \"ca\""));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["config"]["settings"]["defaultNamespace"], "dataloop");
        assert_eq!(
            value["config"]["deploymentConfiguration"]["registry"]["domain"],
            "hub.dataloop.ai"
        );
    }

    #[test]
    fn test_encode_writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("base64_config.txt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale content that is longer than nothing").unwrap();

        let artifact = encode(&compute(), &path).unwrap();
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, artifact.text);
        assert_eq!(artifact.len(), on_disk.len());
        assert_eq!(decode_file(&path).unwrap(), compute());
    }

    #[test]
    fn test_encode_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("artifact.txt");
        let artifact = encode(&compute(), &path).unwrap();
        assert!(path.exists());
        assert!(!artifact.is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode("not base64!"), Err(EncodeError::Base64(_))));
        let not_json = STANDARD.encode(b"plain text");
        assert!(matches!(decode(&not_json), Err(EncodeError::Deserialize(_))));
    }

    #[test]
    fn test_decode_reports_missing_sections() {
        let not_config = STANDARD.encode(b"{\"hello\": 1}");
        match decode(&not_config) {
            Err(EncodeError::Layout(errors)) => {
                assert_eq!(errors.len(), 2);
                let err = EncodeError::Layout(errors);
                assert!(err.to_string().contains("authentication"));
                assert!(err.to_string().contains("config"));
            }
            other => panic!("expected layout error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_keeps_unusual_pass_through_values() {
        let cfg = transform(&RawConfig::new(json!({
            "cluster": {
                "endpoint": "https://10.0.0.1",
                "kubernetesVersion": 1.29,
                "name": "edge",
                "defaultNamespace": "dataloop",
                "provider": "onprem"
            },
            "authentication": { "token": "secret", "ca": null },
            "nodePools": [{ "dlTypes": ["regular-s"] }],
            "plugins": ["legacy", { "name": "scaler" }]
        })))
        .unwrap();
        assert_eq!(decode(&encode_to_string(&cfg).unwrap()).unwrap(), cfg);
    }
}
