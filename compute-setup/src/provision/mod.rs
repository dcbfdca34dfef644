//! Provisioning service client.
//!
//! Registers an encoded compute configuration with the platform and makes the
//! resulting compute the organization's default service driver.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use compute_setup::provision::{provision, Environment, GatewayClient};
//!
//! let env = Environment::parse("rc")?;
//! let client = GatewayClient::from_env(env)?;
//! let compute = provision(&client, Path::new("base64_config.txt"), "my-org-id").await?;
//! println!("created {}", compute.name);
//! ```
//!
//! The environment is always passed in explicitly; nothing here reads or
//! mutates process-wide selection state.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use std::path::Path;

use crate::error::{ProvisionError, ProvisionResult};
use crate::logs::{log_info, log_success};

/// Variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "DATALOOP_API_TOKEN";

/// Optional variable overriding the gateway URL of every environment.
pub const GATEWAY_ENV_VAR: &str = "DATALOOP_GATEWAY_URL";

// =============================================================================
// Environment
// =============================================================================

/// Deployment environment the provisioning calls are scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    name: String,
    gateway: String,
}

impl Environment {
    /// Resolve an environment name (`prod`, `rc`, `dev`) or a gateway URL.
    pub fn parse(name: &str) -> ProvisionResult<Self> {
        let gateway = match name {
            "prod" => "https://gate.dataloop.ai/api/v1".to_string(),
            "rc" => "https://rc-gate.dataloop.ai/api/v1".to_string(),
            "dev" => "https://dev-gate.dataloop.ai/api/v1".to_string(),
            url if url.starts_with("https://") || url.starts_with("http://") => {
                url.trim_end_matches('/').to_string()
            }
            other => return Err(ProvisionError::UnknownEnvironment(other.to_string())),
        };
        Ok(Self {
            name: name.to_string(),
            gateway,
        })
    }

    /// Same environment name, different gateway.
    pub fn with_gateway(mut self, gateway: &str) -> Self {
        self.gateway = gateway.trim_end_matches('/').to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gateway(&self) -> &str {
        &self.gateway
    }
}

// =============================================================================
// Service contract
// =============================================================================

/// A compute registered with the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compute {
    #[serde(default)]
    pub id: String,
    /// Identifier used when referencing the compute as a service driver
    pub name: String,
}

/// Operations the setup flow needs from the provisioning service.
#[async_trait::async_trait]
pub trait ComputeApi: Send + Sync {
    /// Create a compute from an encoded configuration file.
    async fn create_from_config_file(
        &self,
        config_file: &Path,
        org_id: &str,
    ) -> ProvisionResult<Compute>;

    /// Make a compute the organization's default service driver.
    ///
    /// With `update_existing_services` false, running services keep their
    /// current driver.
    async fn set_default_driver(
        &self,
        driver_id: &str,
        org_id: &str,
        update_existing_services: bool,
    ) -> ProvisionResult<()>;
}

/// Create the compute, then set it as default driver without migrating
/// existing services.
pub async fn provision(
    api: &dyn ComputeApi,
    config_file: &Path,
    org_id: &str,
) -> ProvisionResult<Compute> {
    provision_with(api, config_file, org_id, false).await
}

/// [`provision`] with explicit control over migrating existing services.
pub async fn provision_with(
    api: &dyn ComputeApi,
    config_file: &Path,
    org_id: &str,
    update_existing_services: bool,
) -> ProvisionResult<Compute> {
    log_info("⏳ Creating compute...");
    let compute = api.create_from_config_file(config_file, org_id).await?;
    log_success(format!("Compute created: {}", compute.name));

    log_info("⏳ Setting compute as default driver...");
    api.set_default_driver(&compute.name, org_id, update_existing_services)
        .await?;
    log_success("Compute has been set as default driver");

    Ok(compute)
}

// =============================================================================
// HTTP client
// =============================================================================

/// Error body returned by the gateway.
#[derive(Debug, Deserialize)]
struct GatewayError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP implementation of [`ComputeApi`] against the platform gateway.
#[derive(Clone)]
pub struct GatewayClient {
    environment: Environment,
    token: String,
    http: reqwest::Client,
}

impl GatewayClient {
    /// Create a client with an explicit API token
    pub fn new(environment: Environment, token: String) -> Self {
        Self {
            environment,
            token,
            http: reqwest::Client::new(),
        }
    }

    /// Create a client from `DATALOOP_API_TOKEN` (and `DATALOOP_GATEWAY_URL` if set)
    pub fn from_env(environment: Environment) -> ProvisionResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        let token = env::var(TOKEN_ENV_VAR)
            .map_err(|_| ProvisionError::MissingToken(format!("{} not set", TOKEN_ENV_VAR)))?;

        let environment = match env::var(GATEWAY_ENV_VAR) {
            Ok(gateway) if !gateway.is_empty() => environment.with_gateway(&gateway),
            _ => environment,
        };

        Ok(Self::new(environment, token))
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Gateway URL with `segments` appended, each one percent-encoded
    fn url(&self, segments: &[&str]) -> ProvisionResult<reqwest::Url> {
        let gateway = self.environment.gateway();
        let invalid =
            |reason: String| ProvisionError::InvalidGateway(format!("{}: {}", gateway, reason));

        let mut url = reqwest::Url::parse(gateway).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// POST a JSON body and return the response text
    async fn post(&self, segments: &[&str], body: serde_json::Value) -> ProvisionResult<String> {
        let url = self.url(segments)?;
        log_info(format!("📡 POST {}", url));

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProvisionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProvisionError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(ProvisionError::Api(error_message(status.as_u16(), &text)));
        }

        Ok(text)
    }
}

#[async_trait::async_trait]
impl ComputeApi for GatewayClient {
    async fn create_from_config_file(
        &self,
        config_file: &Path,
        org_id: &str,
    ) -> ProvisionResult<Compute> {
        let encoded = tokio::fs::read_to_string(config_file)
            .await
            .map_err(|source| ProvisionError::Artifact {
                path: config_file.to_path_buf(),
                source,
            })?;

        let body = json!({
            "orgId": org_id,
            "config": encoded.trim(),
        });
        let text = self.post(&["compute", "fromConfig"], body).await?;
        parse_compute(&text)
    }

    async fn set_default_driver(
        &self,
        driver_id: &str,
        org_id: &str,
        update_existing_services: bool,
    ) -> ProvisionResult<()> {
        let body = json!({
            "orgId": org_id,
            "updateExistingServices": update_existing_services,
        });
        self.post(&["serviceDrivers", driver_id, "default"], body)
            .await?;
        Ok(())
    }
}

/// Readable message from a failed response
fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<GatewayError>(body) {
        Ok(GatewayError {
            message: Some(message),
            ..
        })
        | Ok(GatewayError {
            error: Some(message),
            ..
        }) => format!("HTTP {}: {}", status, message),
        _ => format!("HTTP {}: {}", status, body),
    }
}

fn parse_compute(body: &str) -> ProvisionResult<Compute> {
    let compute: Compute = serde_json::from_str(body).map_err(|e| {
        let excerpt: String = body.chars().take(500).collect();
        ProvisionError::InvalidResponse(format!("{}. Response was: {}", e, excerpt))
    })?;
    if compute.name.is_empty() {
        return Err(ProvisionError::InvalidResponse(
            "compute has no name".to_string(),
        ));
    }
    Ok(compute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records calls instead of talking to a gateway.
    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<String>>,
        fail_create: bool,
    }

    #[async_trait::async_trait]
    impl ComputeApi for FakeApi {
        async fn create_from_config_file(
            &self,
            config_file: &Path,
            org_id: &str,
        ) -> ProvisionResult<Compute> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("create {} {}", config_file.display(), org_id));
            if self.fail_create {
                return Err(ProvisionError::Api("HTTP 409: compute exists".into()));
            }
            Ok(Compute {
                id: "c-1".into(),
                name: "gke-main-compute".into(),
            })
        }

        async fn set_default_driver(
            &self,
            driver_id: &str,
            org_id: &str,
            update_existing_services: bool,
        ) -> ProvisionResult<()> {
            self.calls.lock().unwrap().push(format!(
                "default {} {} {}",
                driver_id, org_id, update_existing_services
            ));
            Ok(())
        }
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(
            Environment::parse("rc").unwrap().gateway(),
            "https://rc-gate.dataloop.ai/api/v1"
        );
        assert_eq!(
            Environment::parse("prod").unwrap().gateway(),
            "https://gate.dataloop.ai/api/v1"
        );
        let custom = Environment::parse("http://localhost:8080/api/v1/").unwrap();
        assert_eq!(custom.gateway(), "http://localhost:8080/api/v1");
        assert!(matches!(
            Environment::parse("staging"),
            Err(ProvisionError::UnknownEnvironment(_))
        ));
    }

    #[test]
    fn test_client_urls() {
        let env = Environment::parse("dev").unwrap().with_gateway("http://gw.local/");
        let client = GatewayClient::new(env, "token".into());
        assert_eq!(client.environment().name(), "dev");
        assert_eq!(
            client.url(&["serviceDrivers", "x", "default"]).unwrap().as_str(),
            "http://gw.local/serviceDrivers/x/default"
        );

        let prod = GatewayClient::new(Environment::parse("prod").unwrap(), "token".into());
        assert_eq!(
            prod.url(&["compute", "fromConfig"]).unwrap().as_str(),
            "https://gate.dataloop.ai/api/v1/compute/fromConfig"
        );
    }

    #[test]
    fn test_driver_id_is_a_single_path_segment() {
        let client = GatewayClient::new(Environment::parse("rc").unwrap(), "token".into());
        let url = client
            .url(&["serviceDrivers", "team/gpu?pool=a#main", "default"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://rc-gate.dataloop.ai/api/v1/serviceDrivers/team%2Fgpu%3Fpool=a%23main/default"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_unusable_gateway() {
        let env = Environment::parse("dev").unwrap().with_gateway("not a url");
        let client = GatewayClient::new(env, "token".into());
        assert!(matches!(
            client.url(&["compute"]),
            Err(ProvisionError::InvalidGateway(_))
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(400, r#"{"message": "invalid config"}"#),
            "HTTP 400: invalid config"
        );
        assert_eq!(
            error_message(403, r#"{"error": "forbidden"}"#),
            "HTTP 403: forbidden"
        );
        assert_eq!(error_message(502, "Bad Gateway"), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_parse_compute() {
        let compute = parse_compute(r#"{"id": "abc", "name": "my-compute", "status": "ready"}"#)
            .unwrap();
        assert_eq!(compute.name, "my-compute");
        assert!(parse_compute(r#"{"id": "abc"}"#).is_err());
        assert!(parse_compute(r#"{"id": "abc", "name": ""}"#).is_err());
    }

    #[tokio::test]
    async fn test_provision_creates_then_sets_default() {
        let api = FakeApi::default();
        let path = PathBuf::from("base64_config.txt");

        let compute = provision(&api, &path, "org-1").await.unwrap();

        assert_eq!(compute.name, "gke-main-compute");
        let calls = api.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                "create base64_config.txt org-1".to_string(),
                "default gke-main-compute org-1 false".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_create_skips_default_driver() {
        let api = FakeApi {
            fail_create: true,
            ..Default::default()
        };
        let err = provision_with(&api, Path::new("a.txt"), "org-1", true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("compute exists"));
        assert_eq!(api.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_artifact_is_reported_before_any_request() {
        let client = GatewayClient::new(Environment::parse("rc").unwrap(), "t".into());
        let err = client
            .create_from_config_file(Path::new("/no/such/artifact.txt"), "org-1")
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Artifact { .. }));
    }
}
