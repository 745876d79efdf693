use crate::config::Config;
use crate::error::Result;
use crate::parser::DEFAULT_REGISTRY;
use crate::upstream::RegistryApi;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Client for the module registry protocol.
pub struct RegistryClient {
    client: Client,
    /// Base URL used for the default registry hostname
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RegistryModule {
    #[serde(default)]
    version: String,
}

impl RegistryClient {
    /// Create a registry client from configuration.
    #[must_use]
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.registry.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Sources naming their own registry host are queried there directly.
    ///
    /// No `/.well-known/terraform.json` service discovery is done, so
    /// registries that serve the module API under another path (Terraform
    /// Cloud/Enterprise) answer with a non-200 status and resolve to `""`.
    fn base_url_for(&self, hostname: &str) -> String {
        if hostname.eq_ignore_ascii_case(DEFAULT_REGISTRY) {
            self.base_url.clone()
        } else {
            format!("https://{hostname}")
        }
    }
}

#[async_trait]
impl RegistryApi for RegistryClient {
    async fn latest_version(&self, hostname: &str, address: &str) -> Result<String> {
        let url = format!("{}/v1/modules/{address}", self.base_url_for(hostname));
        tracing::debug!(url = %url, "Querying registry");

        let response = self.client.get(&url).send().await.map_err(|e| crate::err!(Http {
            message: format!("registry request to {url} failed: {e}"),
            status_code: e.status().map(|s| s.as_u16()),
        }))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(
                url = %url,
                status = status.as_u16(),
                "Registry did not return module metadata; latest version is unknown"
            );
            return Ok(String::new());
        }

        let module: RegistryModule = response.json().await.map_err(|e| crate::err!(Http {
            message: format!("invalid registry response from {url}: {e}"),
            status_code: Some(status.as_u16()),
        }))?;

        tracing::debug!(address = %address, version = %module.version, "Registry latest version");
        Ok(module.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModDriftError;
    use serde_json::json;
    use wiremock::{matchers::*, Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RegistryClient {
        let mut config = Config::default();
        config.registry.base_url = format!("{}/", server.uri());
        RegistryClient::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn test_latest_version() -> crate::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/modules/terraform-aws-modules/vpc/aws"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "terraform-aws-modules/vpc/aws/5.8.1",
                "namespace": "terraform-aws-modules",
                "name": "vpc",
                "provider": "aws",
                "version": "5.8.1",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let version = client_for(&server)
            .latest_version(DEFAULT_REGISTRY, "terraform-aws-modules/vpc/aws")
            .await?;
        assert_eq!(version, "5.8.1");
        Ok(())
    }

    #[tokio::test]
    async fn test_not_found_yields_empty_version() -> crate::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let version = client_for(&server)
            .latest_version(DEFAULT_REGISTRY, "github.com/acme/vpc")
            .await?;
        assert_eq!(version, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_version_field() -> crate::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "vpc"})))
            .mount(&server)
            .await;

        let version = client_for(&server)
            .latest_version(DEFAULT_REGISTRY, "acme/vpc/aws")
            .await?;
        assert_eq!(version, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .latest_version(DEFAULT_REGISTRY, "acme/vpc/aws")
            .await
            .unwrap_err();
        assert!(matches!(err, ModDriftError::Http { status_code: Some(200), .. }));
    }

    #[test]
    fn test_base_url_for_hostname() {
        let client = RegistryClient::new(Client::new(), &Config::default());
        assert_eq!(client.base_url_for("registry.terraform.io"), "https://registry.terraform.io");
        assert_eq!(client.base_url_for("app.terraform.io"), "https://app.terraform.io");
    }
}
