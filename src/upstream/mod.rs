//! Upstream version lookups.
//!
//! Two sources of "latest version" exist:
//! - a module registry's `/v1/modules/{address}` endpoint
//! - the tag list of a GitHub repository
//!
//! Both sit behind traits so the resolver can be exercised without a network.

mod github;
mod registry;

pub use github::GitHubClient;
pub use registry::RegistryClient;

use crate::config::HttpOptions;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Lookup of the latest published version of a registry module.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Latest version of `address` (`namespace/name/provider`) on `hostname`.
    ///
    /// Returns an empty string when the registry does not answer with 200.
    async fn latest_version(&self, hostname: &str, address: &str) -> Result<String>;
}

/// Lookup of the greatest tag of a repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagApi: Send + Sync {
    /// Greatest tag name of `owner/repo`, or an empty string if it has none.
    async fn latest_tag(&self, owner: &str, repo: &str) -> Result<String>;
}

/// Build the HTTP client shared by the upstream clients.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_http_client(options: &HttpOptions) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(options.user_agent.clone());
    if let Some(secs) = options.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build().map_err(|e| crate::err!(Http {
        message: format!("failed to create HTTP client: {e}"),
        status_code: None,
    }))
}
