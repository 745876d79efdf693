//! GitHub tag listing.

use crate::config::Config;
use crate::error::Result;
use crate::upstream::TagApi;
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, ACCEPT, LINK};
use reqwest::Client;
use serde::Deserialize;
use std::sync::LazyLock;

static NEXT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).expect("Invalid regex"));

/// GitHub REST API client
pub struct GitHubClient {
    client: Client,
    api_base_url: String,
    token: Option<String>,
    per_page: u32,
}

#[derive(Debug, Deserialize)]
struct GitHubTag {
    name: String,
}

impl GitHubClient {
    /// Create a GitHub client from configuration.
    #[must_use]
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_base_url: config.github.api_base_url.trim_end_matches('/').to_string(),
            token: config.github.token().map(str::to_string),
            per_page: config.github.per_page,
        }
    }

    /// List every tag name of a repository, following pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails or any page returns a non-success
    /// status.
    pub async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let mut next = Some(format!(
            "{}/repos/{owner}/{repo}/tags?per_page={}&page=1",
            self.api_base_url, self.per_page
        ));
        let mut tags = Vec::new();

        while let Some(url) = next.take() {
            tracing::debug!(url = %url, "Fetching tag page");

            let mut request = self
                .client
                .get(&url)
                .header(ACCEPT, "application/vnd.github+json");
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await.map_err(|e| crate::err!(VcsApi {
                platform: "github".to_string(),
                message: format!("failed to fetch tags for {owner}/{repo}: {e}"),
            }))?;

            let status = response.status();
            if !status.is_success() {
                return Err(crate::err!(VcsApi {
                    platform: "github".to_string(),
                    message: format!("listing tags for {owner}/{repo} returned status {status}"),
                }));
            }

            next = next_page_url(response.headers());

            let page: Vec<GitHubTag> = response.json().await.map_err(|e| crate::err!(VcsApi {
                platform: "github".to_string(),
                message: format!("failed to parse tags for {owner}/{repo}: {e}"),
            }))?;
            tags.extend(page.into_iter().map(|t| t.name));
        }

        tracing::debug!(repo = %format!("{owner}/{repo}"), tags = tags.len(), "Listed tags");
        Ok(tags)
    }
}

#[async_trait]
impl TagApi for GitHubClient {
    async fn latest_tag(&self, owner: &str, repo: &str) -> Result<String> {
        let tags = self.list_tags(owner, repo).await?;

        // byte-wise string order, not semver
        match tags.into_iter().max() {
            Some(tag) => Ok(tag),
            None => {
                tracing::info!(repo = %format!("{owner}/{repo}"), "No tags found");
                Ok(String::new())
            }
        }
    }
}

/// Extract the `rel="next"` target of a `Link` header.
fn next_page_url(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            NEXT_LINK
                .captures(value)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
}
