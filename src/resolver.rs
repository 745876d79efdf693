//! Version resolution dispatch.
//!
//! Decides, per module declaration, which upstream answers "what is the
//! latest version" and which declared token that answer is compared with:
//!
//! | Source shape        | Current              | Latest                    |
//! |---------------------|----------------------|---------------------------|
//! | `git::...?ref=X`    | `X`                  | greatest tag of the repo  |
//! | local path          | not checked          | not checked               |
//! | anything else       | `version` attribute  | registry latest version   |

use crate::config::Config;
use crate::error::Result;
use crate::parser::{parse_module_source, DEFAULT_REGISTRY};
use crate::types::{GitSource, ModuleDeclaration, ModuleSource, Resolution, ResolutionStrategy};
use crate::upstream::{self, GitHubClient, RegistryApi, RegistryClient, TagApi};

/// Resolves module declarations against their upstream.
pub struct Resolver {
    registry: Box<dyn RegistryApi>,
    tags: Box<dyn TagApi>,
    github_host: String,
}

impl Resolver {
    /// Create a resolver backed by the real registry and GitHub clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let client = upstream::build_http_client(&config.http)?;
        Ok(Self::with_clients(
            Box::new(RegistryClient::new(client.clone(), config)),
            Box::new(GitHubClient::new(client, config)),
            &config.github.host,
        ))
    }

    /// Create a resolver from explicit upstream implementations.
    #[must_use]
    pub fn with_clients(
        registry: Box<dyn RegistryApi>,
        tags: Box<dyn TagApi>,
        github_host: &str,
    ) -> Self {
        Self {
            registry,
            tags,
            github_host: github_host.to_string(),
        }
    }

    /// Resolve one declaration.
    ///
    /// Returns `None` for modules that have no upstream to compare with.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is malformed, points at an unsupported
    /// Git host, or the upstream lookup fails.
    pub async fn resolve(&self, module: &ModuleDeclaration) -> Result<Option<Resolution>> {
        let source = parse_module_source(&module.source)?;

        match &source {
            ModuleSource::Git(git) => self.resolve_git(module, git).await.map(Some),
            ModuleSource::Local { path } => {
                tracing::debug!(module = %module.name, path = %path, "Skipping local module");
                Ok(None)
            }
            ModuleSource::Registry { hostname, .. } => {
                self.resolve_registry(module, hostname, &source).await.map(Some)
            }
            ModuleSource::Other(_) => self
                .resolve_registry(module, DEFAULT_REGISTRY, &source)
                .await
                .map(Some),
        }
    }

    async fn resolve_git(&self, module: &ModuleDeclaration, git: &GitSource) -> Result<Resolution> {
        let current = git.ref_.clone().ok_or_else(|| crate::err!(ModuleSourceParse {
            module_source: module.source.clone(),
            message: format!("module '{}' has no ?ref= to compare against tags", module.name),
        }))?;

        if !git.host.eq_ignore_ascii_case(&self.github_host) {
            return Err(crate::err!(UnsupportedGitProvider {
                host: git.host.clone(),
                module_source: module.source.clone(),
            }));
        }

        tracing::debug!(module = %module.name, repo = %git.slug(), current = %current, "Resolving against tags");
        let latest = self.tags.latest_tag(&git.owner, &git.repo).await?;

        Ok(Resolution {
            strategy: ResolutionStrategy::GitTag,
            current,
            latest,
        })
    }

    async fn resolve_registry(
        &self,
        module: &ModuleDeclaration,
        hostname: &str,
        source: &ModuleSource,
    ) -> Result<Resolution> {
        let address = source.registry_path().unwrap_or_else(|| module.source.clone());

        tracing::debug!(module = %module.name, hostname = %hostname, address = %address, "Resolving against registry");
        let latest = self.registry.latest_version(hostname, &address).await?;

        Ok(Resolution {
            strategy: ResolutionStrategy::Registry,
            current: module.version.clone(),
            latest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModDriftError;
    use crate::upstream::{MockRegistryApi, MockTagApi};
    use std::path::PathBuf;

    fn module(source: &str, version: &str) -> ModuleDeclaration {
        ModuleDeclaration {
            name: "example".to_string(),
            source: source.to_string(),
            version: version.to_string(),
            file_path: PathBuf::from("main.tf"),
        }
    }

    fn resolver(registry: MockRegistryApi, tags: MockTagApi) -> Resolver {
        Resolver::with_clients(Box::new(registry), Box::new(tags), "github.com")
    }

    #[tokio::test]
    async fn test_registry_source_compares_version_attribute() {
        let mut registry = MockRegistryApi::new();
        registry
            .expect_latest_version()
            .withf(|hostname, address| {
                hostname == "registry.terraform.io" && address == "terraform-aws-modules/vpc/aws"
            })
            .times(1)
            .returning(|_, _| Ok("1.3.0".to_string()));

        let resolution = resolver(registry, MockTagApi::new())
            .resolve(&module("terraform-aws-modules/vpc/aws", "1.2.0"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolution.strategy, ResolutionStrategy::Registry);
        assert_eq!(resolution.current, "1.2.0");
        assert_eq!(resolution.latest, "1.3.0");
        assert!(resolution.is_outdated());
    }

    #[tokio::test]
    async fn test_private_registry_hostname() {
        let mut registry = MockRegistryApi::new();
        registry
            .expect_latest_version()
            .withf(|hostname, address| hostname == "app.terraform.io" && address == "acme/vpc/aws")
            .times(1)
            .returning(|_, _| Ok("2.0.0".to_string()));

        let resolution = resolver(registry, MockTagApi::new())
            .resolve(&module("app.terraform.io/acme/vpc/aws", "2.0.0"))
            .await
            .unwrap()
            .unwrap();
        assert!(!resolution.is_outdated());
    }

    #[tokio::test]
    async fn test_other_source_uses_raw_string() {
        let mut registry = MockRegistryApi::new();
        registry
            .expect_latest_version()
            .withf(|hostname, address| {
                hostname == "registry.terraform.io" && address == "github.com/acme/terraform-vpc"
            })
            .times(1)
            .returning(|_, _| Ok(String::new()));

        let resolution = resolver(registry, MockTagApi::new())
            .resolve(&module("github.com/acme/terraform-vpc", "1.0.0"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolution.latest, "");
        assert!(resolution.is_outdated());
    }

    #[tokio::test]
    async fn test_git_source_compares_inline_ref() {
        let mut tags = MockTagApi::new();
        tags.expect_latest_tag()
            .withf(|owner, repo| owner == "acme" && repo == "terraform-vpc")
            .times(1)
            .returning(|_, _| Ok("v1.4.0".to_string()));

        // the version attribute is ignored for git sources
        let resolution = resolver(MockRegistryApi::new(), tags)
            .resolve(&module(
                "git::https://github.com/acme/terraform-vpc.git?ref=v1.1.0",
                "9.9.9",
            ))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolution.strategy, ResolutionStrategy::GitTag);
        assert_eq!(resolution.current, "v1.1.0");
        assert_eq!(resolution.latest, "v1.4.0");
    }

    #[tokio::test]
    async fn test_git_source_without_ref_is_an_error() {
        let err = resolver(MockRegistryApi::new(), MockTagApi::new())
            .resolve(&module("git::https://github.com/acme/terraform-vpc.git", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ModDriftError::ModuleSourceParse { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_git_host() {
        let err = resolver(MockRegistryApi::new(), MockTagApi::new())
            .resolve(&module("git::https://gitlab.com/acme/vpc.git?ref=v1", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ModDriftError::UnsupportedGitProvider { ref host, .. } if host == "gitlab.com"));
    }

    #[tokio::test]
    async fn test_local_source_is_skipped() {
        // no expectations: any upstream call would panic
        let resolution = resolver(MockRegistryApi::new(), MockTagApi::new())
            .resolve(&module("../modules/vpc", ""))
            .await
            .unwrap();
        assert!(resolution.is_none());
    }

    #[tokio::test]
    async fn test_upstream_errors_propagate() {
        let mut tags = MockTagApi::new();
        tags.expect_latest_tag().returning(|_, _| {
            Err(crate::err!(VcsApi {
                platform: "github".to_string(),
                message: "rate limited".to_string(),
            }))
        });

        let result = resolver(MockRegistryApi::new(), tags)
            .resolve(&module("git::https://github.com/acme/vpc.git?ref=v1", ""))
            .await;
        assert!(matches!(result, Err(ModDriftError::VcsApi { .. })));
    }
}
