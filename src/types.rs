//! Core data types used throughout moddrift.
//!
//! This module defines the fundamental data structures for representing:
//! - Module declarations as written in Terraform/OpenTofu files
//! - Classified module sources (registry, Git, local)
//! - Resolution outcomes and the final check result

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A module block as declared in a configuration file.
///
/// # Example HCL
///
/// ```hcl
/// module "vpc" {
///   source  = "terraform-aws-modules/vpc/aws"
///   version = "5.1.0"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDeclaration {
    /// The label of the module block (e.g., "vpc")
    pub name: String,

    /// The raw source locator as written
    pub source: String,

    /// The declared version; empty when the block has no `version` attribute
    pub version: String,

    /// File where this module is declared
    pub file_path: PathBuf,
}

/// Classified form of a module source string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ModuleSource {
    /// Registry module (e.g., "hashicorp/consul/aws")
    Registry {
        /// Registry hostname (default: registry.terraform.io)
        hostname: String,
        /// Namespace (e.g., "hashicorp")
        namespace: String,
        /// Module name (e.g., "consul")
        name: String,
        /// Provider (e.g., "aws")
        provider: String,
    },

    /// `git::` prefixed source
    Git(GitSource),

    /// Local file path
    Local {
        /// Path to the module (relative or absolute)
        path: String,
    },

    /// Anything else; still looked up against the registry
    Other(String),
}

impl ModuleSource {
    /// Path component used against a registry's `/v1/modules/` endpoint.
    #[must_use]
    pub fn registry_path(&self) -> Option<String> {
        match self {
            Self::Registry { namespace, name, provider, .. } => {
                Some(format!("{namespace}/{name}/{provider}"))
            }
            Self::Other(raw) => Some(raw.clone()),
            Self::Git(_) | Self::Local { .. } => None,
        }
    }
}

/// A `git::` module source broken into its parts.
///
/// `git::https://github.com/acme/terraform-vpc.git//modules/core?ref=v1.4.0`
/// yields host `github.com`, owner `acme`, repo `terraform-vpc`,
/// subdir `modules/core` and ref `v1.4.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSource {
    /// Repository location without the `git::` prefix, subdir or query
    pub url: String,
    /// Git host (e.g., "github.com")
    pub host: String,
    /// Repository owner or organization
    pub owner: String,
    /// Repository name without `.git`
    pub repo: String,
    /// Inline `?ref=` value
    pub ref_: Option<String>,
    /// Subdirectory within the repository
    pub subdir: Option<String>,
}

impl GitSource {
    /// `owner/repo` slug.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// How the latest version of a module was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Registry latest-version endpoint, compared with the `version` attribute
    Registry,
    /// Greatest Git tag, compared with the inline `?ref=`
    GitTag,
}

impl std::fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registry => write!(f, "registry"),
            Self::GitTag => write!(f, "git_tag"),
        }
    }
}

/// Outcome of resolving one module against its upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Lookup strategy used
    pub strategy: ResolutionStrategy,
    /// The comparable token taken from the declaration
    pub current: String,
    /// The latest version reported upstream
    pub latest: String,
}

impl Resolution {
    /// Versions are compared as plain strings; any difference is drift.
    #[must_use]
    pub fn is_outdated(&self) -> bool {
        self.current != self.latest
    }
}

/// A module whose declared version differs from the upstream latest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedModule {
    /// File path relative to the working directory (string prefix removed)
    pub file: String,
    /// Module block label
    pub name: String,
    /// Raw source string
    pub source: String,
    /// Declared version or inline ref
    pub current_version: String,
    /// Latest upstream version
    pub latest_version: String,
    /// Lookup strategy used
    pub strategy: ResolutionStrategy,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One plain line per outdated module
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

/// Result of a complete check run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckResult {
    /// The directory that was scanned
    pub working_directory: PathBuf,
    /// Files that were parsed
    pub files_scanned: Vec<PathBuf>,
    /// Number of module declarations compared against an upstream
    pub modules_checked: usize,
    /// Outdated modules in discovery order
    pub outdated: Vec<OutdatedModule>,
}

impl CheckResult {
    /// Returns true if any module is outdated.
    #[must_use]
    pub fn has_drift(&self) -> bool {
        !self.outdated.is_empty()
    }
}
