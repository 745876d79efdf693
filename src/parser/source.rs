//! Module source parsing utilities.
//!
//! This module classifies Terraform module source strings into structured
//! `ModuleSource` values.
//!
//! # Supported Source Types
//!
//! - **Git**: anything prefixed with `git::`, in URL form
//!   (`git::https://host/owner/repo.git`, `git::ssh://git@host/owner/repo.git`)
//!   or scp form (`git::git@host:owner/repo.git`)
//! - **Registry**: `namespace/name/provider` or `hostname/namespace/name/provider`
//! - **Local**: `./path`, `../path`, absolute paths
//! - **Other**: everything else

use crate::error::Result;
use crate::types::{GitSource, ModuleSource};
use regex::Regex;
use std::sync::LazyLock;

/// Default Terraform registry hostname.
pub const DEFAULT_REGISTRY: &str = "registry.terraform.io";

/// Prefix that forces the Git getter.
const GIT_PREFIX: &str = "git::";

// Regex patterns for parsing sources
static REGISTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Matches: namespace/name/provider or hostname/namespace/name/provider
    Regex::new(r"^(?:([a-zA-Z0-9.-]+)/)?([a-zA-Z0-9_-]+)/([a-zA-Z0-9_-]+)/([a-zA-Z0-9_-]+)$")
        .expect("Invalid regex")
});

static SCP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Matches user@host:path (scp-like syntax, no scheme)
    Regex::new(r"^[A-Za-z0-9._-]+@([^:/]+):(.+)$").expect("Invalid regex")
});

/// Parse a module source string into a structured `ModuleSource`.
///
/// # Examples
///
/// ```rust
/// use moddrift::parser::parse_module_source;
/// use moddrift::types::ModuleSource;
///
/// let source = parse_module_source("hashicorp/consul/aws").unwrap();
/// assert!(matches!(source, ModuleSource::Registry { .. }));
///
/// let source = parse_module_source("git::https://github.com/acme/vpc.git?ref=v1.0.0").unwrap();
/// assert!(matches!(source, ModuleSource::Git(_)));
///
/// let source = parse_module_source("../modules/vpc").unwrap();
/// assert!(matches!(source, ModuleSource::Local { .. }));
/// ```
///
/// # Errors
///
/// Returns an error if a `git::` source cannot be split into host, owner and
/// repository.
pub fn parse_module_source(source: &str) -> Result<ModuleSource> {
    let source = source.trim();

    if let Some(rest) = source.strip_prefix(GIT_PREFIX) {
        return parse_git_source(source, rest).map(ModuleSource::Git);
    }

    if is_local_path(source) {
        return Ok(ModuleSource::Local {
            path: source.to_string(),
        });
    }

    if let Some(registry_source) = try_parse_registry_source(source) {
        return Ok(registry_source);
    }

    tracing::debug!(source = %source, "Source is neither git nor registry shaped");
    Ok(ModuleSource::Other(source.to_string()))
}

/// Check if a path is a local file path.
fn is_local_path(source: &str) -> bool {
    source.starts_with("./")
        || source.starts_with("../")
        || source.starts_with('/')
        || source.starts_with('~')
        || (source.len() >= 2 && source.chars().nth(1) == Some(':')) // Windows paths
}

/// Parse the part of a source after `git::`.
fn parse_git_source(original: &str, rest: &str) -> Result<GitSource> {
    let malformed = |message: &str| {
        crate::err!(ModuleSourceParse {
            module_source: original.to_string(),
            message: message.to_string(),
        })
    };

    // Split off the query first; `?ref=` may appear before or after `//subdir`.
    let (location, query) = match rest.split_once('?') {
        Some((location, query)) => (location, Some(query)),
        None => (rest, None),
    };

    let mut ref_ = None;
    let mut query_subdir = None;
    if let Some(query) = query {
        for pair in query.split('&') {
            if let Some(value) = pair.strip_prefix("ref=") {
                match value.split_once("//") {
                    Some((r, subdir)) => {
                        ref_ = Some(r.to_string());
                        query_subdir = Some(subdir.to_string());
                    }
                    None => ref_ = Some(value.to_string()),
                }
            }
        }
    }

    let (host, path, url, location_subdir) = if let Some(caps) = SCP_PATTERN.captures(location) {
        let host = caps.get(1).map_or("", |m| m.as_str());
        let full_path = caps.get(2).map_or("", |m| m.as_str());
        let (path, subdir) = split_subdir(full_path);
        let url_end = location.len() - full_path.len() + path.len();
        (host.to_string(), path.to_string(), location[..url_end].to_string(), subdir)
    } else {
        let parsed = url::Url::parse(location).map_err(|e| malformed(&format!("invalid Git URL: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| malformed("Git URL has no host"))?
            .to_string();
        let full_path = parsed.path().trim_start_matches('/');
        let (path, subdir) = split_subdir(full_path);
        let url_end = location.find(full_path).map_or(location.len(), |start| start + path.len());
        (host, path.to_string(), location[..url_end].to_string(), subdir)
    };

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let owner = segments
        .next()
        .ok_or_else(|| malformed("Git URL has no repository owner"))?
        .to_string();
    let repo = segments
        .next()
        .map(|r| r.trim_end_matches(".git").to_string())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| malformed("Git URL has no repository name"))?;

    let subdir = location_subdir.or(query_subdir).filter(|s| !s.is_empty());

    tracing::debug!(
        host = %host,
        owner = %owner,
        repo = %repo,
        ref_ = ?ref_,
        subdir = ?subdir,
        "Parsed Git source"
    );

    Ok(GitSource {
        url,
        host,
        owner,
        repo,
        ref_,
        subdir,
    })
}

/// Split `owner/repo.git//sub/dir` into (`owner/repo.git`, `Some("sub/dir")`).
fn split_subdir(path: &str) -> (&str, Option<String>) {
    match path.split_once("//") {
        Some((repo_path, subdir)) => (repo_path, Some(subdir.to_string())),
        None => (path, None),
    }
}

/// Try to parse a Terraform Registry source.
fn try_parse_registry_source(source: &str) -> Option<ModuleSource> {
    let caps = REGISTRY_PATTERN.captures(source)?;
    // Four-part: hostname/namespace/name/provider
    // Three-part: namespace/name/provider (uses default registry)
    let hostname = caps
        .get(1)
        .map_or_else(|| DEFAULT_REGISTRY.to_string(), |m| m.as_str().to_string());

    Some(ModuleSource::Registry {
        hostname,
        namespace: caps.get(2)?.as_str().to_string(),
        name: caps.get(3)?.as_str().to_string(),
        provider: caps.get(4)?.as_str().to_string(),
    })
}
