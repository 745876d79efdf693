//! Configuration module for moddrift.
//!
//! This module handles loading and validating configuration from:
//! - YAML configuration files (`moddrift.yaml`)
//! - Environment variables
//! - CLI arguments
//!
//! # Configuration File Format
//!
//! ```yaml
//! # moddrift.yaml
//!
//! scan:
//!   exclude_patterns:
//!     - "legacy-*"
//!
//! registry:
//!   base_url: https://registry.terraform.io
//!
//! github:
//!   host: github.com
//!   api_base_url: https://api.github.com
//!   per_page: 100
//!   token: ${PERSONAL_ACCESS_TOKEN}  # Environment variable expansion
//!
//! http:
//!   timeout_secs: 30
//!
//! output:
//!   pretty: true
//! ```

use crate::error::{ModDriftError, Result, ResultExt};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default configuration file names, in lookup order.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["moddrift.yaml", "moddrift.yml", ".moddrift.yaml"];

static BRACED_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("Invalid regex"));

static BARE_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex"));

/// Scanning options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanOptions {
    /// File or directory names to skip (glob patterns).
    pub exclude_patterns: Vec<String>,
}

/// Module registry options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryOptions {
    /// Base URL of the default registry.
    pub base_url: String,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            base_url: "https://registry.terraform.io".to_string(),
        }
    }
}

/// GitHub tag lookup options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubOptions {
    /// Git host whose sources are resolved through the GitHub API.
    pub host: String,

    /// REST API base URL.
    pub api_base_url: String,

    /// Page size for tag listing.
    pub per_page: u32,

    /// Personal access token sent as a bearer token.
    pub token: Option<String>,
}

impl Default for GitHubOptions {
    fn default() -> Self {
        Self {
            host: "github.com".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            per_page: 100,
            token: None,
        }
    }
}

impl GitHubOptions {
    /// The configured token, ignoring empty values and unexpanded placeholders.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.starts_with('$'))
    }
}

/// HTTP client options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpOptions {
    /// User-Agent header for every request.
    pub user_agent: String,

    /// Request timeout in seconds; no timeout when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: format!("moddrift/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: None,
        }
    }
}

/// Output options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Scanning options
    pub scan: ScanOptions,

    /// Registry options
    pub registry: RegistryOptions,

    /// GitHub options
    pub github: GitHubOptions,

    /// HTTP client options
    pub http: HttpOptions,

    /// Output options
    pub output: OutputOptions,
}

impl Config {
    /// Load configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or a value is out of range.
    pub fn from_yaml(content: &str) -> Result<Self> {
        tracing::debug!("Parsing configuration from YAML");
        let expanded = expand_env_vars(content);

        // an empty or comment-only document deserializes to unit, not a map
        if expanded.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#')) {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&expanded)
            .to_config_parse_error("invalid YAML configuration".to_string())?;
        config.validate()?;

        tracing::debug!(
            exclude_patterns = config.scan.exclude_patterns.len(),
            registry = %config.registry.base_url,
            github_api = %config.github.api_base_url,
            token_set = config.github.token().is_some(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid.
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading configuration file");
        let content = std::fs::read_to_string(path).with_path(path)?;
        Self::from_yaml(&content)
    }

    /// Load configuration from an explicit path or the first default file
    /// found in the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for name in DEFAULT_CONFIG_FILES {
            let path = PathBuf::from(name);
            if path.exists() {
                tracing::debug!(path = %path.display(), "Found configuration file");
                return Self::from_file(&path);
            }
        }

        tracing::debug!("No configuration file found, using default configuration");
        Ok(Self::default())
    }

    /// Check values that deserialize fine but cannot work.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigValue` error naming the offending key.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("registry.base_url", &self.registry.base_url),
            ("github.api_base_url", &self.github.api_base_url),
        ] {
            url::Url::parse(value).map_err(|e| crate::err!(ConfigValue {
                key: key.to_string(),
                message: format!("'{value}' is not a valid URL: {e}"),
            }))?;
        }

        if !(1..=100).contains(&self.github.per_page) {
            return Err(crate::err!(ConfigValue {
                key: "github.per_page".to_string(),
                message: format!("must be between 1 and 100, got {}", self.github.per_page),
            }));
        }

        if self.github.host.trim().is_empty() {
            return Err(crate::err!(ConfigValue {
                key: "github.host".to_string(),
                message: "must not be empty".to_string(),
            }));
        }

        if self.http.timeout_secs == Some(0) {
            return Err(crate::err!(ConfigValue {
                key: "http.timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            }));
        }

        for pattern in &self.scan.exclude_patterns {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(ModDriftError::config_parse(
                    format!("invalid exclude pattern '{pattern}'"),
                    Some(Box::new(e)),
                    file!(),
                    line!(),
                ));
            }
        }

        Ok(())
    }

    /// Generate an example YAML configuration.
    #[must_use]
    pub fn example_yaml() -> String {
        r#"# moddrift configuration file

# Scanning options
scan:
  # File or directory names to skip (glob patterns).
  # .terraform and .terragrunt-cache are always skipped.
  exclude_patterns: []

# Module registry used for registry sources without a hostname
registry:
  base_url: https://registry.terraform.io

# Tag lookup for git:: sources
github:
  host: github.com
  api_base_url: https://api.github.com
  per_page: 100
  # token: ${PERSONAL_ACCESS_TOKEN}

# HTTP client
http:
  # Request timeout in seconds; ~ means no timeout
  timeout_secs: ~

# Output options
output:
  pretty: true
"#
        .to_string()
    }

    /// Merge CLI arguments into the configuration.
    pub fn merge_cli_args(&mut self, args: &crate::cli::CheckArgs) {
        if !args.exclude_patterns.is_empty() {
            self.scan
                .exclude_patterns
                .extend(args.exclude_patterns.iter().cloned());
        }
        if let Some(token) = &args.token {
            self.github.token = Some(token.clone());
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. Unknown variables are left as written.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    for re in [&*BRACED_VAR, &*BARE_VAR] {
        for cap in re.captures_iter(content) {
            if let Ok(value) = std::env::var(&cap[1]) {
                result = result.replace(&cap[0], &value);
            }
        }
    }

    result
}
