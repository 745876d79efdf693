//! # moddrift
//!
//! Reports Terraform/OpenTofu modules whose declared version lags behind
//! their upstream.
//!
//! moddrift walks a directory of `.tf` files, extracts every `module` block
//! and resolves the latest version per source type:
//!
//! - **Registry sources** (`namespace/name/provider`): the registry's latest
//!   version is compared with the `version` attribute
//! - **Git sources** (`git::...?ref=X`): the greatest tag of the GitHub
//!   repository is compared with `X`
//! - **Local sources**: skipped
//!
//! ## Example
//!
//! ```rust,no_run
//! use moddrift::{Checker, Config, ReportFormat};
//! use moddrift::reporter::Reporter;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let checker = Checker::new(&config)?;
//!
//!     let result = checker.check_directory("./terraform").await?;
//!
//!     let report = Reporter::new(&config).generate(&result, ReportFormat::Text)?;
//!     print!("{report}");
//!     Ok(())
//! }
//! ```

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod reporter;
pub mod resolver;
pub mod types;
pub mod upstream;

// Re-export commonly used types at crate root
pub use config::Config;
pub use error::{ModDriftError, Result};
pub use resolver::Resolver;
pub use types::{
    CheckResult, ModuleDeclaration, ModuleSource, OutdatedModule, ReportFormat, Resolution,
    ResolutionStrategy,
};

use std::path::Path;

/// Runs the whole check: walk, parse, resolve, compare.
///
/// Modules are resolved one at a time in file order; the first error aborts
/// the run and no partial result is returned.
///
/// # Example
///
/// ```rust,no_run
/// use moddrift::{Checker, Config};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let checker = Checker::new(&Config::default())?;
///     let result = checker.check_directory(".").await?;
///
///     for module in &result.outdated {
///         println!("{} is at {}", module.name, module.latest_version);
///     }
///     Ok(())
/// }
/// ```
pub struct Checker {
    parser: parser::HclParser,
    resolver: Resolver,
}

impl Checker {
    /// Create a checker backed by the real upstream clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_resolver(config, Resolver::new(config)?))
    }

    /// Create a checker with a custom resolver.
    #[must_use]
    pub fn with_resolver(config: &Config, resolver: Resolver) -> Self {
        Self {
            parser: parser::HclParser::new(config),
            resolver,
        }
    }

    /// Check every module declared under `working_directory`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist or a file can't be read
    /// - HCL parsing fails or a module block is malformed
    /// - An upstream lookup fails
    pub async fn check_directory<P: AsRef<Path>>(&self, working_directory: P) -> Result<CheckResult> {
        let working_directory = working_directory.as_ref();
        tracing::info!(dir = %working_directory.display(), "Checking modules");

        let files = self.parser.list_files(working_directory)?;
        let mut result = CheckResult {
            working_directory: working_directory.to_path_buf(),
            ..CheckResult::default()
        };

        for file in files {
            let modules = self.parser.parse_file(&file).await?;
            tracing::debug!(file = %file.display(), modules = modules.len(), "Parsed file");

            for module in modules {
                let Some(resolution) = self.resolver.resolve(&module).await? else {
                    continue;
                };
                result.modules_checked += 1;

                if !resolution.is_outdated() {
                    tracing::debug!(module = %module.name, version = %resolution.current, "Module is current");
                    continue;
                }

                tracing::info!(
                    module = %module.name,
                    source = %module.source,
                    current = %resolution.current,
                    latest = %resolution.latest,
                    "Module is outdated"
                );
                result.outdated.push(OutdatedModule {
                    file: display_path(working_directory, &module.file_path),
                    name: module.name,
                    source: module.source,
                    current_version: resolution.current,
                    latest_version: resolution.latest,
                    strategy: resolution.strategy,
                });
            }

            result.files_scanned.push(file);
        }

        tracing::info!(
            files = result.files_scanned.len(),
            modules = result.modules_checked,
            outdated = result.outdated.len(),
            "Check complete"
        );
        Ok(result)
    }
}

/// The file path with the working directory's string prefix removed.
///
/// `/infra` and `/infra/net/main.tf` give `/net/main.tf`. Paths walked from
/// `.` are reported without their leading `./`.
fn display_path(working_directory: &Path, file: &Path) -> String {
    let root = working_directory.to_string_lossy();
    let file = file.to_string_lossy();

    if root == "." {
        return file.strip_prefix("./").unwrap_or(&file).to_string();
    }
    file.strip_prefix(&*root).unwrap_or(&file).to_string()
}
