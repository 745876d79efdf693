//! Report generation module.
//!
//! This module renders a `CheckResult` as:
//! - Text: one line per outdated module
//! - JSON: machine-readable structured output
//!
//! # Example
//!
//! ```rust
//! use moddrift::reporter::Reporter;
//! use moddrift::{CheckResult, Config, ReportFormat};
//!
//! let reporter = Reporter::new(&Config::default());
//! let text = reporter.generate(&CheckResult::default(), ReportFormat::Text).unwrap();
//! assert!(text.is_empty());
//! ```

mod json;
mod text;

use crate::config::Config;
use crate::error::Result;
use crate::types::{CheckResult, ReportFormat};

pub use json::{JsonReport, JsonReporter};
pub use text::TextReporter;

/// Report generator that supports multiple output formats.
pub struct Reporter {
    config: Config,
}

impl Reporter {
    /// Create a new reporter with the given configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Generate a report in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if report generation fails.
    pub fn generate(&self, result: &CheckResult, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => TextReporter.generate(result),
            ReportFormat::Json => JsonReporter::new(&self.config).generate(result),
        }
    }
}

/// Trait for report generators.
pub trait ReportGenerator {
    /// Generate a report from check results.
    ///
    /// # Errors
    ///
    /// Returns an error if generation fails.
    fn generate(&self, result: &CheckResult) -> Result<String>;
}
