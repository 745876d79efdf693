//! Plain text report generator.

use crate::error::Result;
use crate::reporter::ReportGenerator;
use crate::types::{CheckResult, OutdatedModule};

/// Text report generator.
///
/// Emits exactly one line per outdated module and nothing else, so the
/// output can be grepped or diffed in CI.
pub struct TextReporter;

impl TextReporter {
    fn line(module: &OutdatedModule) -> String {
        format!(
            "File: {} Module: {} Source: {} has version {}, latest version is {}",
            module.file, module.name, module.source, module.current_version, module.latest_version
        )
    }
}

impl ReportGenerator for TextReporter {
    fn generate(&self, result: &CheckResult) -> Result<String> {
        let mut output = String::new();
        for module in &result.outdated {
            output.push_str(&Self::line(module));
            output.push('\n');
        }
        Ok(output)
    }
}
