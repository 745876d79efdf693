//! JSON report generator.

use crate::config::Config;
use crate::error::Result;
use crate::reporter::ReportGenerator;
use crate::types::{CheckResult, OutdatedModule};
use serde::Serialize;

/// JSON report generator.
pub struct JsonReporter {
    /// Whether to pretty-print the output
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            pretty: config.output.pretty,
        }
    }
}

impl ReportGenerator for JsonReporter {
    fn generate(&self, result: &CheckResult) -> Result<String> {
        let report = JsonReport::from(result);

        let json = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };

        json.map_err(|e| crate::err!(ReportGeneration {
            message: format!("Failed to serialize JSON report: {e}"),
        }))
    }
}

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Outdated modules in discovery order
    pub outdated: &'a [OutdatedModule],
}

impl<'a> From<&'a CheckResult> for JsonReport<'a> {
    fn from(result: &'a CheckResult) -> Self {
        Self {
            metadata: ReportMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                working_directory: result.working_directory.display().to_string(),
                files_scanned: result.files_scanned.len(),
                modules_checked: result.modules_checked,
                outdated_count: result.outdated.len(),
            },
            outdated: &result.outdated,
        }
    }
}

/// Report metadata.
#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    /// moddrift version
    pub version: String,
    /// Report generation timestamp
    pub timestamp: String,
    /// Directory that was scanned
    pub working_directory: String,
    /// Number of files scanned
    pub files_scanned: usize,
    /// Number of modules compared against an upstream
    pub modules_checked: usize,
    /// Number of outdated modules
    pub outdated_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResolutionStrategy;
    use std::path::PathBuf;

    fn create_test_result() -> CheckResult {
        CheckResult {
            working_directory: PathBuf::from("/infra"),
            files_scanned: vec![PathBuf::from("/infra/main.tf"), PathBuf::from("/infra/dns.tf")],
            modules_checked: 3,
            outdated: vec![OutdatedModule {
                file: "/main.tf".to_string(),
                name: "vpc".to_string(),
                source: "git::https://github.com/acme/vpc.git?ref=v1.0.0".to_string(),
                current_version: "v1.0.0".to_string(),
                latest_version: "v1.1.0".to_string(),
                strategy: ResolutionStrategy::GitTag,
            }],
        }
    }

    #[test]
    fn test_json_report_structure() {
        let report = JsonReporter::new(&Config::default())
            .generate(&create_test_result())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();

        assert_eq!(value["metadata"]["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(value["metadata"]["working_directory"], "/infra");
        assert_eq!(value["metadata"]["files_scanned"], 2);
        assert_eq!(value["metadata"]["modules_checked"], 3);
        assert_eq!(value["metadata"]["outdated_count"], 1);
        assert_eq!(value["outdated"][0]["name"], "vpc");
        assert_eq!(value["outdated"][0]["current_version"], "v1.0.0");
        assert_eq!(value["outdated"][0]["latest_version"], "v1.1.0");
        assert_eq!(value["outdated"][0]["strategy"], "git_tag");
    }

    #[test]
    fn test_compact_output() {
        let mut config = Config::default();
        config.output.pretty = false;

        let report = JsonReporter::new(&config).generate(&create_test_result()).unwrap();
        assert!(!report.contains('\n'));
    }

    #[test]
    fn test_empty_result() {
        let report = JsonReporter::new(&Config::default())
            .generate(&CheckResult::default())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["outdated"], serde_json::json!([]));
    }
}
