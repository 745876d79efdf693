//! HCL file parser implementation.
//!
//! This module provides the directory walk and module block extraction on top
//! of the `hcl-rs` crate.

use crate::config::Config;
use crate::error::{ModDriftError, Result};
use crate::parser::{SKIP_DIRS, TERRAFORM_EXTENSIONS};
use crate::types::ModuleDeclaration;

use hcl::{Block, Body, Expression};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// HCL parser for Terraform/OpenTofu files.
pub struct HclParser {
    /// Glob patterns matched against file and directory names
    exclude_patterns: Vec<glob::Pattern>,
}

impl HclParser {
    /// Create a new HCL parser with the given configuration.
    ///
    /// Invalid exclude patterns are logged and ignored.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let exclude_patterns = config
            .scan
            .exclude_patterns
            .iter()
            .filter_map(|pattern| match glob::Pattern::new(pattern) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Ignoring invalid exclude pattern");
                    None
                }
            })
            .collect();

        Self { exclude_patterns }
    }

    /// List every Terraform file under `path`, in file-name order.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory doesn't exist or any entry of the
    /// walk cannot be read.
    pub fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !path.exists() {
            return Err(crate::err!(DirectoryNotFound {
                path: path.to_path_buf(),
            }));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.should_skip(e.path()))
        {
            let entry = entry.map_err(|e| {
                let failed_path = e.path().unwrap_or(path).to_path_buf();
                match e.into_io_error() {
                    Some(source) => ModDriftError::io(failed_path, source, file!(), line!()),
                    None => crate::err!(Internal {
                        message: format!("filesystem loop detected at {}", failed_path.display()),
                    }),
                }
            })?;

            if entry.file_type().is_dir() {
                continue;
            }

            if !self.is_terraform_file(entry.path()) {
                continue;
            }

            files.push(entry.into_path());
        }

        tracing::debug!(dir = %path.display(), files = files.len(), "Directory walk complete");
        Ok(files)
    }

    /// Parse a single Terraform file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn parse_file(&self, path: &Path) -> Result<Vec<ModuleDeclaration>> {
        tracing::debug!(file = %path.display(), "Parsing file");
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ModDriftError::io(path, e, file!(), line!()))?;

        self.parse_content(&content, path)
    }

    /// Check if a path should be skipped.
    fn should_skip(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        if SKIP_DIRS.iter().any(|s| file_name == *s) {
            tracing::debug!(path = %path.display(), reason = "known skip dir", "Skipping path");
            return true;
        }

        if self.exclude_patterns.iter().any(|p| p.matches(file_name)) {
            tracing::debug!(path = %path.display(), reason = "matches exclude pattern", "Skipping path");
            return true;
        }

        false
    }

    /// Check if a file is a Terraform file.
    fn is_terraform_file(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        TERRAFORM_EXTENSIONS
            .iter()
            .any(|ext| path_str.ends_with(ext))
    }
}

impl HclParser {
    /// Extract module declarations from a single file's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the HCL is invalid or a module block has no
    /// `source`.
    pub fn parse_content(&self, content: &str, file_path: &Path) -> Result<Vec<ModuleDeclaration>> {
        let body: Body = hcl::from_str(content).map_err(|e| crate::err!(HclParse {
            file: file_path.to_path_buf(),
            message: e.to_string(),
        }))?;

        let mut modules = Vec::new();

        for structure in body.into_inner() {
            if let hcl::Structure::Block(block) = structure {
                if block.identifier.as_str() == "module" {
                    modules.push(parse_module_block(&block, file_path)?);
                }
                // resource, data, variable, terraform etc. carry no module versions
            }
        }

        Ok(modules)
    }
}

/// Parse a module block into a `ModuleDeclaration`.
fn parse_module_block(block: &Block, file_path: &Path) -> Result<ModuleDeclaration> {
    let name = block
        .labels
        .first()
        .map(|l| l.as_str().to_string())
        .ok_or_else(|| crate::err!(HclStructure {
            file: file_path.to_path_buf(),
            message: "module block has no name label".to_string(),
        }))?;

    let source = get_string_attribute(&block.body, "source").ok_or_else(|| {
        tracing::warn!(
            module = %name,
            file = %file_path.display(),
            "Module block missing source attribute"
        );
        crate::err!(HclStructure {
            file: file_path.to_path_buf(),
            message: format!("module '{name}' has no source attribute"),
        })
    })?;

    let version = get_string_attribute(&block.body, "version").unwrap_or_default();

    Ok(ModuleDeclaration {
        name,
        source,
        version,
        file_path: file_path.to_path_buf(),
    })
}

/// Get a string attribute from a body.
fn get_string_attribute(body: &Body, key: &str) -> Option<String> {
    body.attributes()
        .find(|attr| attr.key.as_str() == key)
        .and_then(|attr| expression_to_string(&attr.expr))
}

/// Convert an expression to a string if possible.
fn expression_to_string(expr: &Expression) -> Option<String> {
    match expr {
        Expression::String(s) => Some(s.clone()),
        Expression::Number(n) => Some(n.to_string()),
        Expression::Bool(b) => Some(b.to_string()),
        // interpolated strings keep their raw template text
        Expression::TemplateExpr(t) => Some(t.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn create_test_parser() -> HclParser {
        HclParser::new(&Config::default())
    }

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_parse_registry_module() {
        let parser = create_test_parser();
        let content = r#"
module "vpc" {
  source  = "terraform-aws-modules/vpc/aws"
  version = "5.1.0"

  name = "my-vpc"
  cidr = "10.0.0.0/16"
}
"#;

        let modules = parser.parse_content(content, Path::new("main.tf")).unwrap();

        assert_eq!(modules.len(), 1);
        let module = &modules[0];
        assert_eq!(module.name, "vpc");
        assert_eq!(module.source, "terraform-aws-modules/vpc/aws");
        assert_eq!(module.version, "5.1.0");
        assert_eq!(module.file_path, PathBuf::from("main.tf"));
    }

    #[test]
    fn test_parse_git_module_without_version() {
        let parser = create_test_parser();
        let content = r#"
module "example" {
  source = "git::https://github.com/example/terraform-module.git?ref=v1.0.0"
}
"#;

        let modules = parser.parse_content(content, Path::new("main.tf")).unwrap();

        assert_eq!(modules.len(), 1);
        assert_eq!(
            modules[0].source,
            "git::https://github.com/example/terraform-module.git?ref=v1.0.0"
        );
        assert_eq!(modules[0].version, "");
    }

    #[test]
    fn test_parse_multiple_modules_in_order() {
        let parser = create_test_parser();
        let content = r#"
module "vpc" {
  source  = "terraform-aws-modules/vpc/aws"
  version = "5.0.0"
}

resource "aws_s3_bucket" "logs" {
  bucket = "logs"
}

module "eks" {
  source  = "terraform-aws-modules/eks/aws"
  version = "19.0.0"
}
"#;

        let modules = parser.parse_content(content, Path::new("main.tf")).unwrap();
        let names: Vec<_> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["vpc", "eks"]);
    }

    #[test]
    fn test_module_without_source_is_an_error() {
        let parser = create_test_parser();
        let content = r#"
module "broken" {
  version = "1.0.0"
}
"#;

        let err = parser.parse_content(content, Path::new("main.tf")).unwrap_err();
        assert!(matches!(err, ModDriftError::HclStructure { .. }));
    }

    #[test]
    fn test_parse_invalid_hcl() {
        let parser = create_test_parser();
        let content = "this is not valid { hcl";

        let result = parser.parse_content(content, Path::new("main.tf"));
        assert!(matches!(result, Err(ModDriftError::HclParse { .. })));
    }

    #[test]
    fn test_file_without_modules() {
        let parser = create_test_parser();
        let content = r#"
variable "region" {
  default = "eu-west-1"
}
"#;
        let modules = parser.parse_content(content, Path::new("variables.tf")).unwrap();
        assert!(modules.is_empty());
    }

    #[test]
    fn test_is_terraform_file() {
        let parser = create_test_parser();

        assert!(parser.is_terraform_file(Path::new("main.tf")));
        assert!(parser.is_terraform_file(Path::new("variables.tf")));
        assert!(!parser.is_terraform_file(Path::new("terraform.tfvars")));
        assert!(!parser.is_terraform_file(Path::new("readme.md")));
    }

    #[test]
    fn test_should_skip() {
        let parser = create_test_parser();

        assert!(parser.should_skip(Path::new("stack/.terraform")));
        assert!(parser.should_skip(Path::new(".terragrunt-cache")));
        assert!(!parser.should_skip(Path::new("modules")));
        assert!(!parser.should_skip(Path::new("main.tf")));
    }

    #[test]
    fn test_exclude_patterns() {
        let mut config = Config::default();
        config.scan.exclude_patterns = vec!["legacy*".to_string(), "[".to_string()];
        let parser = HclParser::new(&config);

        assert!(parser.should_skip(Path::new("infra/legacy-network")));
        assert!(!parser.should_skip(Path::new("infra/network")));
    }

    #[test]
    fn test_list_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.tf", "");
        write(dir.path(), "a.tf", "");
        write(dir.path(), "notes.md", "");
        write(dir.path(), "nested/c.tf", "");
        write(dir.path(), ".terraform/modules/vpc/main.tf", "");

        let parser = create_test_parser();
        let files = parser.list_files(dir.path()).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("a.tf"),
                PathBuf::from("b.tf"),
                PathBuf::from("nested/c.tf"),
            ]
        );
    }

    #[test]
    fn test_list_files_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let files = create_test_parser().list_files(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_list_files_missing_directory() {
        let err = create_test_parser()
            .list_files(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(matches!(err, ModDriftError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_walk_root_is_never_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".terraform/main.tf", "");

        let files = create_test_parser()
            .list_files(&dir.path().join(".terraform"))
            .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn test_parse_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "main.tf",
            r#"
module "dns" {
  source  = "acme/dns/aws"
  version = "2.0.0"
}
"#,
        );

        let modules = create_test_parser()
            .parse_file(&dir.path().join("main.tf"))
            .await
            .unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "dns");
    }

    #[tokio::test]
    async fn test_parse_file_missing() {
        let err = create_test_parser()
            .parse_file(Path::new("/definitely/not/here.tf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModDriftError::Io { .. }));
    }
}
