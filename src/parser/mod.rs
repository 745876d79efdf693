//! HCL parsing module for Terraform/OpenTofu files.
//!
//! This module walks a working directory, reads `.tf` files and extracts
//! the `module` blocks they declare.
//!
//! # Example
//!
//! ```rust,no_run
//! use moddrift::parser::HclParser;
//! use moddrift::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let parser = HclParser::new(&config);
//!
//!     for file in parser.list_files(std::path::Path::new("./terraform"))? {
//!         let modules = parser.parse_file(&file).await?;
//!         println!("{}: {} modules", file.display(), modules.len());
//!     }
//!     Ok(())
//! }
//! ```

mod hcl;
mod source;

pub use hcl::HclParser;
pub use source::{parse_module_source, DEFAULT_REGISTRY};

/// File extensions to scan for Terraform/OpenTofu files.
pub const TERRAFORM_EXTENSIONS: &[&str] = &[".tf"];

/// Directory names skipped during scanning.
pub const SKIP_DIRS: &[&str] = &[".terraform", ".terragrunt-cache"];
