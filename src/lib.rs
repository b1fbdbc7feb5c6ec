//! KCL Schema Documentation Generator
//!
//! Turns the typed schema descriptions extracted from a KCL package into
//! Markdown or HTML documents, one per schema, laid out like the package.
//!
//! ## Features
//!
//! - **Mirrored Layout**: `models/person.k` schemas land in `<target>/models/`
//! - **Re-export Deduplication**: a schema re-exported elsewhere is documented once
//! - **Deprecation Filtering**: `@deprecated` schemas are marked or skipped
//! - **Platform Stable Output**: separators and line endings are explicit settings
//! - **Owned Targets**: a checksum manifest guards against overwriting foreign directories
//!
//! ## Layout
//!
//! ```text
//! source/                      target/
//! ├── models/                  ├── models/
//! │   └── person.json   ──▶    │   └── Person.md
//! └── app/                     ├── app/
//!     └── app.json      ──▶    │   ├── App.md
//!                              │   └── Person.md   (re-export reference)
//!                              └── .kcldoc.sha256
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use kcl_gendoc::{Format, GenContext};
//!
//! let mut ctx = GenContext::new("konfig", "docs");
//! ctx.format = Format::Markdown;
//! ctx.ignore_deprecated = true;
//! let summary = ctx.gen_doc()?;
//! println!("{} schemas documented", summary.schemas);
//! # Ok::<(), kcl_gendoc::DocError>(())
//! ```

pub mod checksum;
pub mod config;
pub mod error;
pub mod generate;
pub mod render;
pub mod schema;
pub mod tree;

pub use checksum::{verify_target, Manifest, VerifyReport, MANIFEST_FILE_NAME};
pub use config::DocConfig;
pub use error::{DocError, Result};
pub use generate::{GenContext, GenSummary, TargetPolicy};
pub use render::{Format, Platform, RenderProfile, SchemaRenderer};
pub use schema::{KclOpenApiType, KclPackage};
pub use tree::SchemaTree;
