//! Documentation Generation
//!
//! Walks a package, renders every canonical schema and writes the documents
//! into a target tree that mirrors the package layout.
//!
//! Phases:
//! 1. check the target policy (nothing is touched yet)
//! 2. load and classify every declaration of the run
//! 3. partition canonical schemas and re-exports over the whole run
//! 4. render every document in memory
//! 5. clear the target, write documents and the manifest
//!
//! A failure in phases 1-4 leaves the target exactly as it was.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::checksum::{Manifest, MANIFEST_FILE_NAME};
use crate::error::{DocError, Result};
use crate::render::{names, Format, Platform, RenderProfile, SchemaRenderer};
use crate::schema::{KclOpenApiType, KclPackage};
use crate::tree::{
    classify_declaration, load_package, DefinitionIndex, ImportPartition, LoadConfig,
    PackagePath, Role, SchemaTree,
};

// =============================================================================
// Target Policy
// =============================================================================

/// What to do with an existing, non-empty target directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetPolicy {
    /// Only replace a target that carries a manifest from a previous run
    #[default]
    RequireOwned,
    /// Replace whatever is there
    Force,
}

// =============================================================================
// Rendered Output
// =============================================================================

/// Kind of a generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    /// Full schema documentation
    Schema,
    /// Reference to the canonical document of a re-exported schema
    Reference,
}

/// One document ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDoc {
    /// Path segments relative to the target root, file name last
    pub path: Vec<String>,
    pub content: String,
    pub kind: DocKind,
}

impl RenderedDoc {
    /// `/`-separated relative path, as recorded in the manifest
    pub fn manifest_path(&self) -> String {
        self.path.join("/")
    }
}

/// All documents of a run, in traversal order
#[derive(Debug, Clone, Default)]
pub struct RenderPlan {
    pub docs: Vec<RenderedDoc>,
    pub skipped_deprecated: usize,
}

/// What a completed run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenSummary {
    pub packages: usize,
    pub schemas: usize,
    pub references: usize,
    pub skipped_deprecated: usize,
}

// =============================================================================
// Generation Context
// =============================================================================

/// Settings of one documentation run
#[derive(Debug, Clone)]
pub struct GenContext {
    /// Root of the package to document
    pub package_path: PathBuf,
    pub format: Format,
    pub ignore_deprecated: bool,
    pub escape_html: bool,
    /// Output directory root
    pub target: PathBuf,
    /// Separator and line-ending conventions of the output
    pub platform: Platform,
    pub target_policy: TargetPolicy,
    pub load_config: LoadConfig,
}

impl GenContext {
    pub fn new(package_path: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            package_path: package_path.into(),
            format: Format::default(),
            ignore_deprecated: false,
            escape_html: false,
            target: target.into(),
            platform: Platform::host(),
            target_policy: TargetPolicy::default(),
            load_config: LoadConfig::default(),
        }
    }

    pub fn profile(&self) -> RenderProfile {
        RenderProfile {
            format: self.format,
            platform: self.platform,
            ignore_deprecated: self.ignore_deprecated,
            escape_html: self.escape_html,
        }
    }

    /// Render a single top-level schema on its own.
    ///
    /// `$ref`s are labelled with their bare definition key since no other
    /// definitions are known. Returns `None` when the schema is deprecated
    /// and deprecated output is ignored.
    pub fn render_schema_doc_content(&self, schema: &KclOpenApiType) -> Result<Option<String>> {
        let package = schema
            .model_type()
            .map(|model| PackagePath::from_dotted(&model.import.package))
            .unwrap_or_default();
        let key = schema
            .model_type()
            .map(|model| model.type_name.clone())
            .unwrap_or_else(|| "<anonymous>".to_string());

        let decl = classify_declaration(&key, schema, &package, &DefinitionIndex::default())?;
        SchemaRenderer::new(self.profile()).render(&decl)
    }

    /// Generate the documentation tree for `package_path` into `target`
    pub fn gen_doc(&self) -> Result<GenSummary> {
        info!(
            package = %self.package_path.display(),
            target = %self.target.display(),
            format = %self.format,
            "Generating documentation"
        );

        check_target(&self.target, &self.package_path, self.target_policy)?;

        let root = load_package(&self.package_path, &self.load_config)?;
        let tree = SchemaTree::from_package(&root)?;
        let plan = self.render_tree(&tree)?;

        reset_target(&self.target)?;
        let manifest = write_docs(&self.target, &plan.docs)?;
        let manifest_path = self.target.join(MANIFEST_FILE_NAME);
        fs::write(&manifest_path, manifest.render()).map_err(|e| DocError::io(&manifest_path, e))?;

        let summary = GenSummary {
            packages: package_count(&root),
            schemas: plan.docs.iter().filter(|d| d.kind == DocKind::Schema).count(),
            references: plan.docs.iter().filter(|d| d.kind == DocKind::Reference).count(),
            skipped_deprecated: plan.skipped_deprecated,
        };
        info!(
            packages = summary.packages,
            schemas = summary.schemas,
            references = summary.references,
            skipped = summary.skipped_deprecated,
            "Documentation generated"
        );
        Ok(summary)
    }

    /// Render every document of `tree` in memory
    pub fn render_tree(&self, tree: &SchemaTree) -> Result<RenderPlan> {
        let decls = tree.decls();
        let partition = ImportPartition::compute(decls);
        debug!(
            canonical = partition.canonical_count(),
            aliases = partition.alias_count(),
            "Resolved re-exports"
        );

        let renderer = SchemaRenderer::new(self.profile());
        let mut plan = RenderPlan::default();
        let mut owners: HashMap<Vec<String>, String> = HashMap::new();

        for (idx, decl) in decls.iter().enumerate() {
            let (rendered, kind) = match partition.role(idx) {
                Role::Canonical => (renderer.render(decl)?, DocKind::Schema),
                Role::Alias { canonical } => (
                    renderer.render_reference(decl, &decls[canonical])?,
                    DocKind::Reference,
                ),
            };

            let content = match rendered {
                Some(content) => content,
                None => {
                    warn!(schema = %decl.identity(), "Skipping deprecated schema");
                    plan.skipped_deprecated += 1;
                    continue;
                }
            };

            let mut path = decl.package.segments().to_vec();
            path.push(names::doc_file_name(decl, self.format));

            // case-insensitive filesystems would merge these
            let owner_key: Vec<String> = path.iter().map(|s| s.to_lowercase()).collect();
            if let Some(previous) = owners.insert(owner_key, decl.identity()) {
                return Err(DocError::Render {
                    schema: decl.origin.full_name(),
                    package: decl.package.to_string(),
                    message: format!("output file {} is also produced by {}", path.join("/"), previous),
                });
            }

            debug!(schema = %decl.identity(), path = %path.join("/"), ?kind, "Rendered document");
            plan.docs.push(RenderedDoc { path, content, kind });
        }

        Ok(plan)
    }
}

// =============================================================================
// Target Handling
// =============================================================================

fn check_target(target: &Path, package: &Path, policy: TargetPolicy) -> Result<()> {
    // clearing the target must never reach the sources, whatever the policy
    if let (Ok(target_abs), Ok(package_abs)) = (target.canonicalize(), package.canonicalize()) {
        if package_abs.starts_with(&target_abs) {
            return Err(DocError::TargetContainsPackage {
                target: target.to_path_buf(),
                package: package.to_path_buf(),
            });
        }
    }

    if policy == TargetPolicy::Force || !target.exists() {
        return Ok(());
    }
    if !target.is_dir() {
        return Err(DocError::TargetNotOwned {
            path: target.to_path_buf(),
        });
    }

    let is_empty = fs::read_dir(target)
        .map_err(|e| DocError::io(target, e))?
        .next()
        .is_none();
    if is_empty || target.join(MANIFEST_FILE_NAME).is_file() {
        Ok(())
    } else {
        Err(DocError::TargetNotOwned {
            path: target.to_path_buf(),
        })
    }
}

fn reset_target(target: &Path) -> Result<()> {
    if target.is_dir() {
        debug!(target = %target.display(), "Clearing previous output");
        fs::remove_dir_all(target).map_err(|e| DocError::io(target, e))?;
    } else if target.exists() {
        fs::remove_file(target).map_err(|e| DocError::io(target, e))?;
    }
    fs::create_dir_all(target).map_err(|e| DocError::io(target, e))
}

fn write_docs(target: &Path, docs: &[RenderedDoc]) -> Result<Manifest> {
    let mut manifest = Manifest::new();
    for doc in docs {
        let path = doc.path.iter().fold(target.to_path_buf(), |path, segment| path.join(segment));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DocError::io(parent, e))?;
        }
        fs::write(&path, &doc.content).map_err(|e| DocError::io(&path, e))?;
        manifest.insert(doc.manifest_path(), doc.content.as_bytes());
    }
    Ok(manifest)
}

fn package_count(package: &KclPackage) -> usize {
    1 + package.sub_package_list.iter().map(package_count).sum::<usize>()
}
