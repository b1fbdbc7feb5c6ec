//! Schema Type Tree
//!
//! The classified, render-ready view of one generation run:
//! - `loader`: reads the front-end's definitions documents into a [`KclPackage`] tree
//! - `classify`: lowers raw `KclOpenApiType` nodes into [`SchemaDecl`]s
//! - `dedup`: partitions declarations into canonical schemas and re-exports
//!
//! Declarations are kept in a single traversal order (package pre-order,
//! schemas sorted by name inside a package). That order is used for display,
//! file naming and deduplication alike.

pub mod classify;
pub mod dedup;
pub mod loader;

pub use classify::{classify_declaration, DefinitionIndex};
pub use dedup::{ImportPartition, OriginKey, Role};
pub use loader::{load_package, LoadConfig};

use std::fmt;

use crate::error::Result;
use crate::schema::KclPackage;

// =============================================================================
// Package Path
// =============================================================================

/// Location of a package relative to the documented root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackagePath(Vec<String>);

impl PackagePath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Parse a dotted package name (`a.b`); the empty string is the root
    pub fn from_dotted(name: &str) -> Self {
        Self(
            name.split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn dotted(&self) -> String {
        self.0.join(".")
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0.join("/"))
        }
    }
}

// =============================================================================
// Origin
// =============================================================================

/// Where a schema was originally declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Dotted origin package
    pub package: String,
    /// Source file name inside the origin package
    pub alias: String,
    /// Declared name in the origin package
    pub type_name: String,
}

impl Origin {
    /// `package.TypeName`, or just the type name for the root package
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.type_name.clone()
        } else {
            format!("{}.{}", self.package, self.type_name)
        }
    }

    pub fn key(&self) -> OriginKey {
        OriginKey {
            package: self.package.clone(),
            type_name: self.type_name.clone(),
        }
    }
}

// =============================================================================
// Declarations
// =============================================================================

/// A `deprecated` decorator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deprecation {
    pub since: Option<String>,
    pub reason: Option<String>,
}

/// Language-agnostic attribute type
#[derive(Debug, Clone, PartialEq)]
pub enum AttrType {
    /// Scalar type name in KCL spelling (`str`, `int`, ...)
    Scalar(String),
    /// Union of literal values, already in KCL literal spelling
    Literal(Vec<String>),
    List(Box<AttrType>),
    Dict { key: Box<AttrType>, value: Box<AttrType> },
    Union(Vec<AttrType>),
    /// Reference to a named schema, by its label
    SchemaRef(String),
    /// Anonymous composite whose attributes are documented in place
    Inline(Vec<Attribute>),
    Any,
}

/// One attribute of a schema
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub ty: AttrType,
    pub required: bool,
    pub description: String,
    /// Default value in KCL literal spelling
    pub default: Option<String>,
    pub deprecated: Option<Deprecation>,
}

/// One schema declaration as seen in its declaring package
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDecl {
    /// Package that declares (or re-exports) the schema
    pub package: PackagePath,
    /// Key in the definitions document
    pub key: String,
    /// Exported name, also used for the output file name
    pub name: String,
    pub origin: Origin,
    pub description: String,
    pub attributes: Vec<Attribute>,
    pub deprecated: Option<Deprecation>,
}

impl SchemaDecl {
    /// Identity used in error messages
    pub fn identity(&self) -> String {
        format!("{} (declared in {})", self.origin.full_name(), self.package)
    }

    /// Whether this declaration lives in the package it originates from
    pub fn is_in_origin_package(&self) -> bool {
        self.package.dotted() == self.origin.package
    }
}

// =============================================================================
// Schema Tree
// =============================================================================

/// All declarations of one generation run, in traversal order
#[derive(Debug, Clone, Default)]
pub struct SchemaTree {
    decls: Vec<SchemaDecl>,
}

impl SchemaTree {
    /// Classify every declaration under `root`.
    ///
    /// Packages are visited pre-order; `$ref`s resolve against the
    /// definitions of the whole run, not just the declaring package.
    pub fn from_package(root: &KclPackage) -> Result<Self> {
        let index = DefinitionIndex::build(root);
        let mut decls = Vec::with_capacity(root.schema_count());
        collect_package(root, &index, &mut decls)?;
        Ok(Self { decls })
    }

    pub fn decls(&self) -> &[SchemaDecl] {
        &self.decls
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

fn collect_package(
    package: &KclPackage,
    index: &DefinitionIndex<'_>,
    decls: &mut Vec<SchemaDecl>,
) -> Result<()> {
    let path = PackagePath::new(package.path.clone());

    let mut local = package
        .schema_list
        .iter()
        .map(|(key, schema)| classify_declaration(key, schema, &path, index))
        .collect::<Result<Vec<_>>>()?;
    local.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));
    decls.extend(local);

    let mut subs: Vec<&KclPackage> = package.sub_package_list.iter().collect();
    subs.sort_by(|a, b| a.path.cmp(&b.path));
    for sub in subs {
        collect_package(sub, index, decls)?;
    }
    Ok(())
}
