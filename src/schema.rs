//! Schema types as emitted by the KCL extraction front-end
//!
//! These mirror the OpenAPI-flavoured JSON the front-end writes. They are
//! consumed read-only; [`crate::tree`] turns them into the classified model
//! the renderer works on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Decorator name that marks a schema or attribute as deprecated
pub const DEPRECATED_DECORATOR: &str = "deprecated";

/// One node of the schema type tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KclOpenApiType {
    /// Scalar type name, `array`, `object`, or empty for composite schemas
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Attributes, keyed by name. Iterated in lexical order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, KclOpenApiType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Element type of a list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<KclOpenApiType>>,

    /// Value type of a dict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<KclOpenApiType>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Literal values allowed for this attribute
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,

    /// Reference into the definitions map (`#/definitions/<key>`)
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(flatten)]
    pub kcl_extensions: KclExtensions,
}

impl KclOpenApiType {
    /// Model type info, present on top-level schema declarations
    pub fn model_type(&self) -> Option<&XKclModelType> {
        self.kcl_extensions.model_type.as_ref()
    }

    /// The `deprecated` decorator, if any
    pub fn deprecated_decorator(&self) -> Option<&XKclDecorator> {
        self.kcl_extensions
            .decorators
            .iter()
            .find(|d| d.name == DEPRECATED_DECORATOR)
    }
}

/// KCL specific `x-kcl-*` extensions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KclExtensions {
    #[serde(rename = "x-kcl-type", default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<XKclModelType>,

    #[serde(rename = "x-kcl-decorators", default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<XKclDecorator>,

    #[serde(rename = "x-kcl-union-types", default, skip_serializing_if = "Vec::is_empty")]
    pub union_types: Vec<KclOpenApiType>,

    #[serde(rename = "x-kcl-dict-key-type", default, skip_serializing_if = "Option::is_none")]
    pub dict_key_type: Option<Box<KclOpenApiType>>,
}

/// Provenance of a schema declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XKclModelType {
    /// Declared schema name in its origin package
    #[serde(rename = "type")]
    pub type_name: String,

    pub import: KclModelImportInfo,
}

/// Origin package and source file of a schema declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KclModelImportInfo {
    /// Dotted package path (e.g. `models` or `app.models`)
    pub package: String,

    /// Source file name inside the package (e.g. `person.k`)
    pub alias: String,
}

/// A decorator attached to a schema or attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XKclDecorator {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub keywords: BTreeMap<String, String>,
}

/// A definitions document, one per front-end output file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KclDefinitions {
    #[serde(default)]
    pub definitions: BTreeMap<String, KclOpenApiType>,
}

/// A package and its sub-packages as loaded from disk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KclPackage {
    /// Path segments relative to the documented root (empty for the root)
    pub path: Vec<String>,

    /// `(definition key, schema)` pairs in load order
    pub schema_list: Vec<(String, KclOpenApiType)>,

    /// Sub-packages in lexical name order
    pub sub_package_list: Vec<KclPackage>,
}

impl KclPackage {
    /// Dotted package name, empty for the root package
    pub fn name(&self) -> String {
        self.path.join(".")
    }

    /// Total number of schema declarations in this package and below
    pub fn schema_count(&self) -> usize {
        self.schema_list.len()
            + self
                .sub_package_list
                .iter()
                .map(KclPackage::schema_count)
                .sum::<usize>()
    }
}
