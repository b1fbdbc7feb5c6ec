//! Naming and linking
//!
//! Type tokens, document file names and the link targets embedded in
//! generated documents. Link targets honour the platform separator.

use super::config::{Format, Platform};
use crate::tree::{AttrType, Origin, PackagePath, SchemaDecl};

/// Token displayed for an attribute type (`str`, `[int]`, `{str:str}`, ...)
pub fn type_token(ty: &AttrType) -> String {
    match ty {
        AttrType::Scalar(name) => name.clone(),
        AttrType::Literal(values) => values.join(" | "),
        AttrType::List(items) => format!("[{}]", type_token(items)),
        AttrType::Dict { key, value } => format!("{{{}:{}}}", type_token(key), type_token(value)),
        AttrType::Union(members) => members.iter().map(type_token).collect::<Vec<_>>().join(" | "),
        AttrType::SchemaRef(label) => label.clone(),
        AttrType::Inline(_) => "object".to_string(),
        AttrType::Any => "any".to_string(),
    }
}

/// File name of the document for `decl`
pub fn doc_file_name(decl: &SchemaDecl, format: Format) -> String {
    format!("{}.{}", decl.name, format.extension())
}

/// Link to the source file of a schema: origin package directories + alias
pub fn source_link(origin: &Origin, platform: Platform) -> String {
    let package = PackagePath::from_dotted(&origin.package);
    let mut segments: Vec<&str> = package.segments().iter().map(String::as_str).collect();
    segments.push(&origin.alias);
    platform.join(&segments)
}

/// Relative link from a document in package `from` to `file_name` in package `to`
pub fn relative_link(from: &PackagePath, to: &PackagePath, file_name: &str, platform: Platform) -> String {
    let common = from
        .segments()
        .iter()
        .zip(to.segments())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = Vec::new();
    segments.extend(std::iter::repeat("..").take(from.segments().len() - common));
    segments.extend(to.segments()[common..].iter().map(String::as_str));
    segments.push(file_name);
    platform.join(&segments)
}
