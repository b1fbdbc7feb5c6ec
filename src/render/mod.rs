//! Schema Rendering
//!
//! Architecture:
//! - [`SchemaRenderer`]: owns the section order (title, deprecation,
//!   description, attributes, source files) for every format
//! - [`DocumentBuilder`]: format-specific markup, one implementation per [`Format`]
//! - `names`: type tokens and link targets
//!
//! Builders write `\n` line endings; the renderer converts them to the
//! target platform once the document is complete.

pub mod config;
pub mod html;
pub mod markdown;
pub mod names;

pub use config::{Format, Platform, RenderProfile};
pub use html::HtmlBuilder;
pub use markdown::MarkdownBuilder;

use crate::error::{DocError, Result};
use crate::tree::{Attribute, AttrType, Deprecation, SchemaDecl};

// =============================================================================
// Document Builder
// =============================================================================

/// Format-specific markup for the sections of a schema document.
///
/// `depth` is 0 for the attributes of the schema itself and grows by one for
/// every inline object the attribute list is nested in.
pub trait DocumentBuilder {
    fn title(&mut self, name: &str);
    fn deprecation(&mut self, deprecation: &Deprecation);
    fn description(&mut self, text: &str);

    /// Open an attribute list; `owner` names the attribute for nested lists
    fn begin_attributes(&mut self, depth: usize, owner: Option<&str>);
    fn attribute_header(&mut self, depth: usize, name: &str, required: bool, deprecated: bool);
    fn type_token(&mut self, depth: usize, token: &str);
    fn attribute_description(&mut self, depth: usize, text: &str);
    fn default_value(&mut self, depth: usize, literal: &str);
    fn end_attributes(&mut self, depth: usize);

    fn source_files(&mut self, label: &str, link: &str);

    /// Body of a re-export document pointing at the canonical one
    fn reference(&mut self, label: &str, link: &str);

    /// Take the document text, leaving the builder empty
    fn finish(&mut self) -> String;
}

/// Create the builder for `profile.format`
pub fn new_builder(profile: &RenderProfile) -> Box<dyn DocumentBuilder> {
    match profile.format {
        Format::Markdown => Box::new(MarkdownBuilder::new(profile.escape_html)),
        Format::Html => Box::new(HtmlBuilder::new()),
    }
}

// =============================================================================
// Schema Renderer
// =============================================================================

/// Renders classified schema declarations into document bodies
#[derive(Debug, Clone, Copy)]
pub struct SchemaRenderer {
    profile: RenderProfile,
}

impl SchemaRenderer {
    pub fn new(profile: RenderProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &RenderProfile {
        &self.profile
    }

    /// Whether `decl` produces no document under this profile
    pub fn is_suppressed(&self, decl: &SchemaDecl) -> bool {
        self.profile.ignore_deprecated && decl.deprecated.is_some()
    }

    /// Render the full document for a canonical declaration.
    ///
    /// Returns `None` for deprecated schemas when deprecated output is ignored.
    pub fn render(&self, decl: &SchemaDecl) -> Result<Option<String>> {
        if self.is_suppressed(decl) {
            return Ok(None);
        }
        self.validate(decl)?;

        let mut builder = new_builder(&self.profile);
        builder.title(&decl.name);
        if let Some(deprecation) = &decl.deprecated {
            builder.deprecation(deprecation);
        }
        if !decl.description.is_empty() {
            builder.description(&decl.description);
        }
        self.render_attributes(builder.as_mut(), &decl.attributes, 0, None);

        let link = names::source_link(&decl.origin, self.profile.platform);
        builder.source_files(&decl.origin.full_name(), &link);

        Ok(Some(self.profile.platform.apply_line_endings(builder.finish())))
    }

    /// Render the reference document written at a re-export site
    pub fn render_reference(&self, alias: &SchemaDecl, canonical: &SchemaDecl) -> Result<Option<String>> {
        if self.is_suppressed(canonical) {
            return Ok(None);
        }
        self.validate(alias)?;

        let file_name = names::doc_file_name(canonical, self.profile.format);
        let link = names::relative_link(&alias.package, &canonical.package, &file_name, self.profile.platform);

        let mut builder = new_builder(&self.profile);
        builder.title(&alias.name);
        builder.reference(&canonical.origin.full_name(), &link);

        Ok(Some(self.profile.platform.apply_line_endings(builder.finish())))
    }

    fn render_attributes(
        &self,
        builder: &mut dyn DocumentBuilder,
        attributes: &[Attribute],
        depth: usize,
        owner: Option<&str>,
    ) {
        let visible: Vec<&Attribute> = attributes
            .iter()
            .filter(|a| !(self.profile.ignore_deprecated && a.deprecated.is_some()))
            .collect();
        if visible.is_empty() {
            return;
        }

        builder.begin_attributes(depth, owner);
        for attribute in visible {
            builder.attribute_header(depth, &attribute.name, attribute.required, attribute.deprecated.is_some());
            builder.type_token(depth, &names::type_token(&attribute.ty));
            if !attribute.description.is_empty() {
                builder.attribute_description(depth, &attribute.description);
            }
            if let Some(default) = &attribute.default {
                builder.default_value(depth, default);
            }
            for (owner, nested) in inline_sections(&attribute.name, &attribute.ty) {
                self.render_attributes(builder, nested, depth + 1, Some(owner.as_str()));
            }
        }
        builder.end_attributes(depth);
    }

    fn validate(&self, decl: &SchemaDecl) -> Result<()> {
        let invalid = |message: &str| DocError::Render {
            schema: decl.origin.full_name(),
            package: decl.package.to_string(),
            message: message.to_string(),
        };

        if decl.name.contains(|c: char| c == '/' || c == '\\') || decl.name == "." || decl.name == ".." {
            return Err(invalid("schema name cannot be used as a document file name"));
        }
        if decl.origin.alias.is_empty() {
            return Err(invalid("x-kcl-type import has no source file alias"));
        }
        Ok(())
    }
}

/// Inline objects reachable from an attribute type, labelled by position:
/// `rules[]` for list items, `labels{}` for dict values, the bare name otherwise
fn inline_sections<'a>(name: &str, ty: &'a AttrType) -> Vec<(String, &'a [Attribute])> {
    let mut sections = Vec::new();
    collect_inline(name.to_string(), ty, &mut sections);
    sections
}

fn collect_inline<'a>(label: String, ty: &'a AttrType, sections: &mut Vec<(String, &'a [Attribute])>) {
    match ty {
        AttrType::Inline(attributes) => sections.push((label, attributes.as_slice())),
        AttrType::List(items) => collect_inline(format!("{}[]", label), items, sections),
        AttrType::Dict { value, .. } => collect_inline(format!("{}{{}}", label), value, sections),
        AttrType::Union(members) => {
            for member in members {
                collect_inline(label.clone(), member, sections);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Origin, PackagePath};

    fn attribute(name: &str, ty: AttrType, required: bool, description: &str) -> Attribute {
        Attribute {
            name: name.to_string(),
            ty,
            required,
            description: description.to_string(),
            default: None,
            deprecated: None,
        }
    }

    fn person() -> SchemaDecl {
        SchemaDecl {
            package: PackagePath::from_dotted("models"),
            key: "models.Person".to_string(),
            name: "Person".to_string(),
            origin: Origin {
                package: "models".to_string(),
                alias: "person.k".to_string(),
                type_name: "Person".to_string(),
            },
            description: "Description of Schema Person".to_string(),
            attributes: vec![attribute(
                "name",
                AttrType::Scalar("str".to_string()),
                true,
                "name of the person",
            )],
            deprecated: None,
        }
    }

    fn render(decl: &SchemaDecl, profile: RenderProfile) -> String {
        SchemaRenderer::new(profile).render(decl).unwrap().unwrap()
    }

    const PERSON_MD: &str = "## Schema Person\n\nDescription of Schema Person\n\n### Attributes\n\n**name** *required*\n\n`str`\n\nname of the person\n\n\n## Source Files\n\n- [models.Person](models/person.k)\n";

    #[test]
    fn test_render_markdown_unix() {
        let profile = RenderProfile::new(Format::Markdown).with_platform(Platform::Unix);
        assert_eq!(render(&person(), profile), PERSON_MD);
    }

    #[test]
    fn test_render_markdown_windows() {
        let profile = RenderProfile::new(Format::Markdown).with_platform(Platform::Windows);
        let expected = PERSON_MD
            .replace("models/person.k", "models\\person.k")
            .replace('\n', "\r\n");
        assert_eq!(render(&person(), profile), expected);
    }

    #[test]
    fn test_empty_description_and_attributes_are_omitted() {
        let mut decl = person();
        decl.description.clear();
        decl.attributes.clear();

        let profile = RenderProfile::new(Format::Markdown).with_platform(Platform::Unix);
        assert_eq!(
            render(&decl, profile),
            "## Schema Person\n\n## Source Files\n\n- [models.Person](models/person.k)\n"
        );
    }

    #[test]
    fn test_required_marker_only_on_required() {
        let mut decl = person();
        decl.attributes.push(attribute("age", AttrType::Scalar("int".to_string()), false, ""));

        let profile = RenderProfile::new(Format::Markdown).with_platform(Platform::Unix);
        let doc = render(&decl, profile);
        assert!(doc.contains("**name** *required*\n"));
        assert!(doc.contains("**age**\n\n`int`\n\n\n## Source Files"));
        assert_eq!(doc.matches("*required*").count(), 1);
    }

    #[test]
    fn test_deprecated_schema() {
        let mut decl = person();
        decl.deprecated = Some(Deprecation {
            since: Some("0.2".to_string()),
            reason: Some("use Human".to_string()),
        });

        let shown = RenderProfile::new(Format::Markdown).with_platform(Platform::Unix);
        let doc = render(&decl, shown);
        assert!(doc.starts_with("## Schema Person\n\n**Deprecated** since 0.2: use Human\n\n"));

        let hidden = shown.with_ignore_deprecated(true);
        assert!(SchemaRenderer::new(hidden).render(&decl).unwrap().is_none());
    }

    #[test]
    fn test_deprecated_attribute() {
        let mut decl = person();
        let mut old = attribute("nick", AttrType::Scalar("str".to_string()), false, "");
        old.deprecated = Some(Deprecation::default());
        decl.attributes.insert(0, old);

        let shown = RenderProfile::new(Format::Markdown).with_platform(Platform::Unix);
        assert!(render(&decl, shown).contains("**nick** *deprecated*\n"));

        let hidden = shown.with_ignore_deprecated(true);
        assert_eq!(render(&decl, hidden), PERSON_MD);
    }

    #[test]
    fn test_inline_attributes_are_nested() {
        let mut decl = person();
        decl.attributes = vec![attribute(
            "meta",
            AttrType::Inline(vec![attribute("team", AttrType::Scalar("str".to_string()), true, "owning team")]),
            false,
            "metadata",
        )];

        let profile = RenderProfile::new(Format::Markdown).with_platform(Platform::Unix);
        let doc = render(&decl, profile);
        assert!(doc.contains(
            "**meta**\n\n`object`\n\nmetadata\n\n#### Attributes of meta\n\n**team** *required*\n\n`str`\n\nowning team\n\n\n## Source Files"
        ));
    }

    fn port_object() -> AttrType {
        AttrType::Inline(vec![attribute("port", AttrType::Scalar("str".to_string()), true, "listen port")])
    }

    const PORT_SECTION: &str = "\n\n**port** *required*\n\n`str`\n\nlisten port\n\n\n## Source Files";

    #[test]
    fn test_list_item_attributes_are_nested() {
        let mut decl = person();
        decl.attributes = vec![attribute("rules", AttrType::List(Box::new(port_object())), false, "")];

        let profile = RenderProfile::new(Format::Markdown).with_platform(Platform::Unix);
        let doc = render(&decl, profile);
        assert!(doc.contains(&format!("**rules**\n\n`[object]`\n\n#### Attributes of rules[]{}", PORT_SECTION)));
    }

    #[test]
    fn test_dict_value_attributes_are_nested() {
        let mut decl = person();
        decl.attributes = vec![attribute(
            "listeners",
            AttrType::Dict {
                key: Box::new(AttrType::Scalar("str".to_string())),
                value: Box::new(port_object()),
            },
            false,
            "",
        )];

        let profile = RenderProfile::new(Format::Markdown).with_platform(Platform::Unix);
        let doc = render(&decl, profile);
        assert!(doc.contains(&format!(
            "**listeners**\n\n`{{str:object}}`\n\n#### Attributes of listeners{{}}{}",
            PORT_SECTION
        )));
    }

    #[test]
    fn test_union_member_attributes_are_nested() {
        let mut decl = person();
        decl.attributes = vec![attribute(
            "listen",
            AttrType::Union(vec![AttrType::Scalar("int".to_string()), port_object()]),
            false,
            "",
        )];

        let profile = RenderProfile::new(Format::Markdown).with_platform(Platform::Unix);
        let doc = render(&decl, profile);
        assert!(doc.contains(&format!("**listen**\n\n`int | object`\n\n#### Attributes of listen{}", PORT_SECTION)));
    }

    #[test]
    fn test_list_item_attributes_are_nested_html() {
        let mut decl = person();
        decl.attributes = vec![attribute("rules", AttrType::List(Box::new(port_object())), false, "")];

        let profile = RenderProfile::new(Format::Html).with_platform(Platform::Unix);
        let doc = render(&decl, profile);
        assert!(doc.contains(
            "<dd><code>[object]</code></dd>\n<dd>\n<h4>Attributes of rules[]</h4>\n<dl>\n<dt><strong>port</strong> <em>required</em></dt>\n"
        ));
    }

    #[test]
    fn test_default_value() {
        let mut decl = person();
        decl.attributes[0].default = Some("\"anonymous\"".to_string());

        let profile = RenderProfile::new(Format::Markdown).with_platform(Platform::Unix);
        assert!(render(&decl, profile).contains("name of the person\n\ndefault: `\"anonymous\"`\n\n"));
    }

    #[test]
    fn test_render_reference() {
        let canonical = person();
        let mut alias = person();
        alias.package = PackagePath::from_dotted("app");
        alias.key = "app.Person".to_string();

        let renderer = SchemaRenderer::new(RenderProfile::new(Format::Markdown).with_platform(Platform::Unix));
        let doc = renderer.render_reference(&alias, &canonical).unwrap().unwrap();
        assert_eq!(
            doc,
            "## Schema Person\n\nRe-exported from [models.Person](../models/Person.md)\n"
        );
    }

    #[test]
    fn test_invalid_name_is_a_render_error() {
        let mut decl = person();
        decl.name = "../Person".to_string();

        let renderer = SchemaRenderer::new(RenderProfile::default());
        match renderer.render(&decl) {
            Err(DocError::Render { schema, package, .. }) => {
                assert_eq!(schema, "models.Person");
                assert_eq!(package, "models");
            }
            other => panic!("Expected Render error, got {:?}", other),
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let renderer = SchemaRenderer::new(RenderProfile::new(Format::Html));
        let first = renderer.render(&person()).unwrap();
        let second = renderer.render(&person()).unwrap();
        assert_eq!(first, second);
    }
}
