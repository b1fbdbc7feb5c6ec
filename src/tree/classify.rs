//! Type Classification
//!
//! Lowers raw [`KclOpenApiType`] nodes into [`SchemaDecl`]s. All structural
//! checks happen here so the renderer never has to inspect raw schemas:
//! - top-level declarations must carry `x-kcl-type`
//! - every `required` name must be a declared property
//! - property types become [`AttrType`] variants

use std::collections::HashMap;

use super::{AttrType, Attribute, Deprecation, Origin, PackagePath, SchemaDecl};
use crate::error::{DocError, Result};
use crate::schema::{KclOpenApiType, KclPackage, XKclDecorator};

const DEFINITIONS_PREFIX: &str = "#/definitions/";

// =============================================================================
// Definition Index
// =============================================================================

/// Every definition of a run, keyed by definitions key, for `$ref` lookups
#[derive(Debug, Default)]
pub struct DefinitionIndex<'a> {
    by_key: HashMap<&'a str, &'a KclOpenApiType>,
}

impl<'a> DefinitionIndex<'a> {
    pub fn build(root: &'a KclPackage) -> Self {
        let mut index = Self::default();
        index.add_package(root);
        index
    }

    fn add_package(&mut self, package: &'a KclPackage) {
        for (key, schema) in &package.schema_list {
            // first declaration wins, matching traversal order
            self.by_key.entry(key.as_str()).or_insert(schema);
        }
        for sub in &package.sub_package_list {
            self.add_package(sub);
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a KclOpenApiType> {
        self.by_key.get(key).copied()
    }

    /// Label for a `$ref`: the origin full name when the target is known
    fn ref_label(&self, reference: &str) -> String {
        let key = reference.strip_prefix(DEFINITIONS_PREFIX).unwrap_or(reference);
        self.get(key)
            .and_then(|target| target.model_type())
            .map(|model| origin_label(&model.import.package, &model.type_name))
            .unwrap_or_else(|| key.to_string())
    }
}

// =============================================================================
// Declarations
// =============================================================================

/// Classify one top-level declaration found under `key` in `package`
pub fn classify_declaration(
    key: &str,
    schema: &KclOpenApiType,
    package: &PackagePath,
    index: &DefinitionIndex<'_>,
) -> Result<SchemaDecl> {
    let model = schema.model_type().ok_or_else(|| {
        DocError::extraction(
            format!("{} (declared in {})", key, package),
            "top-level schema has no x-kcl-type extension",
        )
    })?;

    if model.type_name.is_empty() {
        return Err(DocError::extraction(
            format!("{} (declared in {})", key, package),
            "x-kcl-type has an empty type name",
        ));
    }

    let origin = Origin {
        package: model.import.package.clone(),
        alias: model.import.alias.clone(),
        type_name: model.type_name.clone(),
    };

    let attributes = classify_attributes(schema, index, "").map_err(|message| {
        DocError::extraction(format!("{} (declared in {})", origin.full_name(), package), message)
    })?;

    Ok(SchemaDecl {
        package: package.clone(),
        key: key.to_string(),
        name: model.type_name.clone(),
        origin,
        description: normalize_text(&schema.description),
        attributes,
        deprecated: schema.deprecated_decorator().map(deprecation),
    })
}

/// Classify the properties of a composite node, in lexical name order.
///
/// `prefix` is the dotted path of the owner, used in error messages.
fn classify_attributes(
    schema: &KclOpenApiType,
    index: &DefinitionIndex<'_>,
    prefix: &str,
) -> std::result::Result<Vec<Attribute>, String> {
    if let Some(missing) = schema
        .required
        .iter()
        .find(|name| !schema.properties.contains_key(*name))
    {
        return Err(format!(
            "required attribute '{}{}' is not a declared property",
            prefix, missing
        ));
    }

    schema
        .properties
        .iter()
        .map(|(name, property)| {
            let path = format!("{}{}.", prefix, name);
            Ok(Attribute {
                name: name.clone(),
                ty: classify_type(property, index, &path)?,
                required: schema.required.contains(name),
                description: normalize_text(&property.description),
                default: property.default.as_ref().map(kcl_literal),
                deprecated: property.deprecated_decorator().map(deprecation),
            })
        })
        .collect()
}

/// Classify a property type into its tagged variant
fn classify_type(
    node: &KclOpenApiType,
    index: &DefinitionIndex<'_>,
    path: &str,
) -> std::result::Result<AttrType, String> {
    if let Some(reference) = &node.reference {
        return Ok(AttrType::SchemaRef(index.ref_label(reference)));
    }

    let extensions = &node.kcl_extensions;
    if !extensions.union_types.is_empty() {
        let members = extensions
            .union_types
            .iter()
            .map(|member| classify_type(member, index, path))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        return Ok(AttrType::Union(members));
    }

    if !node.enum_values.is_empty() {
        return Ok(AttrType::Literal(node.enum_values.iter().map(kcl_literal).collect()));
    }

    if let Some(model) = node.model_type() {
        return Ok(AttrType::SchemaRef(origin_label(
            &model.import.package,
            &model.type_name,
        )));
    }

    let ty = match node.type_name.as_str() {
        "string" => AttrType::Scalar("str".to_string()),
        "integer" => AttrType::Scalar("int".to_string()),
        "number" => AttrType::Scalar("float".to_string()),
        "boolean" => AttrType::Scalar("bool".to_string()),
        "null" => AttrType::Scalar("None".to_string()),
        "array" => {
            let items = match &node.items {
                Some(items) => classify_type(items, index, path)?,
                None => AttrType::Any,
            };
            AttrType::List(Box::new(items))
        }
        "object" | "" if node.additional_properties.is_some() => classify_dict(node, index, path)?,
        "object" | "" if !node.properties.is_empty() => {
            AttrType::Inline(classify_attributes(node, index, path)?)
        }
        "object" => AttrType::Dict {
            key: Box::new(AttrType::Scalar("str".to_string())),
            value: Box::new(AttrType::Any),
        },
        "" => AttrType::Any,
        other => AttrType::Scalar(other.to_string()),
    };
    Ok(ty)
}

fn classify_dict(
    node: &KclOpenApiType,
    index: &DefinitionIndex<'_>,
    path: &str,
) -> std::result::Result<AttrType, String> {
    let key = match &node.kcl_extensions.dict_key_type {
        Some(key) => classify_type(key, index, path)?,
        None => AttrType::Scalar("str".to_string()),
    };
    let value = match &node.additional_properties {
        Some(value) => classify_type(value, index, path)?,
        None => AttrType::Any,
    };
    Ok(AttrType::Dict {
        key: Box::new(key),
        value: Box::new(value),
    })
}

// =============================================================================
// Helpers
// =============================================================================

fn origin_label(package: &str, type_name: &str) -> String {
    if package.is_empty() {
        type_name.to_string()
    } else {
        format!("{}.{}", package, type_name)
    }
}

fn deprecation(decorator: &XKclDecorator) -> Deprecation {
    let keyword = |name: &str| {
        decorator
            .keywords
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
    };
    Deprecation {
        since: keyword("version"),
        reason: keyword("reason"),
    }
}

/// Normalize line endings so the platform axis is applied exactly once
fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n").trim_end().to_string()
}

/// Spell a JSON value the way KCL source would
pub fn kcl_literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "None".to_string(),
        serde_json::Value::Bool(true) => "True".to_string(),
        serde_json::Value::Bool(false) => "False".to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(_) => value.to_string(),
        serde_json::Value::Array(items) => {
            let items: Vec<String> = items.iter().map(kcl_literal).collect();
            format!("[{}]", items.join(", "))
        }
        serde_json::Value::Object(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", serde_json::Value::from(k.as_str()), kcl_literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{KclModelImportInfo, XKclModelType};
    use serde_json::json;

    fn parse(value: serde_json::Value) -> KclOpenApiType {
        serde_json::from_value(value).unwrap()
    }

    fn person() -> KclOpenApiType {
        parse(json!({
            "type": "object",
            "description": "Description of Schema Person",
            "properties": {
                "name": {"type": "string", "description": "name of the person"},
                "age": {"type": "integer"}
            },
            "required": ["name"],
            "x-kcl-type": {"type": "Person", "import": {"package": "models", "alias": "person.k"}}
        }))
    }

    fn classify(schema: &KclOpenApiType) -> Result<SchemaDecl> {
        let index = DefinitionIndex::default();
        classify_declaration("models.Person", schema, &PackagePath::from_dotted("models"), &index)
    }

    #[test]
    fn test_classify_person() {
        let decl = classify(&person()).unwrap();

        assert_eq!(decl.name, "Person");
        assert_eq!(decl.origin.full_name(), "models.Person");
        assert!(decl.is_in_origin_package());
        // lexical order
        let names: Vec<_> = decl.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["age", "name"]);
        assert!(!decl.attributes[0].required);
        assert!(decl.attributes[1].required);
        assert_eq!(decl.attributes[1].ty, AttrType::Scalar("str".to_string()));
        assert_eq!(decl.attributes[0].ty, AttrType::Scalar("int".to_string()));
    }

    #[test]
    fn test_dangling_required_is_rejected() {
        let mut schema = person();
        schema.required.push("email".to_string());

        let err = classify(&schema).unwrap_err();
        match err {
            DocError::Extraction { schema, message } => {
                assert!(schema.starts_with("models.Person"));
                assert!(message.contains("'email'"));
            }
            other => panic!("Expected Extraction error, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_required_in_inline_attribute() {
        let mut schema = person();
        schema.properties.insert(
            "meta".to_string(),
            parse(json!({"type": "object", "properties": {"team": {"type": "string"}}, "required": ["owner"]})),
        );

        let err = classify(&schema).unwrap_err();
        assert!(err.to_string().contains("'meta.owner'"), "{}", err);
    }

    #[test]
    fn test_missing_model_type() {
        let mut schema = person();
        schema.kcl_extensions.model_type = None;
        assert!(matches!(classify(&schema), Err(DocError::Extraction { .. })));
    }

    #[test]
    fn test_classify_composite_types() {
        let index = DefinitionIndex::default();
        let cases = [
            (json!({"type": "array", "items": {"type": "integer"}}), "[int]"),
            (json!({"type": "array"}), "[any]"),
            (
                json!({"type": "object", "additionalProperties": {"type": "number"}, "x-kcl-dict-key-type": {"type": "string"}}),
                "{str:float}",
            ),
            (json!({"type": "object"}), "{str:any}"),
            (json!({"type": "string", "enum": ["TCP", "UDP"]}), "\"TCP\" | \"UDP\""),
            (json!({"x-kcl-union-types": [{"type": "string"}, {"type": "integer"}]}), "str | int"),
            (json!({"$ref": "#/definitions/models.Missing"}), "models.Missing"),
            (json!({"type": "str"}), "str"),
            (json!({}), "any"),
        ];

        for (node, expected) in cases {
            let ty = classify_type(&parse(node), &index, "x.").unwrap();
            assert_eq!(crate::render::names::type_token(&ty), expected);
        }
    }

    #[test]
    fn test_ref_resolves_to_origin_name() {
        let mut target = KclOpenApiType::default();
        target.kcl_extensions.model_type = Some(XKclModelType {
            type_name: "Person".to_string(),
            import: KclModelImportInfo {
                package: "models".to_string(),
                alias: "person.k".to_string(),
            },
        });
        let root = KclPackage {
            path: vec!["app".to_string()],
            schema_list: vec![("app.Person".to_string(), target)],
            sub_package_list: Vec::new(),
        };
        let index = DefinitionIndex::build(&root);

        let ty = classify_type(&parse(json!({"$ref": "#/definitions/app.Person"})), &index, "").unwrap();
        assert_eq!(ty, AttrType::SchemaRef("models.Person".to_string()));
    }

    #[test]
    fn test_inline_object_is_nested() {
        let index = DefinitionIndex::default();
        let node = parse(json!({
            "type": "object",
            "properties": {"team": {"type": "string", "description": "owning team"}},
            "required": ["team"]
        }));

        match classify_type(&node, &index, "meta.").unwrap() {
            AttrType::Inline(attributes) => {
                assert_eq!(attributes.len(), 1);
                assert!(attributes[0].required);
                assert_eq!(attributes[0].description, "owning team");
            }
            other => panic!("Expected Inline, got {:?}", other),
        }
    }

    #[test]
    fn test_deprecation_keywords() {
        let mut schema = person();
        schema.kcl_extensions.decorators.push(XKclDecorator {
            name: "deprecated".to_string(),
            arguments: Vec::new(),
            keywords: [("version".to_string(), "1.2".to_string())].into_iter().collect(),
        });

        let decl = classify(&schema).unwrap();
        assert_eq!(
            decl.deprecated,
            Some(Deprecation {
                since: Some("1.2".to_string()),
                reason: None
            })
        );
    }

    #[test]
    fn test_kcl_literal() {
        assert_eq!(kcl_literal(&json!("TCP")), "\"TCP\"");
        assert_eq!(kcl_literal(&json!(true)), "True");
        assert_eq!(kcl_literal(&json!(null)), "None");
        assert_eq!(kcl_literal(&json!(8080)), "8080");
        assert_eq!(kcl_literal(&json!([1, "a"])), "[1, \"a\"]");
        assert_eq!(kcl_literal(&json!({"k": false})), "{\"k\": False}");
    }

    #[test]
    fn test_description_line_endings_normalized() {
        let mut schema = person();
        schema.description = "first\r\nsecond\r\n".to_string();
        let decl = classify(&schema).unwrap();
        assert_eq!(decl.description, "first\nsecond");
    }
}
