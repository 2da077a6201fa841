//! Declarative attribute schemas
//!
//! A schema describes the attributes of a resource or data source. It is
//! rendered by the `schema` command and used to validate a configuration
//! document (and fill in defaults) before it reaches an adapter.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::diagnostics::Diagnostics;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Number,
    /// String holding a JSON document
    Json,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(BTreeMap<String, Attribute>),
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Required,
    Optional,
    Computed,
    OptionalComputed,
}

impl Constraint {
    fn accepts_config(self) -> bool {
        !matches!(self, Constraint::Computed)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    pub description: String,
    pub constraint: Constraint,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub requires_replace: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<String>,
}

impl Attribute {
    fn new(attr_type: AttributeType, description: &str) -> Self {
        Self {
            attr_type,
            description: description.to_string(),
            constraint: Constraint::Optional,
            sensitive: false,
            default: None,
            requires_replace: false,
            one_of: Vec::new(),
            conflicts_with: Vec::new(),
        }
    }

    pub fn string(description: &str) -> Self {
        Self::new(AttributeType::String, description)
    }

    pub fn bool(description: &str) -> Self {
        Self::new(AttributeType::Bool, description)
    }

    pub fn number(description: &str) -> Self {
        Self::new(AttributeType::Number, description)
    }

    pub fn json(description: &str) -> Self {
        Self::new(AttributeType::Json, description)
    }

    pub fn string_list(description: &str) -> Self {
        Self::new(AttributeType::List(Box::new(AttributeType::String)), description)
    }

    pub fn map(value_type: AttributeType, description: &str) -> Self {
        Self::new(AttributeType::Map(Box::new(value_type)), description)
    }

    pub fn object(attributes: BTreeMap<String, Attribute>, description: &str) -> Self {
        Self::new(AttributeType::Object(attributes), description)
    }

    pub fn object_list(attributes: BTreeMap<String, Attribute>, description: &str) -> Self {
        Self::new(
            AttributeType::List(Box::new(AttributeType::Object(attributes))),
            description,
        )
    }

    pub fn required(mut self) -> Self {
        self.constraint = Constraint::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.constraint = Constraint::Optional;
        self
    }

    pub fn computed(mut self) -> Self {
        self.constraint = Constraint::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.constraint = Constraint::OptionalComputed;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.one_of = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn conflicts_with(mut self, attributes: &[&str]) -> Self {
        self.conflicts_with = attributes.iter().map(|a| a.to_string()).collect();
        self
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Schema {
    pub description: String,
    pub version: u32,
    pub attributes: BTreeMap<String, Attribute>,
}

/// Build an attribute map from `(name, attribute)` pairs
pub fn attributes<I>(items: I) -> BTreeMap<String, Attribute>
where
    I: IntoIterator<Item = (&'static str, Attribute)>,
{
    items
        .into_iter()
        .map(|(name, attr)| (name.to_string(), attr))
        .collect()
}

impl Schema {
    pub fn new<I>(description: &str, items: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Attribute)>,
    {
        Self {
            description: description.to_string(),
            version: 0,
            attributes: attributes(items),
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Attribute names whose change forces a new resource
    pub fn replace_triggers(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, a)| a.requires_replace)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Validate a configuration document, then fill in defaults for unset
    /// attributes. Problems are reported as attribute diagnostics.
    pub fn validate_config(&self, config: &mut Value, diags: &mut Diagnostics) {
        let Some(obj) = config.as_object_mut() else {
            diags.error(
                "Invalid configuration",
                "Expected a JSON object holding the attribute values",
            );
            return;
        };

        validate_object(&self.attributes, obj, "", diags);

        if diags.has_error() {
            return;
        }

        for (name, attr) in &self.attributes {
            if let Some(default) = &attr.default {
                let unset = obj.get(name).map(Value::is_null).unwrap_or(true);
                if unset {
                    obj.insert(name.clone(), default.clone());
                }
            }
        }
    }
}

fn attribute_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn validate_object(
    schema: &BTreeMap<String, Attribute>,
    obj: &Map<String, Value>,
    prefix: &str,
    diags: &mut Diagnostics,
) {
    for key in obj.keys() {
        if !schema.contains_key(key) {
            diags.attribute_error(
                attribute_path(prefix, key),
                "Unsupported argument",
                format!("An argument named \"{}\" is not expected here.", key),
            );
        }
    }

    for (name, attr) in schema {
        let path = attribute_path(prefix, name);
        let value = obj.get(name).filter(|v| !v.is_null());

        match (attr.constraint, value) {
            (Constraint::Required, None) => diags.attribute_error(
                &path,
                "Missing required argument",
                format!("The argument \"{}\" is required, but no definition was found.", name),
            ),
            (c, Some(v)) if c.accepts_config() => {
                validate_value(&attr.attr_type, v, &path, diags);
                validate_one_of(attr, v, &path, diags);
                for other in &attr.conflicts_with {
                    if obj.get(other).is_some_and(|o| !o.is_null()) {
                        diags.attribute_error(
                            &path,
                            "Invalid Attribute Combination",
                            format!(
                                "Attribute \"{}\" cannot be specified when \"{}\" is specified",
                                attribute_path(prefix, other),
                                path
                            ),
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

fn validate_one_of(attr: &Attribute, value: &Value, path: &str, diags: &mut Diagnostics) {
    if attr.one_of.is_empty() {
        return;
    }
    if let Some(s) = value.as_str() {
        if !attr.one_of.iter().any(|v| v == s) {
            diags.attribute_error(
                path,
                "Invalid Attribute Value Match",
                format!("Attribute {} value must be one of: {:?}, got: \"{}\"", path, attr.one_of, s),
            );
        }
    }
}

fn validate_value(attr_type: &AttributeType, value: &Value, path: &str, diags: &mut Diagnostics) {
    let mismatch = |diags: &mut Diagnostics, expected: &str| {
        diags.attribute_error(
            path,
            "Incorrect attribute value type",
            format!("Inappropriate value for attribute \"{}\": {} required.", path, expected),
        )
    };

    match attr_type {
        AttributeType::String if !value.is_string() => mismatch(diags, "string"),
        AttributeType::Bool if !value.is_boolean() => mismatch(diags, "bool"),
        AttributeType::Number if !value.is_number() => mismatch(diags, "number"),
        AttributeType::Json => match value.as_str() {
            Some(text) => {
                if let Err(e) = serde_json::from_str::<Value>(text) {
                    diags.attribute_error(
                        path,
                        "Invalid JSON String Value",
                        format!("A string value was provided that is not valid JSON string format (RFC 7159): {}", e),
                    );
                }
            }
            None => mismatch(diags, "JSON string"),
        },
        AttributeType::List(inner) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    validate_value(inner, item, &format!("{}[{}]", path, i), diags);
                }
            }
            None => mismatch(diags, "list"),
        },
        AttributeType::Map(inner) => match value.as_object() {
            Some(entries) => {
                for (k, v) in entries {
                    validate_value(inner, v, &format!("{}[\"{}\"]", path, k), diags);
                }
            }
            None => mismatch(diags, "map"),
        },
        AttributeType::Object(nested) => match value.as_object() {
            Some(obj) => validate_object(nested, obj, path, diags),
            None => mismatch(diags, "object"),
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(
            "test",
            [
                ("id", Attribute::string("ID").computed()),
                ("name", Attribute::string("Name").required().requires_replace()),
                ("enabled", Attribute::bool("Enabled").optional_computed().default_value(json!(true))),
                ("template", Attribute::json("Template").optional()),
                ("mode", Attribute::string("Mode").optional().one_of(&["A", "B"])),
                ("tags", Attribute::string_list("Tags").optional_computed().default_value(json!([]))),
                (
                    "steps",
                    Attribute::object_list(
                        attributes([
                            ("type", Attribute::string("Type").required()),
                            ("directory", Attribute::string("Dir").optional().conflicts_with(&["bucket"])),
                            ("bucket", Attribute::string("Bucket").optional()),
                        ]),
                        "Steps",
                    )
                    .optional(),
                ),
            ],
        )
    }

    #[test]
    fn test_defaults_are_applied() {
        let mut config = json!({"name": "x"});
        let mut diags = Diagnostics::new();
        schema().validate_config(&mut config, &mut diags);
        assert!(!diags.has_error());
        assert_eq!(config["enabled"], json!(true));
        assert_eq!(config["tags"], json!([]));
        assert!(config.get("template").is_none());
    }

    #[test]
    fn test_explicit_values_are_kept() {
        let mut config = json!({"name": "x", "enabled": false});
        let mut diags = Diagnostics::new();
        schema().validate_config(&mut config, &mut diags);
        assert_eq!(config["enabled"], json!(false));
    }

    #[test]
    fn test_missing_required() {
        let mut config = json!({});
        let mut diags = Diagnostics::new();
        schema().validate_config(&mut config, &mut diags);
        let d = diags.errors().next().unwrap();
        assert_eq!(d.attribute.as_deref(), Some("name"));
        assert_eq!(d.summary, "Missing required argument");
    }

    #[test]
    fn test_unknown_attribute() {
        let mut config = json!({"name": "x", "nope": 1});
        let mut diags = Diagnostics::new();
        schema().validate_config(&mut config, &mut diags);
        assert!(diags.has_error());
    }

    #[test]
    fn test_type_mismatch_and_invalid_json() {
        let mut config = json!({"name": 1, "template": "{not json"});
        let mut diags = Diagnostics::new();
        schema().validate_config(&mut config, &mut diags);
        assert_eq!(diags.errors().count(), 2);
    }

    #[test]
    fn test_one_of() {
        let mut config = json!({"name": "x", "mode": "C"});
        let mut diags = Diagnostics::new();
        schema().validate_config(&mut config, &mut diags);
        assert_eq!(diags.errors().next().unwrap().attribute.as_deref(), Some("mode"));
    }

    #[test]
    fn test_nested_conflicts() {
        let mut config = json!({
            "name": "x",
            "steps": [{"type": "t", "directory": "/a", "bucket": "b"}]
        });
        let mut diags = Diagnostics::new();
        schema().validate_config(&mut config, &mut diags);
        let d = diags.errors().next().unwrap();
        assert_eq!(d.attribute.as_deref(), Some("steps[0].directory"));
        assert_eq!(d.summary, "Invalid Attribute Combination");
    }

    #[test]
    fn test_computed_only_values_are_ignored() {
        let mut config = json!({"name": "x", "id": 42});
        let mut diags = Diagnostics::new();
        schema().validate_config(&mut config, &mut diags);
        assert!(!diags.has_error());
    }

    #[test]
    fn test_replace_triggers() {
        assert_eq!(schema().replace_triggers(), vec!["name"]);
    }
}
