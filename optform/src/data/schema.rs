//! Option schema entities and JSON Schema parsing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::data::types::OptionType;

/// Title of the group collecting top-level scalar properties.
pub const GENERAL_GROUP: &str = "General";

/// Errors raised while turning a schema document into an [`OptionSchema`].
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The node at `path` should be an object schema.
    #[error("schema node `{path}` is not an object")]
    NotAnObject { path: String },
    /// The node at `path` declares a type no control exists for.
    #[error("unsupported type `{type_name}` at `{path}`")]
    UnsupportedType { path: String, type_name: String },
    /// A `$ref` could not be resolved against `$defs`/`definitions`.
    #[error("unresolved reference `{reference}` at `{path}`")]
    UnresolvedRef { path: String, reference: String },
}

/// One configurable option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Unique key across schema, defaults and result.
    pub dest: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub kind: OptionType,
    /// Help text rendered next to the control.
    #[serde(default)]
    pub help: String,
    /// Schema-level default value.
    #[serde(default)]
    pub default: Option<Value>,
    /// Command-line spellings, e.g. `-u` and `--url`.
    #[serde(default)]
    pub flags: Vec<String>,
    /// Placeholder name of the value in the display name.
    #[serde(default)]
    pub metavar: Option<String>,
}

impl OptionSpec {
    pub fn new(dest: impl Into<String>, kind: OptionType) -> Self {
        Self {
            dest: dest.into(),
            kind,
            help: String::new(),
            default: None,
            flags: Vec::new(),
            metavar: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    /// Label shown in front of the control.
    ///
    /// Short flags render as `-u URL`, long flags as `--url=URL`. Boolean
    /// options take no value and show the bare flags.
    pub fn display_name(&self) -> String {
        if self.flags.is_empty() {
            return self.dest.clone();
        }

        let metavar = self
            .metavar
            .clone()
            .unwrap_or_else(|| self.dest.replace(['.', '-'], "_").to_uppercase());

        self.flags
            .iter()
            .map(|flag| {
                if self.kind == OptionType::Boolean {
                    flag.clone()
                } else if flag.starts_with("--") {
                    format!("{flag}={metavar}")
                } else {
                    format!("{flag} {metavar}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A labeled cluster of options, rendered as one tab.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionGroup {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

impl OptionGroup {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            options: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }
}

/// The full option schema of a program.
///
/// `options` holds options outside any group. They are part of the
/// result but never rendered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionSchema {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub groups: Vec<OptionGroup>,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

impl OptionSchema {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group: OptionGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Every option known to the schema, grouped ones first.
    pub fn all_options(&self) -> impl Iterator<Item = &OptionSpec> {
        self.groups
            .iter()
            .flat_map(|g| g.options.iter())
            .chain(self.options.iter())
    }

    /// Every dest known to the schema, in declaration order.
    pub fn dests(&self) -> impl Iterator<Item = &str> {
        self.all_options().map(|o| o.dest.as_str())
    }
}

impl TryFrom<&Value> for OptionSchema {
    type Error = SchemaError;

    /// Parse a JSON Schema object.
    ///
    /// Top-level scalars go into the [`GENERAL_GROUP`] group, every
    /// top-level object property becomes its own group with dotted dests.
    fn try_from(schema: &Value) -> Result<Self, Self::Error> {
        let root = as_object(schema, "$")?;
        let title = root
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Options")
            .to_string();

        let mut general = OptionGroup::new(GENERAL_GROUP);
        let mut groups = Vec::new();

        for (key, prop) in properties(root) {
            let resolved = resolve_ref(schema, prop, key)?;
            if is_object_schema(resolved) {
                groups.push(parse_group(schema, key, prop, resolved)?);
            } else {
                general
                    .options
                    .push(parse_option(key, prop, resolved, None)?);
            }
        }

        if !general.options.is_empty() {
            groups.insert(0, general);
        }

        Ok(OptionSchema {
            title,
            groups,
            options: Vec::new(),
        })
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaError> {
    value.as_object().ok_or_else(|| SchemaError::NotAnObject {
        path: path.to_string(),
    })
}

fn properties(obj: &Map<String, Value>) -> impl Iterator<Item = (&String, &Value)> {
    obj.get("properties")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|p| p.iter())
}

fn is_object_schema(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("object") || value.get("properties").is_some()
}

// Longest `$ref` chain followed before giving up.
const MAX_REF_DEPTH: usize = 32;

/// Follow `$ref`s and unwrap nullable `anyOf`/`oneOf` wrappers, as schemars
/// emits for `Option<T>` when `T` is a definition.
fn resolve_ref<'a>(root: &'a Value, node: &'a Value, path: &str) -> Result<&'a Value, SchemaError> {
    let mut node = node;
    for _ in 0..MAX_REF_DEPTH {
        if let Some(inner) = nullable_variant(node) {
            node = inner;
            continue;
        }
        let Some(reference) = node.get("$ref").and_then(Value::as_str) else {
            return Ok(node);
        };
        node = ["#/$defs/", "#/definitions/"]
            .iter()
            .find_map(|prefix| {
                let name = reference.strip_prefix(prefix)?;
                let defs = &prefix[2..prefix.len() - 1];
                root.get(defs)?.get(name)
            })
            .ok_or_else(|| unresolved(path, reference))?;
    }

    let reference = node.get("$ref").and_then(Value::as_str).unwrap_or("#");
    Err(unresolved(path, reference))
}

fn unresolved(path: &str, reference: &str) -> SchemaError {
    SchemaError::UnresolvedRef {
        path: path.to_string(),
        reference: reference.to_string(),
    }
}

// The single non-null branch of `anyOf: [T, {type: null}]`.
fn nullable_variant(node: &Value) -> Option<&Value> {
    let variants = node
        .get("anyOf")
        .or_else(|| node.get("oneOf"))
        .and_then(Value::as_array)?;
    let mut non_null = variants
        .iter()
        .filter(|v| v.get("type").and_then(Value::as_str) != Some("null"));
    match (non_null.next(), non_null.next()) {
        (Some(inner), None) if variants.len() > 1 => Some(inner),
        _ => None,
    }
}

fn description<'a>(prop: &'a Value, resolved: &'a Value) -> Option<&'a str> {
    prop.get("description")
        .or_else(|| resolved.get("description"))
        .and_then(Value::as_str)
}

fn parse_group(
    root: &Value,
    key: &str,
    prop: &Value,
    resolved: &Value,
) -> Result<OptionGroup, SchemaError> {
    let obj = as_object(resolved, key)?;
    let title = prop
        .get("title")
        .or_else(|| resolved.get("title"))
        .and_then(Value::as_str)
        .unwrap_or(key);

    let mut group = OptionGroup::new(title);
    group.description = description(prop, resolved).map(str::to_string);

    // Defaults of nested structs are reported on the containing property.
    let group_default = prop.get("default").or_else(|| resolved.get("default"));

    for (field, field_prop) in properties(obj) {
        let dest = format!("{key}.{field}");
        let field_resolved = resolve_ref(root, field_prop, &dest)?;
        if is_object_schema(field_resolved) {
            return Err(SchemaError::UnsupportedType {
                path: dest,
                type_name: "object".to_string(),
            });
        }
        let inherited = group_default.and_then(|d| d.get(field));
        group
            .options
            .push(parse_option(&dest, field_prop, field_resolved, inherited)?);
    }

    Ok(group)
}

fn parse_option(
    dest: &str,
    prop: &Value,
    resolved: &Value,
    inherited_default: Option<&Value>,
) -> Result<OptionSpec, SchemaError> {
    let kind = option_type(dest, resolved)?;

    let mut spec = OptionSpec::new(dest, kind)
        .with_flags([format!("--{}", dest.replace(['.', '_'], "-"))]);
    spec.help = description(prop, resolved).unwrap_or_default().to_string();
    spec.default = prop
        .get("default")
        .or_else(|| resolved.get("default"))
        .or(inherited_default)
        .filter(|v| !v.is_null())
        .cloned();

    Ok(spec)
}

fn option_type(path: &str, node: &Value) -> Result<OptionType, SchemaError> {
    let unsupported = |type_name: String| SchemaError::UnsupportedType {
        path: path.to_string(),
        type_name,
    };

    let type_name = match node.get("type") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(types)) => {
            let non_null: Vec<&str> = types
                .iter()
                .filter_map(Value::as_str)
                .filter(|t| *t != "null")
                .collect();
            match non_null.as_slice() {
                [single] => single.to_string(),
                _ => return Err(unsupported(Value::Array(types.clone()).to_string())),
            }
        }
        None if node.get("enum").is_some() || node.get("const").is_some() => "string".to_string(),
        other => {
            return Err(unsupported(
                other.map(|v| v.to_string()).unwrap_or("unknown".to_string()),
            ));
        }
    };

    type_name
        .parse::<OptionType>()
        .map_err(|_| unsupported(type_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_formats_flags() {
        let url = OptionSpec::new("url", OptionType::String).with_flags(["-u", "--url"]);
        assert_eq!(url.display_name(), "-u URL, --url=URL");

        let batch = OptionSpec::new("batch", OptionType::Boolean).with_flags(["--batch"]);
        assert_eq!(batch.display_name(), "--batch");

        let level = OptionSpec::new("level", OptionType::Int)
            .with_flags(["--level"])
            .with_metavar("LEVEL");
        assert_eq!(level.display_name(), "--level=LEVEL");

        let bare = OptionSpec::new("threads", OptionType::Int);
        assert_eq!(bare.display_name(), "threads");
    }

    #[test]
    fn test_dests_include_ungrouped() {
        let schema = OptionSchema::new("tool")
            .with_group(
                OptionGroup::new("Target")
                    .with_option(OptionSpec::new("url", OptionType::String))
                    .with_option(OptionSpec::new("level", OptionType::Int)),
            )
            .with_option(OptionSpec::new("version", OptionType::Boolean));

        let dests: Vec<_> = schema.dests().collect();
        assert_eq!(dests, vec!["url", "level", "version"]);
    }

    #[test]
    fn test_json_schema_groups() {
        let schema = json!({
            "title": "Scanner",
            "type": "object",
            "properties": {
                "verbose": {"type": "boolean", "description": "Chatty output"},
                "request": {
                    "description": "How to connect",
                    "$ref": "#/$defs/Request"
                },
                "name": {"type": ["string", "null"]}
            },
            "$defs": {
                "Request": {
                    "type": "object",
                    "properties": {
                        "timeout": {"type": "number", "default": 30.0},
                        "retries": {"type": "integer"},
                        "method": {"enum": ["GET", "POST"]}
                    }
                }
            }
        });

        let parsed = OptionSchema::try_from(&schema).unwrap();
        assert_eq!(parsed.title, "Scanner");
        assert_eq!(parsed.groups.len(), 2);

        let general = &parsed.groups[0];
        assert_eq!(general.title, GENERAL_GROUP);
        assert_eq!(general.options[0].dest, "verbose");
        assert_eq!(general.options[0].help, "Chatty output");
        assert_eq!(general.options[1].kind, OptionType::String);

        let request = &parsed.groups[1];
        assert_eq!(request.title, "request");
        assert_eq!(request.description.as_deref(), Some("How to connect"));
        let dests: Vec<_> = request.options.iter().map(|o| o.dest.as_str()).collect();
        assert_eq!(dests, vec!["request.timeout", "request.retries", "request.method"]);
        assert_eq!(request.options[0].kind, OptionType::Float);
        assert_eq!(request.options[0].default, Some(json!(30.0)));
        assert_eq!(request.options[1].flags, vec!["--request-retries"]);
    }

    #[test]
    fn test_group_default_is_inherited() {
        let schema = json!({
            "type": "object",
            "properties": {
                "net": {
                    "type": "object",
                    "default": {"port": 8080},
                    "properties": {"port": {"type": "integer"}}
                }
            }
        });

        let parsed = OptionSchema::try_from(&schema).unwrap();
        assert_eq!(parsed.groups[0].options[0].default, Some(json!(8080)));
    }

    #[test]
    fn test_unsupported_type_reports_path() {
        let schema = json!({
            "type": "object",
            "properties": {"tags": {"type": "array", "items": {"type": "string"}}}
        });

        let err = OptionSchema::try_from(&schema).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnsupportedType { ref path, .. } if path == "tags"
        ));
    }

    #[test]
    fn test_nullable_definitions() {
        #[derive(schemars::JsonSchema)]
        #[allow(dead_code)]
        enum Mode {
            Fast,
            Safe,
        }
        #[derive(schemars::JsonSchema)]
        #[allow(dead_code)]
        struct Proxy {
            host: String,
        }
        #[derive(schemars::JsonSchema)]
        #[allow(dead_code)]
        struct Config {
            mode: Option<Mode>,
            proxy: Option<Proxy>,
        }

        let schema = serde_json::to_value(schemars::schema_for!(Config)).unwrap();
        let parsed = OptionSchema::try_from(&schema).unwrap();

        let mode = &parsed.groups[0].options[0];
        assert_eq!(mode.dest, "mode");
        assert_eq!(mode.kind, OptionType::String);

        let proxy = &parsed.groups[1];
        assert_eq!(proxy.options[0].dest, "proxy.host");
    }

    #[test]
    fn test_self_referencing_definition() {
        let schema = json!({
            "type": "object",
            "properties": {"x": {"$ref": "#/$defs/A"}},
            "$defs": {"A": {"$ref": "#/$defs/A"}}
        });
        assert!(matches!(
            OptionSchema::try_from(&schema),
            Err(SchemaError::UnresolvedRef { ref path, .. }) if path == "x"
        ));
    }

    #[test]
    fn test_unresolved_ref() {
        let schema = json!({
            "type": "object",
            "properties": {"x": {"$ref": "#/$defs/Missing"}}
        });
        assert!(matches!(
            OptionSchema::try_from(&schema),
            Err(SchemaError::UnresolvedRef { .. })
        ));
    }
}
