use std::{fs, path::Path};

use anyhow::{Context, bail};
use serde_json::{Map, Value};

use crate::data::schema::OptionSchema;

/// Lookup of default values by dest.
///
/// Consulted when a control is pre-filled and again when the result is
/// backfilled for options that were never rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultsRegistry {
    values: Map<String, Value>,
}

impl DefaultsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the defaults declared by the schema itself.
    pub fn from_schema(schema: &OptionSchema) -> Self {
        let mut registry = Self::new();
        for option in schema.all_options() {
            if let Some(default) = &option.default {
                registry.set(&option.dest, default.clone());
            }
        }
        registry
    }

    pub fn get(&self, dest: &str) -> Option<&Value> {
        self.values.get(dest)
    }

    pub fn set(&mut self, dest: impl Into<String>, value: Value) {
        self.values.insert(dest.into(), value);
    }

    pub fn contains(&self, dest: &str) -> bool {
        self.values.contains_key(dest)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay values from a JSON document. Nested objects flatten into
    /// dotted dests, so `{"net": {"port": 1}}` sets `net.port`.
    pub fn merge_json(&mut self, value: &Value) -> anyhow::Result<()> {
        let Value::Object(obj) = value else {
            bail!("defaults document must be a table, got: {value}");
        };
        flatten_into(&mut self.values, "", obj);
        Ok(())
    }

    /// Overlay values from document content, format chosen by `ext`.
    pub fn merge_str(&mut self, content: &str, ext: &str) -> anyhow::Result<()> {
        if content.trim().is_empty() {
            return Ok(());
        }
        let json: Value = match ext {
            "json" => serde_json::from_str(content)?,
            "toml" | "tml" => {
                let v: toml::Value = toml::from_str(content)?;
                serde_json::to_value(v)?
            }
            ext => {
                bail!("Unsupported defaults file extension: {ext:?}");
            }
        };
        self.merge_json(&json)
    }

    /// Overlay values from a TOML or JSON file.
    pub fn merge_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.merge_str(&content, extension(path))
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!("loaded {} defaults from {}", self.len(), path.display());
        Ok(())
    }
}

impl FromIterator<(String, Value)> for DefaultsRegistry {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

pub(crate) fn extension(path: &Path) -> &str {
    path.extension().and_then(|s| s.to_str()).unwrap_or("")
}

fn flatten_into(out: &mut Map<String, Value>, prefix: &str, obj: &Map<String, Value>) {
    for (key, value) in obj {
        let dest = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_into(out, &dest, inner),
            other => {
                out.insert(dest, other.clone());
            }
        }
    }
}
