use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Typed options produced by a submitted form.
///
/// Keys are dests in the order they were recorded; `Value::Null` marks an
/// option left blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultMapping {
    values: Map<String, Value>,
}

impl ResultMapping {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, dest: impl Into<String>, value: Value) {
        self.values.insert(dest.into(), value);
    }

    pub fn get(&self, dest: &str) -> Option<&Value> {
        self.values.get(dest)
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

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Flat `dest → value` object.
    pub fn as_json(&self) -> Value {
        Value::Object(self.values.clone())
    }

    /// Object with dotted dests split into nested tables.
    pub fn to_nested_json(&self) -> Value {
        let mut root = Map::new();
        for (dest, value) in &self.values {
            let mut parts = dest.split('.').peekable();
            let mut table = &mut root;
            while let Some(part) = parts.next() {
                if parts.peek().is_none() {
                    table.insert(part.to_string(), value.clone());
                    break;
                }
                let entry = table
                    .entry(part.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                table = match entry {
                    Value::Object(inner) => inner,
                    _ => unreachable!(),
                };
            }
        }
        Value::Object(root)
    }

    /// Deserialize the nested form into a caller's type.
    pub fn to_typed<C: DeserializeOwned>(&self) -> anyhow::Result<C> {
        Ok(serde_json::from_value(self.to_nested_json())?)
    }
}

impl IntoIterator for ResultMapping {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_nested_json() {
        let mut result = ResultMapping::new();
        result.insert("verbose", json!(true));
        result.insert("net.port", json!(80));
        result.insert("net.host", Value::Null);

        assert_eq!(
            result.to_nested_json(),
            json!({"verbose": true, "net": {"port": 80, "host": null}})
        );
        assert_eq!(result.as_json()["net.port"], json!(80));
    }

    #[test]
    fn test_to_typed() {
        #[derive(Deserialize)]
        struct Net {
            port: i64,
            host: Option<String>,
        }
        #[derive(Deserialize)]
        struct Config {
            verbose: bool,
            net: Net,
        }

        let mut result = ResultMapping::new();
        result.insert("verbose", json!(false));
        result.insert("net.port", json!(8080));
        result.insert("net.host", Value::Null);

        let config: Config = result.to_typed().unwrap();
        assert!(!config.verbose);
        assert_eq!(config.net.port, 8080);
        assert!(config.net.host.is_none());
    }
}
