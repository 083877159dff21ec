use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::data::schema::SchemaError;

/// Declared value type of an option.
///
/// The type decides which control renders the option and how its text is
/// coerced on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Free text, passed through unchanged.
    String,
    /// Floating-point number.
    Float,
    /// Non-negative integer.
    Int,
    /// Checked/unchecked toggle.
    Boolean,
}

impl OptionType {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::String => "string",
            OptionType::Float => "float",
            OptionType::Int => "int",
            OptionType::Boolean => "boolean",
        }
    }

    /// Whether the option renders as a text control.
    pub fn is_text(&self) -> bool {
        !matches!(self, OptionType::Boolean)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" | "str" => Ok(OptionType::String),
            "float" | "number" => Ok(OptionType::Float),
            "int" | "integer" => Ok(OptionType::Int),
            "boolean" | "bool" => Ok(OptionType::Boolean),
            other => Err(SchemaError::UnsupportedType {
                path: String::new(),
                type_name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("integer".parse::<OptionType>().unwrap(), OptionType::Int);
        assert_eq!("number".parse::<OptionType>().unwrap(), OptionType::Float);
        assert_eq!("bool".parse::<OptionType>().unwrap(), OptionType::Boolean);
        assert!("array".parse::<OptionType>().is_err());
    }

    #[test]
    fn test_display_matches_serde() {
        let json = serde_json::to_value(OptionType::Float).unwrap();
        assert_eq!(json, serde_json::json!("float"));
        assert_eq!(OptionType::Float.to_string(), "float");
    }
}
