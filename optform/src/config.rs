//! Frontend configuration.
//!
//! Usually kept next to the program in a TOML file:
//!
//! ```toml
//! title = "scanner 1.4"
//! about = "Copyright (c) 2006-2019"
//!
//! [[links]]
//! label = "Official site"
//! url = "https://example.org"
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// A `Help` menu entry opening a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Link {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Window title, About text and help links of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Window title. Empty falls back to the schema title.
    pub title: String,
    /// Text of the About dialog.
    pub about: String,
    /// Entries of the `Help` menu, in order.
    pub links: Vec<Link>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            about: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            links: Vec::new(),
        }
    }
}

impl FormConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_link(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.push(Link::new(label, url));
        self
    }

    /// Title to show, given the schema's own title.
    pub fn window_title<'a>(&'a self, schema_title: &'a str) -> &'a str {
        if self.title.is_empty() {
            schema_title
        } else {
            &self.title
        }
    }
}
