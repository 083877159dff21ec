use std::path::Path;
#[cfg(feature = "tui")]
use std::sync::Arc;

use anyhow::{Context, bail};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::{
    config::FormConfig,
    data::{
        defaults::{DefaultsRegistry, extension},
        result::ResultMapping,
        schema::OptionSchema,
    },
    error::FormError,
    form::session::FormSession,
};

/// Show a form for `schema` and block until the user leaves it.
///
/// `defaults` overlays the schema's own defaults. Returns `None` when the
/// form was closed without submission.
///
/// # Errors
///
/// [`FormError::MissingDependency`] when no terminal frontend is available,
/// before any form state is created.
#[cfg(feature = "tui")]
pub fn run_form(
    schema: &OptionSchema,
    defaults: &DefaultsRegistry,
    config: &FormConfig,
) -> anyhow::Result<Option<ResultMapping>> {
    run_form_with(schema, defaults, config, Arc::new(crate::ui::SystemBrowser))
}

/// Always fails: this build has no terminal frontend.
#[cfg(not(feature = "tui"))]
pub fn run_form(
    _schema: &OptionSchema,
    _defaults: &DefaultsRegistry,
    _config: &FormConfig,
) -> anyhow::Result<Option<ResultMapping>> {
    Err(FormError::MissingDependency("built without the `tui` feature".to_string()).into())
}

/// Like [`run_form`] with a custom handler for `Help` links.
#[cfg(feature = "tui")]
pub fn run_form_with(
    schema: &OptionSchema,
    defaults: &DefaultsRegistry,
    config: &FormConfig,
    opener: Arc<dyn crate::ui::LinkOpener>,
) -> anyhow::Result<Option<ResultMapping>> {
    crate::ui::ensure_terminal()?;

    let session = open_session(schema, defaults)?;
    let session = crate::ui::show(session, config, opener)?;
    Ok(session.into_result())
}

/// Build a session whose defaults are the schema defaults overlaid with
/// `defaults`.
pub fn open_session(
    schema: &OptionSchema,
    defaults: &DefaultsRegistry,
) -> Result<FormSession, FormError> {
    let mut merged = DefaultsRegistry::from_schema(schema);
    for dest in schema.dests() {
        if let Some(value) = defaults.get(dest) {
            merged.set(dest, value.clone());
        }
    }
    FormSession::open(schema, merged)
}

/// Edit a typed configuration through a form.
///
/// The JSON Schema of `C` drives the form; `defaults_path`, when it exists,
/// pre-fills it. On submission the nested result is written back to
/// `defaults_path` in its own format and returned as `C`. Returns `None`
/// when the form was closed without submission.
///
/// # Errors
///
/// Returns errors when schema conversion, parsing, I/O or the frontend
/// fails.
pub async fn run<C: JsonSchema + DeserializeOwned>(
    defaults_path: impl AsRef<Path>,
    config: &FormConfig,
) -> anyhow::Result<Option<C>> {
    let defaults_path = defaults_path.as_ref();
    let schema_json = serde_json::to_value(schemars::schema_for!(C))?;
    let schema = OptionSchema::try_from(&schema_json)?;

    let defaults = load_defaults(defaults_path).await?;

    let Some(result) = run_form(&schema, &defaults, config)? else {
        return Ok(None);
    };

    let typed = result.to_typed::<C>()?;
    write_document(defaults_path, &result).await?;
    Ok(Some(typed))
}

/// Read a defaults document, formatted by extension.
///
/// A missing file yields an empty registry; any other read error is
/// returned.
pub async fn load_defaults(path: &Path) -> anyhow::Result<DefaultsRegistry> {
    let ext = extension(path);
    if !matches!(ext, "json" | "toml" | "tml") {
        bail!("unsupported config file extension: {ext}");
    }

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not found, starting from schema defaults", path.display());
            String::new()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let mut defaults = DefaultsRegistry::new();
    defaults
        .merge_str(&content, ext)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(defaults)
}

/// Serialize `result` in the format of `path` (by extension).
pub fn render_document(path: &Path, result: &ResultMapping) -> anyhow::Result<String> {
    let nested = result.to_nested_json();
    let content = match extension(path) {
        "json" => serde_json::to_string_pretty(&nested)?,
        "toml" | "tml" => toml::to_string_pretty(&without_nulls(nested))?,
        ext => {
            bail!("unsupported config file extension: {ext}");
        }
    };
    Ok(content)
}

/// Write `result` to `path`, formatted by extension.
pub async fn write_document(path: &Path, result: &ResultMapping) -> anyhow::Result<()> {
    let content = render_document(path, result)?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("options written to {}", path.display());
    Ok(())
}

// TOML has no null; blank options are left out.
fn without_nulls(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, without_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        schema::{OptionGroup, OptionSpec},
        types::OptionType,
    };
    use serde::Deserialize;
    use serde_json::json;

    fn schema() -> OptionSchema {
        OptionSchema::new("t").with_group(
            OptionGroup::new("Net")
                .with_option(OptionSpec::new("net.port", OptionType::Int).with_default(80))
                .with_option(OptionSpec::new("net.host", OptionType::String)),
        )
    }

    #[test]
    fn test_open_session_overlays_defaults() {
        let mut defaults = DefaultsRegistry::new();
        defaults.set("net.port", json!(8080));
        defaults.set("unrelated", json!(1));

        let mut session = open_session(&schema(), &defaults).unwrap();
        let result = session.submit().unwrap();
        assert_eq!(result.get("net.port"), Some(&json!(8080)));
        assert!(!result.contains("unrelated"));
    }

    #[test]
    fn test_render_toml_drops_nulls() {
        let mut session = open_session(&schema(), &DefaultsRegistry::new()).unwrap();
        let result = session.submit().unwrap().clone();

        let toml = render_document(Path::new("net.toml"), &result).unwrap();
        assert!(toml.contains("port = 80"));
        assert!(!toml.contains("host"));

        let json = render_document(Path::new("net.json"), &result).unwrap();
        assert!(json.contains("\"host\": null"));

        assert!(render_document(Path::new("net.yaml"), &result).is_err());
    }

    #[test]
    fn test_typed_result() {
        #[derive(Deserialize, JsonSchema)]
        struct Net {
            port: i64,
            host: Option<String>,
        }
        #[derive(Deserialize, JsonSchema)]
        struct Config {
            net: Net,
        }

        let schema_json = serde_json::to_value(schemars::schema_for!(Config)).unwrap();
        let schema = OptionSchema::try_from(&schema_json).unwrap();
        let mut session = open_session(&schema, &DefaultsRegistry::new()).unwrap();
        session
            .input(
                &crate::form::walker::BindingKey::new("net.port", OptionType::Int),
                "22",
            )
            .unwrap();
        let config: Config = session.submit().unwrap().to_typed().unwrap();
        assert_eq!(config.net.port, 22);
        assert!(config.net.host.is_none());
    }

    #[test]
    fn test_write_document() {
        let dir = std::env::temp_dir().join(format!("optform-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.json");

        let mut session = open_session(&schema(), &DefaultsRegistry::new()).unwrap();
        let result = session.submit().unwrap().clone();
        tokio_test::block_on(write_document(&path, &result)).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"net": {"port": 80, "host": null}}));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_defaults_only_tolerates_missing_file() {
        let dir = std::env::temp_dir().join(format!("optform-load-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = tokio_test::block_on(load_defaults(&dir.join("absent.toml"))).unwrap();
        assert!(missing.is_empty());

        let present = dir.join("present.toml");
        std::fs::write(&present, "[net]\nport = 8080\n").unwrap();
        let loaded = tokio_test::block_on(load_defaults(&present)).unwrap();
        assert_eq!(loaded.get("net.port"), Some(&json!(8080)));

        // A directory exists but cannot be read as a document.
        let unreadable = dir.join("dir.toml");
        std::fs::create_dir_all(&unreadable).unwrap();
        assert!(tokio_test::block_on(load_defaults(&unreadable)).is_err());

        assert!(tokio_test::block_on(load_defaults(&dir.join("x.yaml"))).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
