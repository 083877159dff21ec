use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use optform::{DefaultsRegistry, FormConfig, OptionSchema, run_form, write_document};

/// Render an interactive form from a JSON Schema and print the chosen options.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// JSON Schema describing the options
    #[arg(short, long)]
    schema: PathBuf,

    /// TOML or JSON document with default values
    #[arg(short, long)]
    defaults: Option<PathBuf>,

    /// TOML file with window title, About text and help links
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the result here (format by extension) instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print dotted keys instead of nested tables
    #[arg(long)]
    flat: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    #[cfg(not(feature = "logging"))]
    env_logger::init();

    let cli = Cli::parse();

    let content = tokio::fs::read_to_string(&cli.schema)
        .await
        .with_context(|| format!("Failed to read {}", cli.schema.display()))?;
    let schema_json: serde_json::Value = serde_json::from_str(&content)?;
    let schema = OptionSchema::try_from(&schema_json)?;

    let mut defaults = DefaultsRegistry::new();
    if let Some(path) = &cli.defaults {
        defaults.merge_file(path)?;
    }

    let config = match &cli.config {
        Some(path) => FormConfig::from_file(path)?,
        None => FormConfig::default(),
    };

    let Some(result) = run_form(&schema, &defaults, &config)? else {
        println!("No changes");
        return Ok(());
    };

    match &cli.output {
        Some(path) => {
            write_document(path, &result).await?;
            info!("saved {} options", result.len());
        }
        None => {
            let value = if cli.flat {
                result.as_json()
            } else {
                result.to_nested_json()
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}
