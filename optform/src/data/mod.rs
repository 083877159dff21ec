//! Option schema, defaults and result types.
//!
//! - [`types`] - Declared option types
//! - [`schema`] - Options, groups, schemas and JSON Schema parsing
//! - [`command`] - Schemas derived from `clap` commands
//! - [`defaults`] - Default value registry
//! - [`result`] - Submitted options

/// Schemas derived from `clap` commands.
pub mod command;

/// Default value registry.
pub mod defaults;

/// Typed options produced by a submission.
pub mod result;

/// Options, groups and schemas.
pub mod schema;

/// Declared option types.
pub mod types;

pub use defaults::DefaultsRegistry;
pub use result::ResultMapping;
pub use schema::{OptionGroup, OptionSchema, OptionSpec, SchemaError};
pub use types::OptionType;
