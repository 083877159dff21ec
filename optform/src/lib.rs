//! # optform
//!
//! Interactive configuration forms generated from command-line option
//! schemas.
//!
//! A program describes its options once (with clap, a JSON Schema or an
//! [`OptionSchema`] built by hand) and gets both the command-line flags and
//! a terminal form that produces the same typed options.
//!
//! ## Features
//!
//! - One tab per option group, one row per option, in declaration order
//! - Controls chosen by option type: text, float, integer, toggle
//! - Numeric inputs reject invalid keystrokes as they are typed
//! - Tab body resizes to the selected tab
//! - Typed result merged with defaults, every schema option present once
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use optform::{DefaultsRegistry, FormConfig, OptionSchema, run_form};
//!
//! let cmd = clap::Command::new("scan")
//!     .arg(clap::Arg::new("url").long("url").help_heading("Target"));
//! let schema = OptionSchema::from_command(&cmd);
//!
//! if let Some(options) = run_form(&schema, &DefaultsRegistry::new(), &FormConfig::default()).unwrap() {
//!     let args = options.to_args(&cmd);
//!     let matches = cmd.get_matches_from(args);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Option schema, defaults and result types
//! - [`form`] - Toolkit-independent form model
//! - [`ui`] - Cursive frontend (requires `tui` feature)
//! - [`run`] - Entry points

#[macro_use]
extern crate log;

/// Frontend configuration (title, About text, help links).
pub mod config;

/// Option schema, defaults and result types.
pub mod data;

/// Error types of the form engine.
pub mod error;

/// Toolkit-independent form model: filters, controls, sections, tabs and
/// sessions.
pub mod form;

/// Entry points wiring schema, defaults and frontend together.
pub mod run;

/// Terminal frontend.
///
/// This module is only available when the `tui` feature is enabled.
#[cfg(feature = "tui")]
pub mod ui;

pub use config::{FormConfig, Link};
pub use data::{
    DefaultsRegistry, OptionGroup, OptionSchema, OptionSpec, OptionType, ResultMapping,
};
pub use error::FormError;
pub use form::{FormSession, SessionState};
pub use run::*;
pub use serde_json::Value;
#[cfg(feature = "tui")]
pub use cursive;
