//! Toolkit-independent form model.
//!
//! A [`FormSession`] owns everything one open form needs: the sections
//! built by [`walker::SchemaWalker`], the controls bound to each option and
//! the auto-resizing [`tabs::TabContainer`]. Frontends forward edits and
//! tab changes to it and call [`FormSession::submit`] once.

/// Live input filters.
pub mod filter;

/// Session lifecycle and result extraction.
pub mod session;

/// Tabbed container.
pub mod tabs;

/// Schema traversal into sections and bindings.
pub mod walker;

/// Input controls and their factory.
pub mod widget;

pub use session::{FormSession, SessionState, SubmissionExtractor};
pub use walker::{BindingKey, SchemaWalker, WidgetBinding};
pub use widget::{Control, WidgetFactory};
