use crate::data::{schema::SchemaError, types::OptionType};

/// Errors raised while building, driving or submitting a form.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The terminal frontend cannot run here. Raised before any form state
    /// exists.
    #[error("missing dependence ({0})")]
    MissingDependency(String),

    /// Two options share both dest and type.
    #[error("option `{dest}` of type {kind} is declared twice")]
    DuplicateBinding { dest: String, kind: OptionType },

    /// No control is bound to the requested option.
    #[error("no control bound to `{dest}` of type {kind}")]
    UnknownBinding { dest: String, kind: OptionType },

    /// Non-blank text that still does not convert to the option's type.
    #[error("value {text:?} of `{dest}` is not a valid {kind}")]
    Coercion {
        dest: String,
        kind: OptionType,
        text: String,
    },

    /// The session was already submitted or cancelled.
    #[error("form session is closed")]
    SessionClosed,

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
