//! Option schemas derived from a [`clap::Command`].
//!
//! Lets a program describe its options once with clap and expose them both
//! as command-line flags and as a form.

use std::any::TypeId;

use clap::{Arg, ArgAction, Command};
use serde_json::Value;

use crate::data::{
    result::ResultMapping,
    schema::{OptionGroup, OptionSchema, OptionSpec},
    types::OptionType,
};

/// Group title for arguments without a help heading.
pub const DEFAULT_HEADING: &str = "Options";

impl OptionSchema {
    /// Build a schema from the arguments of `cmd`.
    ///
    /// Arguments are grouped by help heading in order of first appearance.
    /// Hidden arguments stay in the schema but are not rendered.
    pub fn from_command(cmd: &Command) -> Self {
        // Actions and value parsers are only final once built.
        let mut cmd = cmd.clone();
        cmd.build();
        let mut schema = OptionSchema::new(cmd.get_name());

        for arg in cmd.get_arguments() {
            if matches!(
                arg.get_action(),
                ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version
            ) {
                continue;
            }

            let spec = arg_spec(arg);
            if arg.is_hide_set() {
                schema.options.push(spec);
                continue;
            }

            let heading = arg.get_help_heading().unwrap_or(DEFAULT_HEADING);
            match schema.groups.iter_mut().find(|g| g.title == heading) {
                Some(group) => group.options.push(spec),
                None => schema
                    .groups
                    .push(OptionGroup::new(heading).with_option(spec)),
            }
        }

        schema
    }
}

fn arg_kind(arg: &Arg) -> OptionType {
    match arg.get_action() {
        ArgAction::SetTrue | ArgAction::SetFalse => return OptionType::Boolean,
        ArgAction::Count => return OptionType::Int,
        _ => {}
    }

    let type_id = arg.get_value_parser().type_id();
    let ints = [
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<usize>(),
    ];
    if ints.iter().any(|id| type_id == *id) {
        OptionType::Int
    } else if type_id == TypeId::of::<f64>() || type_id == TypeId::of::<f32>() {
        OptionType::Float
    } else {
        OptionType::String
    }
}

fn arg_spec(arg: &Arg) -> OptionSpec {
    let kind = arg_kind(arg);
    let mut spec = OptionSpec::new(arg.get_id().as_str(), kind);

    if let Some(short) = arg.get_short() {
        spec.flags.push(format!("-{short}"));
    }
    if let Some(long) = arg.get_long() {
        spec.flags.push(format!("--{long}"));
    }
    spec.metavar = arg
        .get_value_names()
        .and_then(|names| names.first())
        .map(|name| name.to_string());
    spec.help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
    spec.default = arg
        .get_default_values()
        .first()
        .map(|raw| typed_default(kind, &raw.to_string_lossy()));

    spec
}

fn typed_default(kind: OptionType, raw: &str) -> Value {
    match kind {
        OptionType::Int => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(raw)),
        OptionType::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(raw)),
        OptionType::Boolean => Value::Bool(raw == "true"),
        OptionType::String => Value::from(raw),
    }
}

impl ResultMapping {
    /// Render the result as an argument vector `cmd` can parse.
    ///
    /// Blank options are left out; booleans emit their flag only when the
    /// value differs from what the flag's absence means. Values are attached
    /// to their flag (`--long=value`, `-svalue`) so a leading `-` is never
    /// taken for another flag; counted flags are repeated.
    pub fn to_args(&self, cmd: &Command) -> Vec<String> {
        let mut cmd = cmd.clone();
        cmd.build();
        let mut args = vec![cmd.get_name().to_string()];
        let mut positionals = Vec::new();

        for arg in cmd.get_arguments() {
            let Some(value) = self.get(arg.get_id().as_str()) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            let flag = arg
                .get_long()
                .map(|l| format!("--{l}"))
                .or_else(|| arg.get_short().map(|s| format!("-{s}")));

            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };

            match (arg.get_action(), flag) {
                (ArgAction::SetTrue, Some(flag)) => {
                    if value.as_bool() == Some(true) {
                        args.push(flag);
                    }
                }
                (ArgAction::SetFalse, Some(flag)) => {
                    if value.as_bool() == Some(false) {
                        args.push(flag);
                    }
                }
                (ArgAction::Count, Some(flag)) => {
                    let times = value.as_u64().unwrap_or(0);
                    args.extend((0..times).map(|_| flag.clone()));
                }
                (_, Some(flag)) if arg.get_long().is_some() => args.push(format!("{flag}={text}")),
                // clap strips one `=` after a short flag.
                (_, Some(flag)) if text.starts_with('=') => args.push(format!("{flag}={text}")),
                (_, Some(flag)) => args.push(format!("{flag}{text}")),
                (_, None) => positionals.push(text),
            }
        }

        if positionals.iter().any(|p| p.starts_with('-')) {
            args.push("--".to_string());
        }
        args.extend(positionals);
        args
    }
}
