use serde_json::Value;

use crate::{
    data::{schema::OptionSpec, types::OptionType},
    form::filter::{ConstrainedInputFilter, FilterOutcome},
};

/// Single-line text control with an optional live filter.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    content: String,
    filter: Option<ConstrainedInputFilter>,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: ConstrainedInputFilter) -> Self {
        Self {
            content: String::new(),
            filter: Some(filter),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn filter(&self) -> Option<&ConstrainedInputFilter> {
        self.filter.as_ref()
    }

    /// Apply a content change and return what the control now shows.
    ///
    /// With a filter attached, a rejected change leaves the last good
    /// value in place.
    pub fn set_content(&mut self, text: &str) -> &str {
        match self.filter.as_mut().map(|f| f.check(text)) {
            Some(FilterOutcome::Reverted(previous)) => self.content = previous,
            _ => self.content = text.to_string(),
        }
        &self.content
    }

    /// Insert `text` before the character at `pos`, then filter.
    pub fn insert(&mut self, pos: usize, text: &str) -> &str {
        let byte = self
            .content
            .char_indices()
            .nth(pos)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len());
        let mut next = self.content.clone();
        next.insert_str(byte, text);
        self.set_content(&next)
    }
}

/// Checked/unchecked control backed by an integer state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Toggle {
    state: i64,
}

impl Toggle {
    pub fn state(&self) -> i64 {
        self.state
    }

    pub fn is_checked(&self) -> bool {
        self.state != 0
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.state = checked as i64;
    }
}

/// A live input control bound to one option.
#[derive(Debug, Clone)]
pub enum Control {
    Text(TextInput),
    Toggle(Toggle),
}

impl Control {
    /// Current text, for controls that have one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Control::Text(input) => Some(input.content()),
            Control::Toggle(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextInput> {
        match self {
            Control::Text(input) => Some(input),
            Control::Toggle(_) => None,
        }
    }

    pub fn as_toggle_mut(&mut self) -> Option<&mut Toggle> {
        match self {
            Control::Toggle(toggle) => Some(toggle),
            Control::Text(_) => None,
        }
    }
}

/// Builds the control matching an option's declared type.
pub struct WidgetFactory;

impl WidgetFactory {
    /// Create the control for `spec`, pre-filled with `default`.
    ///
    /// Text controls receive the default through the same path as typed
    /// input, so a default violating the filter leaves them blank. Toggles
    /// always start unchecked.
    pub fn create(spec: &OptionSpec, default: Option<&Value>) -> Control {
        let mut control = match spec.kind {
            OptionType::String => Control::Text(TextInput::new()),
            OptionType::Float => Control::Text(TextInput::with_filter(ConstrainedInputFilter::float())),
            OptionType::Int => Control::Text(TextInput::with_filter(ConstrainedInputFilter::int())),
            OptionType::Boolean => Control::Toggle(Toggle::default()),
        };

        if let Some(default) = default.filter(|v| is_truthy(v)) {
            match control.as_text_mut() {
                Some(input) => {
                    let shown = input.insert(0, &default_text(default));
                    if shown.is_empty() {
                        warn!("default {default} of `{}` rejected by its filter", spec.dest);
                    }
                }
                None => trace!("boolean `{}` ignores default {default}", spec.dest),
            }
        }

        control
    }
}

/// Python-style truthiness: null, false, zero and empty values are unset.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn default_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dispatch_by_type() {
        let string = WidgetFactory::create(&OptionSpec::new("a", OptionType::String), None);
        assert!(matches!(&string, Control::Text(t) if t.filter().is_none()));

        let float = WidgetFactory::create(&OptionSpec::new("b", OptionType::Float), None);
        let Control::Text(float) = float else {
            panic!("float should be text");
        };
        assert_eq!(float.filter().unwrap().pattern(), crate::form::filter::FLOAT_PATTERN);

        let int = WidgetFactory::create(&OptionSpec::new("c", OptionType::Int), None);
        let Control::Text(int) = int else {
            panic!("int should be text");
        };
        assert_eq!(int.filter().unwrap().pattern(), crate::form::filter::INT_PATTERN);

        let boolean = WidgetFactory::create(&OptionSpec::new("d", OptionType::Boolean), None);
        assert!(matches!(boolean, Control::Toggle(t) if !t.is_checked()));
    }

    #[test]
    fn test_prefill() {
        let spec = OptionSpec::new("delay", OptionType::Float);
        let control = WidgetFactory::create(&spec, Some(&json!("3.14")));
        assert_eq!(control.text(), Some("3.14"));

        let spec = OptionSpec::new("level", OptionType::Int);
        let control = WidgetFactory::create(&spec, Some(&json!(10)));
        assert_eq!(control.text(), Some("10"));
    }

    #[test]
    fn test_falsy_defaults_not_prefilled() {
        let spec = OptionSpec::new("level", OptionType::Int);
        for default in [json!(0), json!(""), json!(false), Value::Null] {
            let control = WidgetFactory::create(&spec, Some(&default));
            assert_eq!(control.text(), Some(""));
        }
    }

    #[test]
    fn test_boolean_default_not_prefilled() {
        let spec = OptionSpec::new("batch", OptionType::Boolean);
        let control = WidgetFactory::create(&spec, Some(&json!(true)));
        assert!(matches!(control, Control::Toggle(t) if t.state() == 0));
    }

    #[test]
    fn test_invalid_default_leaves_blank() {
        let spec = OptionSpec::new("retries", OptionType::Int);
        let control = WidgetFactory::create(&spec, Some(&json!(-1)));
        assert_eq!(control.text(), Some(""));
    }

    #[test]
    fn test_insert_at_position() {
        let mut input = TextInput::new();
        input.set_content("ac");
        assert_eq!(input.insert(1, "b"), "abc");
        assert_eq!(input.insert(10, "d"), "abcd");
    }
}
