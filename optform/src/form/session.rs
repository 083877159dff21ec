use serde_json::{Number, Value};

use crate::{
    data::{
        defaults::DefaultsRegistry, result::ResultMapping, schema::OptionSchema,
        types::OptionType,
    },
    error::FormError,
    form::{
        tabs::TabContainer,
        walker::{BindingKey, FocusTarget, SchemaWalker, Section, WidgetBinding},
        widget::Control,
    },
};

/// Lifecycle of a form session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Submitted,
    Cancelled,
}

/// All state of one open form, from building to submission.
///
/// `Open → Submitted | Cancelled`. Once closed, every mutating call fails
/// with [`FormError::SessionClosed`].
pub struct FormSession {
    title: String,
    tabs: TabContainer<Section>,
    bindings: WidgetBinding,
    first: Option<FocusTarget>,
    schema_dests: Vec<String>,
    defaults: DefaultsRegistry,
    state: SessionState,
    result: Option<ResultMapping>,
}

impl FormSession {
    /// Build sections and controls for `schema`.
    pub fn open(schema: &OptionSchema, defaults: DefaultsRegistry) -> Result<Self, FormError> {
        let walked = SchemaWalker::build(&schema.groups, &defaults)?;
        info!(
            "form `{}` opened: {} tabs, {} controls",
            schema.title,
            walked.tabs.len(),
            walked.bindings.len()
        );

        Ok(Self {
            title: schema.title.clone(),
            tabs: walked.tabs,
            bindings: walked.bindings,
            first: walked.first,
            schema_dests: schema.dests().map(str::to_string).collect(),
            defaults,
            state: SessionState::Open,
            result: None,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tabs(&self) -> &TabContainer<Section> {
        &self.tabs
    }

    pub fn bindings(&self) -> &WidgetBinding {
        &self.bindings
    }

    /// First control of the whole form, for initial focus.
    pub fn first(&self) -> Option<&FocusTarget> {
        self.first.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn control(&self, key: &BindingKey) -> Option<&Control> {
        self.bindings.get(key)
    }

    /// Feed a content change of a text control. Returns the text the
    /// control shows afterwards, which differs from `text` when the edit
    /// was reverted.
    pub fn input(&mut self, key: &BindingKey, text: &str) -> Result<String, FormError> {
        self.ensure_open()?;
        let input = self
            .bindings
            .get_mut(key)
            .and_then(Control::as_text_mut)
            .ok_or_else(|| unknown(key))?;
        Ok(input.set_content(text).to_string())
    }

    /// Set the state of a toggle control.
    pub fn toggle(&mut self, key: &BindingKey, checked: bool) -> Result<(), FormError> {
        self.ensure_open()?;
        self.bindings
            .get_mut(key)
            .and_then(Control::as_toggle_mut)
            .ok_or_else(|| unknown(key))?
            .set_checked(checked);
        Ok(())
    }

    /// Select a tab and return the container's new height.
    pub fn select_tab(&mut self, index: usize) -> Result<usize, FormError> {
        self.ensure_open()?;
        self.tabs.select(index);
        Ok(self.tabs.height())
    }

    pub fn next_tab(&mut self) -> Result<usize, FormError> {
        self.ensure_open()?;
        self.tabs.select_next();
        Ok(self.tabs.height())
    }

    pub fn previous_tab(&mut self) -> Result<usize, FormError> {
        self.ensure_open()?;
        self.tabs.select_previous();
        Ok(self.tabs.height())
    }

    /// Extract the typed result and close the session.
    ///
    /// A coercion failure keeps the session open so the value can be
    /// corrected.
    pub fn submit(&mut self) -> Result<&ResultMapping, FormError> {
        self.ensure_open()?;
        let result = SubmissionExtractor::extract(
            &self.bindings,
            self.schema_dests.iter().map(String::as_str),
            &self.defaults,
        )?;
        info!("form `{}` submitted with {} options", self.title, result.len());
        self.state = SessionState::Submitted;
        Ok(self.result.insert(result))
    }

    /// Close without producing a result. No-op once closed.
    pub fn cancel(&mut self) {
        if self.is_open() {
            info!("form `{}` cancelled", self.title);
            self.state = SessionState::Cancelled;
        }
    }

    /// The result, present only after a submission.
    pub fn result(&self) -> Option<&ResultMapping> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<ResultMapping> {
        self.result
    }

    fn ensure_open(&self) -> Result<(), FormError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(FormError::SessionClosed)
        }
    }
}

fn unknown(key: &BindingKey) -> FormError {
    FormError::UnknownBinding {
        dest: key.dest.clone(),
        kind: key.kind,
    }
}

/// Reads live controls back into a [`ResultMapping`].
pub struct SubmissionExtractor;

impl SubmissionExtractor {
    /// Coerce every bound control, then backfill each schema dest without
    /// a control from `defaults`.
    pub fn extract<'a>(
        bindings: &WidgetBinding,
        schema_dests: impl IntoIterator<Item = &'a str>,
        defaults: &DefaultsRegistry,
    ) -> Result<ResultMapping, FormError> {
        let mut result = ResultMapping::new();

        for (key, control) in bindings.iter() {
            result.insert(&key.dest, coerce(key, control)?);
        }

        for dest in schema_dests {
            if !result.contains(dest) {
                let value = defaults.get(dest).cloned().unwrap_or(Value::Null);
                debug!("backfilled `{dest}` with {value}");
                result.insert(dest, value);
            }
        }

        Ok(result)
    }
}

fn coerce(key: &BindingKey, control: &Control) -> Result<Value, FormError> {
    if control.text().is_some_and(str::is_empty) {
        return Ok(Value::Null);
    }

    let invalid = |text: &str| FormError::Coercion {
        dest: key.dest.clone(),
        kind: key.kind,
        text: text.to_string(),
    };

    match (key.kind, control) {
        (_, Control::Toggle(toggle)) => Ok(Value::Bool(toggle.state() != 0)),
        (OptionType::String, Control::Text(input)) => Ok(Value::String(input.content().to_string())),
        (OptionType::Float, Control::Text(input)) => input
            .content()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| invalid(input.content())),
        (OptionType::Int, Control::Text(input)) => input
            .content()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid(input.content())),
        (OptionType::Boolean, Control::Text(input)) => Ok(Value::Bool(!input.content().is_empty())),
    }
}
