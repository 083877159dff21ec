use std::collections::HashMap;

use crate::{
    data::{defaults::DefaultsRegistry, schema::OptionGroup, types::OptionType},
    error::FormError,
    form::{
        tabs::{TabContainer, TabPage},
        widget::{Control, WidgetFactory},
    },
};

/// Identity of a binding. Two options may share a dest as long as their
/// types differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
    pub dest: String,
    pub kind: OptionType,
}

impl BindingKey {
    pub fn new(dest: impl Into<String>, kind: OptionType) -> Self {
        Self {
            dest: dest.into(),
            kind,
        }
    }
}

/// One grid row of a section.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Blank line.
    Spacer,
    /// Group description.
    Header(String),
    /// Label, control and help text of one option.
    Option {
        key: BindingKey,
        label: String,
        help: String,
    },
}

/// Visual section built from one option group.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub rows: Vec<Row>,
}

impl Section {
    pub fn option_keys(&self) -> impl Iterator<Item = &BindingKey> {
        self.rows.iter().filter_map(|row| match row {
            Row::Option { key, .. } => Some(key),
            _ => None,
        })
    }
}

impl TabPage for Section {
    fn title(&self) -> &str {
        &self.title
    }

    fn required_height(&self) -> usize {
        self.rows.len()
    }
}

/// Live controls keyed by `(dest, type)`, kept in declaration order.
#[derive(Debug, Clone, Default)]
pub struct WidgetBinding {
    entries: Vec<(BindingKey, Control)>,
    index: HashMap<BindingKey, usize>,
}

impl WidgetBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a control. An existing `(dest, type)` pair is an error.
    pub fn insert(&mut self, key: BindingKey, control: Control) -> Result<(), FormError> {
        if self.index.contains_key(&key) {
            return Err(FormError::DuplicateBinding {
                dest: key.dest,
                kind: key.kind,
            });
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, control));
        Ok(())
    }

    pub fn get(&self, key: &BindingKey) -> Option<&Control> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &BindingKey) -> Option<&mut Control> {
        self.index.get(key).map(|&i| &mut self.entries[i].1)
    }

    pub fn contains(&self, key: &BindingKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BindingKey, &Control)> {
        self.entries.iter().map(|(k, c)| (k, c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where initial focus goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTarget {
    pub key: BindingKey,
    pub tab: usize,
}

/// Everything produced by walking a schema.
pub struct WalkedForm {
    pub tabs: TabContainer<Section>,
    pub bindings: WidgetBinding,
    pub first: Option<FocusTarget>,
}

/// Turns option groups into sections and controls.
pub struct SchemaWalker;

impl SchemaWalker {
    /// Walk `groups` in order, one section per group and one binding per
    /// option.
    pub fn build(
        groups: &[OptionGroup],
        defaults: &DefaultsRegistry,
    ) -> Result<WalkedForm, FormError> {
        let mut sections = Vec::with_capacity(groups.len());
        let mut bindings = WidgetBinding::new();
        let mut first = None;

        for (tab, group) in groups.iter().enumerate() {
            let mut rows = vec![Row::Spacer];

            if let Some(description) = group.description.as_deref().filter(|d| !d.is_empty()) {
                rows.push(Row::Header(format!("{description}:")));
                rows.push(Row::Spacer);
            }

            for option in &group.options {
                let key = BindingKey::new(&option.dest, option.kind);
                let control = WidgetFactory::create(option, defaults.get(&option.dest));
                bindings.insert(key.clone(), control)?;

                if first.is_none() {
                    first = Some(FocusTarget {
                        key: key.clone(),
                        tab,
                    });
                }

                rows.push(Row::Option {
                    key,
                    label: option.display_name(),
                    help: option.help.clone(),
                });
            }

            rows.push(Row::Spacer);
            debug!(
                "section `{}`: {} options, {} rows",
                group.title,
                group.options.len(),
                rows.len()
            );
            sections.push(Section {
                title: group.title.clone(),
                rows,
            });
        }

        Ok(WalkedForm {
            tabs: TabContainer::auto_resizing(sections),
            bindings,
            first,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::OptionSpec;
    use serde_json::json;

    fn groups() -> Vec<OptionGroup> {
        vec![
            OptionGroup::new("Target")
                .with_description("At least one of these options has to be provided")
                .with_option(
                    OptionSpec::new("url", OptionType::String)
                        .with_flags(["-u", "--url"])
                        .with_help("Target URL"),
                )
                .with_option(OptionSpec::new("level", OptionType::Int)),
            OptionGroup::new("General").with_option(OptionSpec::new("batch", OptionType::Boolean)),
        ]
    }

    #[test]
    fn test_sections_follow_schema_order() {
        let walked = SchemaWalker::build(&groups(), &DefaultsRegistry::new()).unwrap();
        let titles: Vec<_> = walked.tabs.pages().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Target", "General"]);

        let target = &walked.tabs.pages()[0];
        assert_eq!(target.rows[0], Row::Spacer);
        assert_eq!(
            target.rows[1],
            Row::Header("At least one of these options has to be provided:".to_string())
        );
        assert_eq!(target.rows[2], Row::Spacer);
        assert_eq!(
            target.rows[3],
            Row::Option {
                key: BindingKey::new("url", OptionType::String),
                label: "-u URL, --url=URL".to_string(),
                help: "Target URL".to_string(),
            }
        );
        assert_eq!(target.rows.last(), Some(&Row::Spacer));
        assert_eq!(target.required_height(), 6);

        let keys: Vec<_> = target.option_keys().map(|k| k.dest.as_str()).collect();
        assert_eq!(keys, vec!["url", "level"]);
    }

    #[test]
    fn test_every_option_is_bound() {
        let walked = SchemaWalker::build(&groups(), &DefaultsRegistry::new()).unwrap();
        assert_eq!(walked.bindings.len(), 3);
        assert!(walked.bindings.contains(&BindingKey::new("batch", OptionType::Boolean)));
    }

    #[test]
    fn test_first_control_and_height() {
        let groups = vec![
            OptionGroup::new("Empty"),
            OptionGroup::new("Detection").with_option(OptionSpec::new("level", OptionType::Int)),
        ];
        let walked = SchemaWalker::build(&groups, &DefaultsRegistry::new()).unwrap();
        assert_eq!(
            walked.first,
            Some(FocusTarget {
                key: BindingKey::new("level", OptionType::Int),
                tab: 1,
            })
        );
        assert_eq!(walked.tabs.height(), 2);
    }

    #[test]
    fn test_defaults_prefill_controls() {
        let mut defaults = DefaultsRegistry::new();
        defaults.set("level", json!(3));
        let walked = SchemaWalker::build(&groups(), &defaults).unwrap();
        let level = walked
            .bindings
            .get(&BindingKey::new("level", OptionType::Int))
            .unwrap();
        assert_eq!(level.text(), Some("3"));
    }

    #[test]
    fn test_same_dest_different_type_kept() {
        let groups = vec![
            OptionGroup::new("A")
                .with_option(OptionSpec::new("mode", OptionType::String))
                .with_option(OptionSpec::new("mode", OptionType::Int)),
        ];
        let walked = SchemaWalker::build(&groups, &DefaultsRegistry::new()).unwrap();
        assert_eq!(walked.bindings.len(), 2);
    }

    #[test]
    fn test_exact_duplicate_rejected() {
        let groups = vec![
            OptionGroup::new("A").with_option(OptionSpec::new("mode", OptionType::Int)),
            OptionGroup::new("B").with_option(OptionSpec::new("mode", OptionType::Int)),
        ];
        let err = SchemaWalker::build(&groups, &DefaultsRegistry::new())
            .err()
            .unwrap();
        assert!(matches!(err, FormError::DuplicateBinding { ref dest, .. } if dest == "mode"));
    }
}
