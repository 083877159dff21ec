//! Terminal frontend built on Cursive.
//!
//! The [`FormSession`] lives in the Cursive user data. Views only mirror
//! it: every edit goes through the session, and the tab body is rebuilt
//! from it whenever the selected tab changes.

/// URL opening for the `Help` menu.
pub mod links;

use std::{io::IsTerminal, sync::Arc};

use cursive::{
    Cursive, CursiveExt,
    event::Key,
    menu,
    view::{Nameable, Resizable, Scrollable, SizeConstraint},
    views::{Button, Checkbox, Dialog, EditView, LinearLayout, ResizedView, ScrollView, TextView},
};

use crate::{
    config::FormConfig,
    error::FormError,
    form::{
        session::FormSession,
        tabs::TabPage,
        walker::{BindingKey, Row, Section},
        widget::Control,
    },
};

pub use links::{LinkOpener, SystemBrowser};

const TAB_STRIP: &str = "tab-strip";
const TAB_BODY: &str = "tab-body";
const TEXT_WIDTH: usize = 24;

type TabBody = ResizedView<ScrollView<LinearLayout>>;

/// Fail early when no interactive terminal is attached.
pub fn ensure_terminal() -> Result<(), FormError> {
    if std::io::stdin().is_terminal() && std::io::stdout().is_terminal() {
        Ok(())
    } else {
        Err(FormError::MissingDependency(
            "an interactive terminal is required".to_string(),
        ))
    }
}

/// Show the form and block until it is submitted or closed.
///
/// Returns the session in its final state; a session closed without
/// submission is marked cancelled.
pub fn show(
    session: FormSession,
    config: &FormConfig,
    opener: Arc<dyn LinkOpener>,
) -> anyhow::Result<FormSession> {
    #[cfg(feature = "logging")]
    {
        cursive::logger::init();
        cursive::logger::set_filter_levels_from_env();
    }

    let mut siv = Cursive::default();

    install_menubar(&mut siv, config, opener);
    siv.add_global_callback(Key::Esc, |s| s.select_menubar());
    siv.add_global_callback(Key::PageDown, |s| move_tab(s, |session| session.next_tab()));
    siv.add_global_callback(Key::PageUp, |s| move_tab(s, |session| session.previous_tab()));
    #[cfg(feature = "logging")]
    siv.add_global_callback('~', Cursive::toggle_debug_console);

    let title = config.window_title(session.title()).to_string();
    let focus = session.first().cloned();
    let layer = form_view(&session, title);

    siv.set_user_data(session);
    siv.add_layer(layer);

    if let Some(target) = focus {
        move_tab(&mut siv, |session| session.select_tab(target.tab));
        if siv.focus_name(&control_name(&target.key)).is_err() {
            debug!("no view for first control `{}`", target.key.dest);
        }
    }

    siv.run();

    let mut session = siv
        .take_user_data::<FormSession>()
        .ok_or_else(|| anyhow::anyhow!("form session lost"))?;
    session.cancel();
    Ok(session)
}

fn install_menubar(siv: &mut Cursive, config: &FormConfig, opener: Arc<dyn LinkOpener>) {
    let mut help = menu::Tree::new();
    for link in &config.links {
        let url = link.url.clone();
        let opener = opener.clone();
        help.add_leaf(link.label.clone(), move |_| opener.open(&url));
    }
    if !config.links.is_empty() {
        help.add_delimiter();
    }
    let about = config.about.clone();
    help.add_leaf("About", move |s| {
        s.add_layer(Dialog::info(about.clone()).title("About"));
    });

    siv.menubar()
        .add_subtree("File", menu::Tree::new().leaf("Exit", cancel))
        .add_leaf("Run", submit)
        .add_subtree("Help", help);
    siv.set_autohide_menu(false);
}

fn submit(s: &mut Cursive) {
    match s.with_user_data(|session: &mut FormSession| session.submit().map(|r| r.len())) {
        Some(Err(e)) => {
            s.add_layer(Dialog::info(e.to_string()).title("Invalid value"));
        }
        _ => s.quit(),
    }
}

fn cancel(s: &mut Cursive) {
    s.with_user_data(|session: &mut FormSession| session.cancel());
    s.quit();
}

fn form_view(session: &FormSession, title: String) -> Dialog {
    let body = section_view(session).scrollable();
    let layout = LinearLayout::vertical()
        .child(tab_strip(session).with_name(TAB_STRIP))
        .child(ResizedView::with_fixed_height(session.tabs().height(), body).with_name(TAB_BODY));

    Dialog::around(layout)
        .title(title)
        .button("Run", submit)
        .button("Exit", cancel)
}

fn tab_strip(session: &FormSession) -> LinearLayout {
    let tabs = session.tabs();
    let mut strip = LinearLayout::horizontal();
    for (index, page) in tabs.pages().iter().enumerate() {
        let label = if index == tabs.selected() {
            format!("<{}>", page.title())
        } else {
            format!(" {} ", page.title())
        };
        strip.add_child(Button::new_raw(label, move |s| {
            move_tab(s, |session| session.select_tab(index))
        }));
    }
    strip
}

fn section_view(session: &FormSession) -> LinearLayout {
    let mut layout = LinearLayout::vertical();
    let Some(section) = session.tabs().selected_page() else {
        return layout;
    };
    let label_width = label_width(section);

    for row in &section.rows {
        match row {
            Row::Spacer => {
                layout.add_child(TextView::new(" "));
            }
            Row::Header(text) => {
                layout.add_child(TextView::new(text.clone()));
            }
            Row::Option { key, label, help } => {
                let mut line = LinearLayout::horizontal()
                    .child(TextView::new(format!("{label} ")).fixed_width(label_width));
                match session.control(key) {
                    Some(Control::Text(input)) => {
                        let key = key.clone();
                        let name = control_name(&key);
                        let edit = EditView::new()
                            .content(input.content())
                            .on_edit(move |s, text, _| on_text_edit(s, &key, text))
                            .with_name(name)
                            .fixed_width(TEXT_WIDTH);
                        line.add_child(edit);
                    }
                    Some(Control::Toggle(toggle)) => {
                        let key = key.clone();
                        let name = control_name(&key);
                        let checkbox = Checkbox::new()
                            .with_checked(toggle.is_checked())
                            .on_change(move |s, checked| on_toggle(s, &key, checked))
                            .with_name(name);
                        line.add_child(checkbox);
                    }
                    None => {}
                }
                line.add_child(TextView::new(format!(" {help}")));
                layout.add_child(line);
            }
        }
    }

    layout
}

fn label_width(section: &Section) -> usize {
    section
        .rows
        .iter()
        .filter_map(|row| match row {
            Row::Option { label, .. } => Some(label.chars().count() + 1),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

fn control_name(key: &BindingKey) -> String {
    format!("opt:{}:{}", key.dest, key.kind)
}

fn on_text_edit(s: &mut Cursive, key: &BindingKey, text: &str) {
    match s.with_user_data(|session: &mut FormSession| session.input(key, text)) {
        Some(Ok(shown)) if shown != text => {
            s.call_on_name(&control_name(key), |view: &mut EditView| {
                // The session already holds `shown`; the returned callback
                // would only re-enter this handler with the same text.
                let _ = view.set_content(shown);
            });
        }
        Some(Err(e)) => warn!("edit of `{}` dropped: {e}", key.dest),
        _ => {}
    }
}

fn on_toggle(s: &mut Cursive, key: &BindingKey, checked: bool) {
    if let Some(Err(e)) = s.with_user_data(|session: &mut FormSession| session.toggle(key, checked)) {
        warn!("toggle of `{}` dropped: {e}", key.dest);
    }
}

/// Apply a tab move to the session, then rebuild the strip and the body
/// at the height the session reports.
fn move_tab<F>(s: &mut Cursive, f: F)
where
    F: FnOnce(&mut FormSession) -> Result<usize, FormError>,
{
    let rebuilt = s.with_user_data(|session: &mut FormSession| {
        f(session)
            .ok()
            .map(|height| (tab_strip(session), section_view(session), height))
    });
    let Some(Some((strip, body, height))) = rebuilt else {
        return;
    };

    s.call_on_name(TAB_STRIP, |view: &mut LinearLayout| *view = strip);
    s.call_on_name(TAB_BODY, |view: &mut TabBody| {
        *view.get_inner_mut() = body.scrollable();
        view.set_height(SizeConstraint::Fixed(height));
    });
}
