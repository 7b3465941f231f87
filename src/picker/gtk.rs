//! GTK4 picker window.
//!
//! A plain undecorated toplevel holding a `GtkListBox`, one row per
//! history entry, with the row at the cursor selected.  Advance messages
//! are drained on a ~60 fps GLib timeout (never from the signal handler
//! itself), and releasing the configured modifier key dismisses the
//! window and hands the selected name back to the caller.
//!
//! # CSS selectors
//!
//! | Selector             | Targets                       |
//! |----------------------|-------------------------------|
//! | `window.picker`      | The picker window             |
//! | `.picker-list`       | The `GtkListBox`              |
//! | `.picker-list row`   | Every entry                   |
//!
//! Passthrough `key=value` options from the command line are injected as
//! raw CSS declarations on `.picker-list row` (e.g. `color=white
//! font-size=14px`).

use crate::cursor::{Advance, CursorState};
use crate::traits::PickerUi;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

//  Default CSS

const DEFAULT_CSS: &str = r#"
window.picker {
    background-color: rgba(24, 24, 24, 0.95);
}

.picker-list {
    background-color: transparent;
    padding: 6px;
}

.picker-list row {
    padding: 4px 12px;
    color: rgba(255, 255, 255, 0.85);
}

.picker-list row:selected {
    background-color: rgba(255, 255, 255, 0.25);
    border-radius: 4px;
}
"#;

/// Errors from the GTK picker.
#[derive(Debug, thiserror::Error)]
pub enum GtkUiError {
    #[error("failed to initialise GTK4: {0}")]
    Init(String),
    #[error("picker window closed without a selection")]
    NoSelection,
}

/// [`PickerUi`] backed by GTK4.
pub struct GtkPickerUi {
    release_key: String,
    style_options: Vec<(String, String)>,
}

impl GtkPickerUi {
    /// `release_key` is the GDK key name whose release commits
    /// (e.g. `"Super_L"`); `style_options` are raw CSS declarations for
    /// the list rows.
    pub fn new(release_key: impl Into<String>, style_options: Vec<(String, String)>) -> Self {
        Self {
            release_key: release_key.into(),
            style_options,
        }
    }
}

impl PickerUi for GtkPickerUi {
    type Error = GtkUiError;

    fn run(
        &mut self,
        cursor: CursorState,
        advances: mpsc::Receiver<Advance>,
    ) -> Result<String, GtkUiError> {
        gtk4::init().map_err(|e| GtkUiError::Init(e.to_string()))?;
        load_css(&build_css(&self.style_options));

        let window = gtk4::Window::new();
        window.set_title(Some("i3mru"));
        window.set_decorated(false);
        window.set_resizable(false);
        window.add_css_class("picker");

        let list = gtk4::ListBox::new();
        list.add_css_class("picker-list");
        list.set_selection_mode(gtk4::SelectionMode::Single);
        for name in cursor.names() {
            let label = gtk4::Label::new(Some(name));
            label.set_xalign(0.0);
            list.append(&label);
        }
        window.set_child(Some(&list));

        select_index(&list, cursor.cursor());

        let main_loop = glib::MainLoop::new(None, false);
        let cursor = Rc::new(RefCell::new(cursor));
        let selected: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));

        //  Commit on modifier release
        let key_controller = gtk4::EventControllerKey::new();
        {
            let cursor = Rc::clone(&cursor);
            let selected = Rc::clone(&selected);
            let main_loop = main_loop.clone();
            let window = window.clone();
            let release_key = self.release_key.clone();
            key_controller.connect_key_released(move |_, keyval, _, _| {
                if key_name_matches(keyval, &release_key) {
                    let name = cursor.borrow().selected().to_string();
                    debug!("modifier released, committing {:?}", name);
                    *selected.borrow_mut() = Some(name);
                    window.set_visible(false);
                    main_loop.quit();
                }
            });
        }
        window.add_controller(key_controller);

        //  Bail out if the window is closed some other way
        {
            let main_loop = main_loop.clone();
            window.connect_close_request(move |_| {
                warn!("picker window closed before commit");
                main_loop.quit();
                glib::Propagation::Proceed
            });
        }

        //  Drain advance messages between frames (~60 fps)
        {
            let cursor = Rc::clone(&cursor);
            let list = list.clone();
            glib::timeout_add_local(Duration::from_millis(16), move || {
                loop {
                    match advances.try_recv() {
                        Ok(advance) => {
                            let index = cursor.borrow_mut().step(advance);
                            select_index(&list, index);
                        }
                        Err(mpsc::TryRecvError::Empty) => break,
                        Err(mpsc::TryRecvError::Disconnected) => {
                            return glib::ControlFlow::Break;
                        }
                    }
                }
                glib::ControlFlow::Continue
            });
        }

        window.present();
        info!("picker shown ({} entries)", cursor.borrow().names().len());
        main_loop.run();

        selected.borrow_mut().take().ok_or(GtkUiError::NoSelection)
    }
}

//  Helpers

fn select_index(list: &gtk4::ListBox, index: usize) {
    match list.row_at_index(index as i32) {
        Some(row) => list.select_row(Some(&row)),
        None => warn!("no row at index {}", index),
    }
}

fn key_name_matches(keyval: gdk::Key, expected: &str) -> bool {
    keyval.name().map(|n| n == expected).unwrap_or(false)
}

/// Built-in CSS plus one declaration per passthrough option.
fn build_css(style_options: &[(String, String)]) -> String {
    if style_options.is_empty() {
        return DEFAULT_CSS.to_string();
    }
    let mut css = String::from(DEFAULT_CSS);
    css.push_str("\n.picker-list row {\n");
    for (key, value) in style_options {
        css.push_str(&format!("    {}: {};\n", key, value));
    }
    css.push_str("}\n");
    css
}

fn load_css(css: &str) {
    let provider = gtk4::CssProvider::new();
    #[allow(deprecated)]
    provider.load_from_data(css);

    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    } else {
        warn!("no GDK display — CSS will not be applied");
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_css_appends_user_declarations() {
        let css = build_css(&[
            ("color".to_string(), "white".to_string()),
            ("font-size".to_string(), "14px".to_string()),
        ]);
        assert!(css.contains("color: white;"));
        assert!(css.contains("font-size: 14px;"));
        assert!(css.starts_with(DEFAULT_CSS));
    }

    #[test]
    fn build_css_without_options_is_the_default() {
        assert_eq!(build_css(&[]), DEFAULT_CSS);
    }
}
