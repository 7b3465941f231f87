//! Picker UI implementations.
//!
//! When the `picker-gtk` feature is enabled, [`gtk::GtkPickerUi`] presents
//! the history as a GTK4 list and drives cursor moves from the advance
//! channel on the GLib main loop.  Without the feature the binary can
//! still run the daemon and take part in elections, but cannot show a
//! window.

#[cfg(feature = "picker-gtk")]
pub mod gtk;
