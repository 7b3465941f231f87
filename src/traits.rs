//! Core traits that decouple i3mru from i3 itself and from any specific
//! UI toolkit.
//!
//! The daemon loop only depends on [`WorkspaceEvents`], the picker only on
//! [`WorkspaceCommander`] and [`PickerUi`].  Concrete implementations live
//! in [`i3`](crate::i3) (hand-rolled i3 IPC) and [`picker`](crate::picker)
//! (GTK4, feature-gated); tests substitute scripted doubles.

use crate::cursor::{Advance, CursorState};
use crate::tracker::WorkspaceEvent;
use std::sync::mpsc;

/// Abstraction over a window manager that can switch workspaces by name.
pub trait WorkspaceCommander {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Switch focus to the workspace called `name`.
    fn switch_to(&self, name: &str) -> Result<(), Self::Error>;
}

/// A blocking stream of workspace lifecycle events.
///
/// # Contract
///
/// * [`next_event`](WorkspaceEvents::next_event) blocks until an event
///   arrives or the underlying transport fails.
/// * A returned error means the connection is dead; the caller must
///   discard its history, reconnect, and resubscribe.
pub trait WorkspaceEvents {
    /// The error type produced by this event source.
    type Error: std::error::Error + Send + 'static;

    /// Block until the next workspace event arrives.
    fn next_event(&mut self) -> Result<WorkspaceEvent, Self::Error>;
}

/// A transient picker UI.
///
/// # Contract
///
/// * [`run`](PickerUi::run) presents a list of the snapshot's names with
///   the entry at the cursor highlighted, then blocks.
/// * Messages arriving on `advances` move the cursor and trigger a
///   redraw; they must be applied on the UI thread, never concurrently
///   with rendering.
/// * When the modifier key is released the window is dismissed and the
///   name under the cursor is returned; the caller commits the switch.
pub trait PickerUi {
    /// The error type produced by this UI.
    type Error: std::error::Error + Send + 'static;

    /// Show the picker and block until the release condition fires.
    fn run(
        &mut self,
        cursor: CursorState,
        advances: mpsc::Receiver<Advance>,
    ) -> Result<String, Self::Error>;
}
