//! **i3mru** — a most-recently-used workspace switcher for i3.
//!
//! One binary, two modes.  The daemon (`--daemon`) subscribes to i3
//! workspace events and maintains an MRU history of workspace names,
//! persisted under `$XDG_RUNTIME_DIR`.  The picker (default mode) reads
//! that history, elects a single live instance via an advisory-locked PID
//! file, shows a transient list, advances its cursor when further
//! invocations signal it, and switches to the selected workspace when the
//! modifier key is released.
//!
//! # Architecture
//!
//! The crate is organised around three seams in [`traits`]:
//!
//! * [`traits::WorkspaceEvents`] — the daemon's blocking event stream.
//! * [`traits::WorkspaceCommander`] — "switch to workspace by name".
//! * [`traits::PickerUi`] — the transient list window.
//!
//! Concrete backends live in [`i3`] (hand-rolled i3 IPC) and [`picker`]
//! (GTK4, behind the `picker-gtk` feature); the state machines in
//! [`tracker`], [`instance`] and [`cursor`] never touch a socket or a
//! widget.

pub mod config;
pub mod cursor;
pub mod daemon;
pub mod history;
pub mod i3;
pub mod instance;
pub mod picker;
pub mod signals;
pub mod tracker;
pub mod traits;
