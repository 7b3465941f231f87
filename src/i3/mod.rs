//! i3-specific implementations.
//!
//! This module provides concrete backends for the
//! [`WorkspaceCommander`](crate::traits::WorkspaceCommander) and
//! [`WorkspaceEvents`](crate::traits::WorkspaceEvents) traits, powered by
//! i3's IPC socket.
//!
//! Nothing outside this module should reference i3 directly.

pub mod ipc;
pub mod wm;
