//! [`WorkspaceCommander`] and [`WorkspaceEvents`] implementations backed
//! by i3 IPC.
//!
//! [`I3Wm`] opens a short-lived connection per command (the picker only
//! ever issues one).  [`I3Events`] holds a long-lived subscription the
//! daemon blocks on; when it errors the connection is dead and the caller
//! reconnects.

use crate::history::WorkspaceRef;
use crate::i3::ipc::{I3IpcError, I3Stream, EVENT_MASK, EVENT_WORKSPACE, RUN_COMMAND, SUBSCRIBE};
use crate::tracker::WorkspaceEvent;
use crate::traits::{WorkspaceCommander, WorkspaceEvents};
use log::{debug, warn};
use serde::Deserialize;

//  Minimal serde structs for the JSON we care about

/// Subset of the reply to `RUN_COMMAND` (an array of these).
#[derive(Deserialize)]
struct CommandOutcomeJson {
    success: bool,
    error: Option<String>,
}

/// Subset of the reply to `SUBSCRIBE`.
#[derive(Deserialize)]
struct SubscribeReplyJson {
    success: bool,
}

/// Subset of a workspace node inside an event payload.
#[derive(Deserialize)]
struct WorkspaceNodeJson {
    id: i64,
    name: Option<String>,
}

/// Subset of the `workspace` event payload.
#[derive(Deserialize)]
struct WorkspaceEventJson {
    change: String,
    current: Option<WorkspaceNodeJson>,
    old: Option<WorkspaceNodeJson>,
}

impl WorkspaceNodeJson {
    fn into_ref(self) -> WorkspaceRef {
        WorkspaceRef::new(self.id, self.name.unwrap_or_default())
    }
}

/// Decode one `workspace` event payload.
///
/// Kinds we do not model, and modeled kinds missing their `current` node,
/// map to [`WorkspaceEvent::Unknown`] so the tracker ignores them.
fn parse_workspace_event(payload: &str) -> Result<WorkspaceEvent, I3IpcError> {
    let event: WorkspaceEventJson = serde_json::from_str(payload)?;
    let Some(current) = event.current else {
        return Ok(WorkspaceEvent::Unknown);
    };
    Ok(match event.change.as_str() {
        "focus" => WorkspaceEvent::Focus {
            current: current.into_ref(),
            old: event.old.map(WorkspaceNodeJson::into_ref),
        },
        "rename" => WorkspaceEvent::Rename {
            current: current.into_ref(),
        },
        "empty" => WorkspaceEvent::Empty {
            current: current.into_ref(),
        },
        _ => WorkspaceEvent::Unknown,
    })
}

/// Quote a workspace name for the i3 command language.
fn quote_name(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

//  Commander

/// i3-backed workspace commander.
///
/// Each call opens a short-lived IPC request, mirroring how rarely the
/// picker talks to i3 (exactly once, at commit).
pub struct I3Wm;

impl Default for I3Wm {
    fn default() -> Self {
        Self
    }
}

impl I3Wm {
    pub fn new() -> Self {
        Self
    }
}

impl WorkspaceCommander for I3Wm {
    type Error = I3IpcError;

    fn switch_to(&self, name: &str) -> Result<(), Self::Error> {
        let mut stream = I3Stream::connect()?;
        let command = format!("workspace {}", quote_name(name));
        debug!("run_command: {}", command);
        stream.send(RUN_COMMAND, &command)?;

        let (_, payload) = stream.recv()?;
        let outcomes: Vec<CommandOutcomeJson> = serde_json::from_str(&payload)?;
        match outcomes.iter().find(|o| !o.success) {
            Some(failed) => Err(I3IpcError::Protocol(format!(
                "command failed: {}",
                failed.error.as_deref().unwrap_or("unknown error")
            ))),
            None => Ok(()),
        }
    }
}

//  Event subscription

/// A live subscription to i3 `workspace` events.
pub struct I3Events {
    stream: I3Stream,
}

impl I3Events {
    /// Connect and subscribe to workspace events.
    pub fn subscribe() -> Result<Self, I3IpcError> {
        let mut stream = I3Stream::connect()?;
        stream.send(SUBSCRIBE, r#"["workspace"]"#)?;
        let (_, payload) = stream.recv()?;
        let reply: SubscribeReplyJson = serde_json::from_str(&payload)?;
        if !reply.success {
            return Err(I3IpcError::Protocol("subscribe rejected".into()));
        }
        Ok(Self { stream })
    }
}

impl WorkspaceEvents for I3Events {
    type Error = I3IpcError;

    fn next_event(&mut self) -> Result<WorkspaceEvent, Self::Error> {
        loop {
            let (msg_type, payload) = self.stream.recv()?;
            if msg_type & EVENT_MASK == 0 {
                // A stray reply on the event connection; nothing uses it.
                continue;
            }
            if msg_type != EVENT_WORKSPACE {
                continue;
            }
            match parse_workspace_event(&payload) {
                Ok(event) => return Ok(event),
                Err(e) => {
                    // Malformed events are logged and skipped, never fatal.
                    warn!("unparseable workspace event: {}", e);
                }
            }
        }
    }
}

//  Tests
