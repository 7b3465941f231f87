//! Low-level i3 IPC framing.
//!
//! Communicates directly with i3 through its Unix socket at `$I3SOCK`,
//! avoiding any shell command invocation or third-party crate for the
//! protocol.
//!
//! # Wire format
//!
//! Every message, in both directions, is framed as
//!
//! ```text
//! "i3-ipc" <u32 payload length> <u32 message type> <payload>
//! ```
//!
//! with the integers in native byte order.  Event messages coming back
//! from i3 have the high bit of the type set.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;

/// Magic bytes prefixing every frame.
pub const MAGIC: &[u8; 6] = b"i3-ipc";

/// `RUN_COMMAND` message type.
pub const RUN_COMMAND: u32 = 0;
/// `SUBSCRIBE` message type.
pub const SUBSCRIBE: u32 = 2;
/// High bit distinguishing events from replies.
pub const EVENT_MASK: u32 = 0x8000_0000;
/// The `workspace` event (type 0 with the event bit set).
pub const EVENT_WORKSPACE: u32 = EVENT_MASK;

/// Errors that can occur when talking to i3.
#[derive(Debug, thiserror::Error)]
pub enum I3IpcError {
    #[error("I3SOCK not set (is i3 running?)")]
    NoSocketPath,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// A framed connection to the i3 IPC socket.
#[derive(Debug)]
pub struct I3Stream {
    stream: UnixStream,
}

impl I3Stream {
    /// Connect to the socket advertised in `$I3SOCK`.
    pub fn connect() -> Result<Self, I3IpcError> {
        let path = std::env::var("I3SOCK").map_err(|_| I3IpcError::NoSocketPath)?;
        Ok(Self::over(UnixStream::connect(path)?))
    }

    /// Wrap an already connected stream (tests use a socketpair).
    pub fn over(stream: UnixStream) -> Self {
        Self { stream }
    }

    /// Send one framed message.
    pub fn send(&mut self, msg_type: u32, payload: &str) -> Result<(), I3IpcError> {
        let payload = payload.as_bytes();
        let mut frame = Vec::with_capacity(MAGIC.len() + 8 + payload.len());
        frame.extend_from_slice(MAGIC);
        frame.extend_from_slice(&(payload.len() as u32).to_ne_bytes());
        frame.extend_from_slice(&msg_type.to_ne_bytes());
        frame.extend_from_slice(payload);
        self.stream.write_all(&frame)?;
        Ok(())
    }

    /// Block until one framed message arrives; returns `(type, payload)`.
    pub fn recv(&mut self) -> Result<(u32, String), I3IpcError> {
        let mut header = [0u8; 14];
        self.stream.read_exact(&mut header)?;
        if &header[..6] != MAGIC {
            return Err(I3IpcError::Protocol("bad magic".into()));
        }
        let len =
            u32::from_ne_bytes([header[6], header[7], header[8], header[9]]) as usize;
        let msg_type = u32::from_ne_bytes([header[10], header[11], header[12], header[13]]);

        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload)?;
        let payload = String::from_utf8(payload)
            .map_err(|e| I3IpcError::Protocol(format!("utf-8: {}", e)))?;
        Ok((msg_type, payload))
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trip_over_socketpair() {
        let (a, b) = UnixStream::pair().unwrap();
        let mut tx = I3Stream::over(a);
        let mut rx = I3Stream::over(b);

        tx.send(SUBSCRIBE, r#"["workspace"]"#).unwrap();
        let (msg_type, payload) = rx.recv().unwrap();
        assert_eq!(msg_type, SUBSCRIBE);
        assert_eq!(payload, r#"["workspace"]"#);
    }

    #[test]
    fn empty_payload_round_trips() {
        let (a, b) = UnixStream::pair().unwrap();
        let mut tx = I3Stream::over(a);
        let mut rx = I3Stream::over(b);

        tx.send(RUN_COMMAND, "").unwrap();
        let (msg_type, payload) = rx.recv().unwrap();
        assert_eq!(msg_type, RUN_COMMAND);
        assert_eq!(payload, "");
    }

    #[test]
    fn bad_magic_is_a_protocol_error() {
        let (mut a, b) = UnixStream::pair().unwrap();
        let mut rx = I3Stream::over(b);

        a.write_all(b"not-i3\0\0\0\0\0\0\0\0").unwrap();
        assert!(matches!(rx.recv(), Err(I3IpcError::Protocol(_))));
    }

    #[test]
    fn event_type_constants() {
        assert_eq!(EVENT_WORKSPACE & EVENT_MASK, EVENT_MASK);
        assert_eq!(EVENT_WORKSPACE & !EVENT_MASK, 0);
    }
}
