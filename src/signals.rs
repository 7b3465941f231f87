//! Signal-driven advance source for the picker.
//!
//! Losing picker invocations send the elected process SIGUSR1 (advance
//! forward) or SIGUSR2 (advance backward).  Signal handlers must not touch
//! UI state, so delivery uses the self-pipe trick: the handler writes a
//! single byte to a pipe and nothing else, and a dedicated thread blocks
//! reading the pipe, translating bytes into [`Advance`] messages on an
//! [`mpsc`](std::sync::mpsc) channel.  The UI loop drains that channel
//! between frames, so cursor mutation never interleaves with rendering.

use crate::cursor::Advance;
use log::info;
use nix::errno::Errno;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd::{pipe, read, write};
use std::os::fd::{BorrowedFd, IntoRawFd, OwnedFd};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::mpsc;

/// Errors from installing the handlers or reading the pipe.
#[derive(Debug, thiserror::Error)]
#[error("signal setup error: {0}")]
pub struct SignalError(#[from] Errno);

/// Write end of the self-pipe, shared with the signal handlers.
///
/// Set once by [`SignalAdvanceSource::install`] and never changed; the fd
/// intentionally lives for the rest of the process.
static PIPE_WRITE_FD: AtomicI32 = AtomicI32::new(-1);

const FORWARD_BYTE: u8 = b'+';
const BACKWARD_BYTE: u8 = b'-';

extern "C" fn on_sigusr1(_: nix::libc::c_int) {
    notify(FORWARD_BYTE);
}

extern "C" fn on_sigusr2(_: nix::libc::c_int) {
    notify(BACKWARD_BYTE);
}

/// Async-signal-safe: a single `write(2)`, nothing else.
fn notify(byte: u8) {
    let fd = PIPE_WRITE_FD.load(Ordering::Relaxed);
    if fd >= 0 {
        let fd = unsafe { BorrowedFd::borrow_raw(fd) };
        let _ = write(fd, &[byte]);
    }
}

fn advance_for_byte(byte: u8) -> Option<Advance> {
    match byte {
        FORWARD_BYTE => Some(Advance::Forward),
        BACKWARD_BYTE => Some(Advance::Backward),
        _ => None,
    }
}

/// Blocking source of [`Advance`] messages, fed by SIGUSR1/SIGUSR2.
///
/// Mirrors the contract of a command source: [`run`](Self::run) blocks
/// forever on its own thread, forwarding each advance into `sink` exactly
/// once, and returns when the receiving side hangs up.
pub struct SignalAdvanceSource {
    pipe_read: OwnedFd,
}

impl SignalAdvanceSource {
    /// Create the self-pipe and install the SIGUSR1/SIGUSR2 handlers.
    ///
    /// Call once, before the election result is acted on, so a signal from
    /// a racing invocation is never lost.
    pub fn install() -> Result<Self, SignalError> {
        let (pipe_read, pipe_write) = pipe()?;
        PIPE_WRITE_FD.store(pipe_write.into_raw_fd(), Ordering::SeqCst);

        let forward = SigAction::new(
            SigHandler::Handler(on_sigusr1),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        let backward = SigAction::new(
            SigHandler::Handler(on_sigusr2),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        unsafe {
            sigaction(Signal::SIGUSR1, &forward)?;
            sigaction(Signal::SIGUSR2, &backward)?;
        }
        info!("advance signal handlers installed (pid {})", std::process::id());
        Ok(Self { pipe_read })
    }

    /// Read the pipe forever, forwarding advances into `sink`.
    ///
    /// This method blocks the calling thread; run it on a dedicated one.
    pub fn run(self, sink: mpsc::Sender<Advance>) -> Result<(), SignalError> {
        let mut buf = [0u8; 1];
        loop {
            match read(&self.pipe_read, &mut buf) {
                Ok(0) => return Ok(()),
                Ok(_) => {
                    if let Some(advance) = advance_for_byte(buf[0]) {
                        if sink.send(advance).is_err() {
                            return Ok(());
                        }
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn byte_mapping() {
        assert_eq!(advance_for_byte(FORWARD_BYTE), Some(Advance::Forward));
        assert_eq!(advance_for_byte(BACKWARD_BYTE), Some(Advance::Backward));
        assert_eq!(advance_for_byte(b'x'), None);
    }

    #[test]
    fn signals_become_advance_messages() {
        let source = SignalAdvanceSource::install().unwrap();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = source.run(tx);
        });

        nix::sys::signal::raise(Signal::SIGUSR1).unwrap();
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            Advance::Forward
        );

        nix::sys::signal::raise(Signal::SIGUSR2).unwrap();
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            Advance::Backward
        );
    }
}
