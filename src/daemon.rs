//! The history-tracking daemon loop.
//!
//! Single-threaded by design: events are pulled from the subscription one
//! at a time and applied in arrival order, so the history is never mutated
//! concurrently.  A dropped i3 connection invalidates the history (it no
//! longer reflects reality), so each session starts from a clean slate and
//! reconnection retries forever with a fixed backoff.

use crate::tracker::HistoryTracker;
use crate::traits::WorkspaceEvents;
use log::{error, info};
use std::path::PathBuf;
use std::time::Duration;

/// Delay between reconnection attempts after a transport fault.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Owns the tracker and drives it from a workspace-event subscription.
pub struct Daemon {
    tracker: HistoryTracker,
}

impl Daemon {
    /// Create a daemon persisting to `history_path`, with an optional
    /// history capacity.
    pub fn new(history_path: PathBuf, capacity: Option<usize>) -> Self {
        Self {
            tracker: HistoryTracker::new(history_path, capacity),
        }
    }

    /// Process events from one live subscription until it fails.
    ///
    /// Starts from an empty history (and removes the persisted file):
    /// whatever was tracked before this subscription existed cannot be
    /// trusted.  Returns the transport error that ended the session.
    pub fn run_session<E: WorkspaceEvents>(&mut self, events: &mut E) -> E::Error {
        self.tracker.reset();
        loop {
            match events.next_event() {
                Ok(event) => {
                    self.tracker.handle(event);
                }
                Err(e) => return e,
            }
        }
    }

    /// Run forever: subscribe, track, and resubscribe after faults.
    pub fn run_forever<E, C>(mut self, mut connect: C) -> !
    where
        E: WorkspaceEvents,
        C: FnMut() -> Result<E, E::Error>,
    {
        loop {
            let mut events = match connect() {
                Ok(events) => events,
                Err(e) => {
                    error!("subscribe failed: {}; retrying in {:?}", e, RECONNECT_BACKOFF);
                    std::thread::sleep(RECONNECT_BACKOFF);
                    continue;
                }
            };
            info!("subscribed to workspace events");
            let err = self.run_session(&mut events);
            error!(
                "i3 connection lost: {}; reconnecting in {:?}",
                err, RECONNECT_BACKOFF
            );
            std::thread::sleep(RECONNECT_BACKOFF);
        }
    }

    #[cfg(test)]
    fn tracker(&self) -> &HistoryTracker {
        &self.tracker
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{load_names, WorkspaceRef};
    use crate::tracker::WorkspaceEvent;

    #[derive(Debug, thiserror::Error)]
    #[error("connection dropped")]
    struct Dropped;

    /// Replays a fixed event sequence, then fails like a dead socket.
    struct ScriptedEvents {
        events: Vec<WorkspaceEvent>,
    }

    impl WorkspaceEvents for ScriptedEvents {
        type Error = Dropped;

        fn next_event(&mut self) -> Result<WorkspaceEvent, Dropped> {
            if self.events.is_empty() {
                Err(Dropped)
            } else {
                Ok(self.events.remove(0))
            }
        }
    }

    fn focus(id: i64, name: &str, old: Option<(i64, &str)>) -> WorkspaceEvent {
        WorkspaceEvent::Focus {
            current: WorkspaceRef::new(id, name),
            old: old.map(|(id, name)| WorkspaceRef::new(id, name)),
        }
    }

    #[test]
    fn session_applies_events_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        let mut daemon = Daemon::new(path.clone(), None);

        let mut events = ScriptedEvents {
            events: vec![
                focus(2, "2", Some((1, "1"))),
                focus(3, "3", Some((2, "2"))),
                WorkspaceEvent::Unknown,
            ],
        };
        daemon.run_session(&mut events);

        let names: Vec<_> = daemon.tracker().history().names().collect();
        assert_eq!(names, vec!["3", "2", "1"]);
        assert_eq!(load_names(&path).unwrap(), vec!["3", "2", "1"]);
    }

    #[test]
    fn session_start_discards_previous_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        let mut daemon = Daemon::new(path.clone(), None);

        let mut first = ScriptedEvents {
            events: vec![focus(1, "stale", None)],
        };
        daemon.run_session(&mut first);
        assert!(path.exists());

        // A new session must not see (or leave readable) stale entries.
        let mut second = ScriptedEvents {
            events: vec![focus(2, "fresh", None)],
        };
        daemon.run_session(&mut second);

        let names: Vec<_> = daemon.tracker().history().names().collect();
        assert_eq!(names, vec!["fresh"]);
        assert_eq!(load_names(&path).unwrap(), vec!["fresh"]);
    }

    #[test]
    fn session_with_no_events_leaves_no_history_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        std::fs::write(&path, "left over\n").unwrap();

        let mut daemon = Daemon::new(path.clone(), None);
        let mut events = ScriptedEvents { events: vec![] };
        daemon.run_session(&mut events);

        assert!(!path.exists(), "stale file must be removed at session start");
    }
}
