//! The workspace-event state machine.
//!
//! [`HistoryTracker`] consumes [`WorkspaceEvent`]s from the i3 connection
//! and applies them to a [`History`], persisting to disk after every
//! mutation that actually changed something.  Persisting synchronously
//! between events means a crash never loses more than the event currently
//! being processed.

use crate::history::{History, HistoryError, WorkspaceRef};
use log::{debug, warn};
use std::path::PathBuf;

/// A workspace lifecycle notification, already decoded from the i3 event
/// payload.
///
/// `Unknown` covers every `change` kind we do not model (`init`, `move`,
/// `urgent`, and whatever i3 grows next); the tracker treats it as a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// Focus moved to `current`; `old` is the workspace being left, if i3
    /// reported one.
    Focus {
        current: WorkspaceRef,
        old: Option<WorkspaceRef>,
    },
    /// `current` was renamed (the ref carries the new name).
    Rename { current: WorkspaceRef },
    /// `current` became empty and was destroyed by i3.
    Empty { current: WorkspaceRef },
    /// An event kind we do not model.
    Unknown,
}

/// Applies workspace events to a [`History`] and persists it on change.
pub struct HistoryTracker {
    history: History,
    history_path: PathBuf,
}

impl HistoryTracker {
    /// Create a tracker that persists to `history_path`.
    ///
    /// `capacity` bounds the history length; values below 2 disable the
    /// bound.
    pub fn new(history_path: PathBuf, capacity: Option<usize>) -> Self {
        Self {
            history: History::new(capacity),
            history_path,
        }
    }

    /// Current in-memory history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Drop the in-memory history and remove the persisted file.
    ///
    /// Called at daemon startup and after a dropped i3 connection: a stale
    /// history must never be readable while its events are not being
    /// tracked.
    pub fn reset(&mut self) {
        self.history.clear();
        if let Err(e) = std::fs::remove_file(&self.history_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("could not remove {}: {}", self.history_path.display(), e);
            }
        }
    }

    /// Apply one event.  Returns whether the history changed.
    ///
    /// When it did, the history has already been persisted (a persist
    /// failure is logged, not propagated — the daemon keeps running and
    /// the next successful persist repairs the file).
    pub fn handle(&mut self, event: WorkspaceEvent) -> bool {
        let changed = self.apply(event);
        if changed {
            if let Err(e) = self.history.save(&self.history_path) {
                warn!("persist failed: {}", e);
            }
        }
        changed
    }

    /// Pure state transition, no I/O.
    fn apply(&mut self, event: WorkspaceEvent) -> bool {
        match event {
            WorkspaceEvent::Focus { current, old } => {
                // On the very first transition, capture the workspace the
                // user is leaving so it becomes the natural switch-back
                // target.
                if self.history.is_empty() {
                    if let Some(old) = old {
                        self.history.promote(old);
                    }
                }
                debug!("focus -> {}", current.name);
                self.history.promote(current);
                true
            }
            WorkspaceEvent::Rename { current } => {
                let found = self.history.rename(current.id, &current.name);
                if found {
                    debug!("rename -> {}", current.name);
                }
                found
            }
            WorkspaceEvent::Empty { current } => {
                let removed = self.history.remove(current.id);
                if removed {
                    debug!("removed {}", current.name);
                }
                removed
            }
            WorkspaceEvent::Unknown => false,
        }
    }

    /// Persist the current (possibly empty) history unconditionally.
    pub fn persist(&self) -> Result<(), HistoryError> {
        self.history.save(&self.history_path)
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::load_names;

    fn ws(id: i64, name: &str) -> WorkspaceRef {
        WorkspaceRef::new(id, name)
    }

    fn tracker(dir: &tempfile::TempDir, capacity: Option<usize>) -> HistoryTracker {
        HistoryTracker::new(dir.path().join("history"), capacity)
    }

    #[test]
    fn focus_moves_workspace_to_front() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = tracker(&dir, None);

        t.handle(WorkspaceEvent::Focus {
            current: ws(1, "1"),
            old: None,
        });
        t.handle(WorkspaceEvent::Focus {
            current: ws(2, "2"),
            old: Some(ws(1, "1")),
        });
        t.handle(WorkspaceEvent::Focus {
            current: ws(1, "1"),
            old: Some(ws(2, "2")),
        });

        let names: Vec<_> = t.history().names().collect();
        assert_eq!(names, vec!["1", "2"]);
    }

    #[test]
    fn first_focus_seeds_old_workspace_at_index_one() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = tracker(&dir, None);

        t.handle(WorkspaceEvent::Focus {
            current: ws(2, "2"),
            old: Some(ws(1, "1")),
        });

        let names: Vec<_> = t.history().names().collect();
        assert_eq!(names, vec!["2", "1"]);
    }

    #[test]
    fn first_focus_without_old_seeds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = tracker(&dir, None);

        t.handle(WorkspaceEvent::Focus {
            current: ws(1, "1"),
            old: None,
        });
        assert_eq!(t.history().len(), 1);
    }

    #[test]
    fn focus_always_reports_changed_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = tracker(&dir, None);

        assert!(t.handle(WorkspaceEvent::Focus {
            current: ws(1, "1"),
            old: None,
        }));
        assert_eq!(
            load_names(&dir.path().join("history")).unwrap(),
            vec!["1"]
        );
    }

    #[test]
    fn rename_updates_name_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = tracker(&dir, None);

        t.handle(WorkspaceEvent::Focus {
            current: ws(1, "mail"),
            old: None,
        });
        t.handle(WorkspaceEvent::Focus {
            current: ws(2, "code"),
            old: Some(ws(1, "mail")),
        });

        assert!(t.handle(WorkspaceEvent::Rename {
            current: ws(1, "inbox"),
        }));
        let names: Vec<_> = t.history().names().collect();
        assert_eq!(names, vec!["code", "inbox"]);
        assert_eq!(
            load_names(&dir.path().join("history")).unwrap(),
            vec!["code", "inbox"]
        );
    }

    #[test]
    fn rename_of_untracked_workspace_is_noop_and_does_not_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = tracker(&dir, None);

        assert!(!t.handle(WorkspaceEvent::Rename {
            current: ws(7, "ghost"),
        }));
        // No persist write happened.
        assert!(load_names(&dir.path().join("history")).is_err());
    }

    #[test]
    fn empty_removes_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = tracker(&dir, None);

        t.handle(WorkspaceEvent::Focus {
            current: ws(1, "1"),
            old: None,
        });
        t.handle(WorkspaceEvent::Focus {
            current: ws(2, "2"),
            old: Some(ws(1, "1")),
        });

        assert!(t.handle(WorkspaceEvent::Empty { current: ws(1, "1") }));
        assert!(!t.handle(WorkspaceEvent::Empty { current: ws(1, "1") }));
        let names: Vec<_> = t.history().names().collect();
        assert_eq!(names, vec!["2"]);
    }

    #[test]
    fn unknown_events_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = tracker(&dir, None);
        assert!(!t.handle(WorkspaceEvent::Unknown));
        assert!(t.history().is_empty());
    }

    #[test]
    fn capacity_is_enforced_through_the_tracker() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = tracker(&dir, Some(2));

        for id in 1..=4 {
            t.handle(WorkspaceEvent::Focus {
                current: ws(id, &id.to_string()),
                old: None,
            });
            assert!(t.history().len() <= 2);
        }
        let names: Vec<_> = t.history().names().collect();
        assert_eq!(names, vec!["4", "3"]);
    }

    #[test]
    fn reset_clears_memory_and_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = tracker(&dir, None);

        t.handle(WorkspaceEvent::Focus {
            current: ws(1, "1"),
            old: None,
        });
        assert!(dir.path().join("history").exists());

        t.reset();
        assert!(t.history().is_empty());
        assert!(!dir.path().join("history").exists());
    }

    #[test]
    fn reset_with_no_file_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = tracker(&dir, None);
        t.reset();
    }
}
