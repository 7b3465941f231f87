//! MRU workspace history.
//!
//! [`History`] keeps an ordered, duplicate-free list of [`WorkspaceRef`]s,
//! most-recent-first.  The daemon mutates it through
//! [`HistoryTracker`](crate::tracker::HistoryTracker) and persists it to a
//! plain text file, one workspace name per line, so a picker process can
//! read it back without talking to i3 at all.
//!
//! The on-disk file is replaced atomically (write to a temp file in the
//! same directory, then rename), so a concurrent reader sees either the
//! old or the new content — never a torn write.

use std::fs;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::Path;

/// A workspace as i3 sees it.
///
/// Identity is the numeric id assigned by i3; the name is display data and
/// may change over the workspace's lifetime (`rename` events).  Equality
/// and hashing are defined over the id **only** — that is what makes
/// rename-in-place possible.
#[derive(Debug, Clone)]
pub struct WorkspaceRef {
    /// Stable id assigned by i3.
    pub id: i64,
    /// Current display name.
    pub name: String,
}

impl WorkspaceRef {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl PartialEq for WorkspaceRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WorkspaceRef {}

impl Hash for WorkspaceRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Errors from loading or saving the history file.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("history file has no parent directory: {0}")]
    NoParentDir(String),
}

/// Ordered, duplicate-free workspace history, most-recent-first.
///
/// An optional capacity bounds the length; insertion truncates the tail
/// beyond it.  Capacities below 2 are meaningless (you cannot cycle
/// through fewer than two entries) and are treated as unbounded.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<WorkspaceRef>,
    capacity: Option<usize>,
}

impl History {
    /// Create an empty history with an optional capacity bound.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.filter(|&n| n >= 2),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in MRU order.
    pub fn entries(&self) -> &[WorkspaceRef] {
        &self.entries
    }

    /// Display names in MRU order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|w| w.name.as_str())
    }

    /// Move `ws` to the front, removing any previous entry with the same
    /// id, then truncate to capacity.
    pub fn promote(&mut self, ws: WorkspaceRef) {
        self.entries.retain(|e| e.id != ws.id);
        self.entries.insert(0, ws);
        if let Some(cap) = self.capacity {
            self.entries.truncate(cap);
        }
    }

    /// Update the stored name of the entry with `id`, keeping its
    /// position.  Returns whether an entry was found.
    pub fn rename(&mut self, id: i64, name: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove the entry with `id`, if present.  Returns whether a removal
    /// occurred.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drop all entries (used when the i3 connection is lost and the
    /// history can no longer be trusted to reflect reality).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    //  Persistence

    /// Atomically write the history to `path`, one name per line,
    /// most-recent-first.
    ///
    /// The write goes to a temp file in the same directory followed by a
    /// rename, so a reader never observes a partially written file.
    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        let dir = path
            .parent()
            .ok_or_else(|| HistoryError::NoParentDir(path.display().to_string()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        for entry in &self.entries {
            writeln!(tmp, "{}", entry.name)?;
        }
        tmp.flush()?;
        tmp.persist(path).map_err(|e| HistoryError::Io(e.error))?;
        Ok(())
    }
}

/// Read a persisted history: one workspace name per line, MRU-first.
///
/// Blank lines are skipped.  Any I/O error (including a missing file) is
/// returned to the caller, which treats it as "no usable history".
pub fn load_names(path: &Path) -> Result<Vec<String>, HistoryError> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

//  Tests
