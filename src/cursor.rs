//! Selection cursor over a history snapshot.
//!
//! The picker copies the persisted history into an immutable snapshot at
//! startup and moves a single cursor over it in response to advance
//! signals.  The cursor wraps at both ends and is consumed exactly once,
//! at commit, when the picker asks for [`selected`](CursorState::selected)
//! and switches to that workspace.

/// Which way a cursor move (or the whole picker session) goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Forward,
    Backward,
}

/// Error from building a cursor over too small a snapshot.
#[derive(Debug, thiserror::Error)]
#[error("history has {0} entries, need at least 2 to cycle")]
pub struct InsufficientHistory(pub usize);

/// An immutable snapshot of workspace names plus a wrapping cursor.
///
/// The initial cursor never points at index 0 (the currently focused
/// workspace): forward mode starts at index 1, the second-most-recent
/// entry, and reverse mode starts at the last index.
#[derive(Debug)]
pub struct CursorState {
    names: Vec<String>,
    cursor: usize,
}

impl CursorState {
    /// Build a cursor over `names` (MRU-first).
    ///
    /// Fails if there are fewer than two entries — there is nothing to
    /// cycle through.
    pub fn new(names: Vec<String>, direction: Advance) -> Result<Self, InsufficientHistory> {
        if names.len() < 2 {
            return Err(InsufficientHistory(names.len()));
        }
        let cursor = match direction {
            Advance::Forward => 1,
            Advance::Backward => names.len() - 1,
        };
        Ok(Self { names, cursor })
    }

    /// The snapshot, MRU-first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Current cursor index, always in `[0, len)`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The name under the cursor.
    pub fn selected(&self) -> &str {
        &self.names[self.cursor]
    }

    /// Move the cursor one step, wrapping at both ends.
    pub fn step(&mut self, direction: Advance) -> usize {
        let len = self.names.len();
        self.cursor = match direction {
            Advance::Forward => (self.cursor + 1) % len,
            Advance::Backward => (self.cursor + len - 1) % len,
        };
        self.cursor
    }
}

//  Tests
