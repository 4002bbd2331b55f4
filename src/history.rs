use crate::scene::Scene;
use crate::sticker::Sticker;

/// One committed, invertible scene mutation.
///
/// Transform entries carry full sticker snapshots from gesture start
/// (`before`) and gesture end (`after`); structural entries carry the
/// sticker itself plus the z-slot it occupied. `Reorder` stores where the
/// sticker ended up (`index`) and where it came from (`previous`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistoryEntry {
    Add { sticker: Sticker, index: usize },
    Delete { sticker: Sticker, index: usize },
    Move { index: usize, before: Sticker, after: Sticker },
    Resize { index: usize, before: Sticker, after: Sticker },
    Rotate { index: usize, before: Sticker, after: Sticker },
    Reorder { index: usize, previous: usize },
}

/// Linear undo history over a [`Scene`].
///
/// `entries[..applied]` are in effect; everything past `applied` is the
/// redoable future, discarded by the next [`record`](History::record).
/// Entries store indices against the exact scene states they were
/// recorded on, which undo/redo reproduce by unwinding in order, so
/// application never misses.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    applied: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    /// All recorded entries, applied and redoable alike.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of entries currently in effect.
    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.applied = 0;
    }

    /// Appends a fresh entry, discarding any redoable future first.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.applied);
        self.entries.push(entry);
        self.applied = self.entries.len();
    }

    /// Inverse-applies the newest in-effect entry. Returns false at the
    /// bottom of the stack.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        if self.applied == 0 {
            return false;
        }
        self.applied -= 1;
        match self.entries[self.applied] {
            HistoryEntry::Add { index, .. } => {
                scene.remove(index);
                scene.clear_selection();
            }
            HistoryEntry::Delete { sticker, index } => {
                scene.insert(index, sticker);
                scene.select(index);
            }
            HistoryEntry::Move { index, before, .. }
            | HistoryEntry::Resize { index, before, .. }
            | HistoryEntry::Rotate { index, before, .. } => {
                scene.replace(index, before);
            }
            HistoryEntry::Reorder { index, previous } => {
                scene.shift(index, previous);
                scene.select(previous);
            }
        }
        true
    }

    /// Forward-applies the oldest redoable entry. Returns false at the
    /// tail.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        if self.applied == self.entries.len() {
            return false;
        }
        match self.entries[self.applied] {
            HistoryEntry::Add { sticker, index } => {
                scene.insert(index, sticker);
                scene.select(index);
            }
            HistoryEntry::Delete { index, .. } => {
                scene.remove(index);
                scene.clear_selection();
            }
            HistoryEntry::Move { index, after, .. }
            | HistoryEntry::Resize { index, after, .. }
            | HistoryEntry::Rotate { index, after, .. } => {
                scene.replace(index, after);
            }
            HistoryEntry::Reorder { index, previous } => {
                scene.shift(previous, index);
                scene.select(index);
            }
        }
        self.applied += 1;
        true
    }
}
