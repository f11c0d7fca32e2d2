use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::drawing::{DrawingId, DrawingObject};

/// Id-ordered object store. Insertion order is paint order.
pub type DrawingSet = IndexMap<DrawingId, Arc<DrawingObject>>;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Bounded undo/redo over whole-store snapshots.
///
/// Snapshots share unchanged objects through `Arc`, so one edit costs one
/// index map plus the edited object.
#[derive(Debug, Clone)]
pub struct DrawingHistory {
    undo: VecDeque<DrawingSet>,
    redo: Vec<DrawingSet>,
    limit: usize,
}

impl Default for DrawingHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl DrawingHistory {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Records the state before a mutation. Clears the redo branch.
    pub fn record(&mut self, before: DrawingSet) {
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(before);
        self.redo.clear();
    }

    /// Swaps `current` for the previous snapshot, or `None` at the oldest entry.
    pub fn undo(&mut self, current: DrawingSet) -> Option<DrawingSet> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: DrawingSet) -> Option<DrawingSet> {
        let next = self.redo.pop()?;
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(current);
        Some(next)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Moves every stored point by `delta` bars, keeping shared objects shared.
    pub fn shift_time(&mut self, delta: f64) {
        let mut shifted: HashMap<*const DrawingObject, Arc<DrawingObject>> = HashMap::new();
        for set in self.undo.iter_mut().chain(self.redo.iter_mut()) {
            for object in set.values_mut() {
                let key = Arc::as_ptr(object);
                let replacement = shifted
                    .entry(key)
                    .or_insert_with(|| Arc::new(shifted_object(object, delta)));
                *object = Arc::clone(replacement);
            }
        }
    }
}

pub(crate) fn shifted_object(object: &DrawingObject, delta: f64) -> DrawingObject {
    let mut copy = object.clone();
    copy.translate(delta, 0.0);
    copy
}

/// Rebases a whole store by `delta` bars.
pub(crate) fn shift_set(set: &mut DrawingSet, delta: f64) {
    for object in set.values_mut() {
        *object = Arc::new(shifted_object(object, delta));
    }
}
