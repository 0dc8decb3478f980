//! Local knowledge — the frame store owned by one script execution.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::frame::{Frame, normalize_name};

/// Frames known to a running script: its local definitions plus every
/// frame realized from user input or received through a transfer.
///
/// A `Knowledge` value is owned by exactly one execution. Deferring with
/// transfer moves it to the next script instead of sharing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Knowledge {
    frames: IndexMap<String, Frame>,
}

impl Knowledge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Frame> {
        self.frames.get(&normalize_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Store a frame, replacing any frame of the same name.
    pub fn insert(&mut self, frame: Frame) {
        self.frames.insert(frame.name().to_string(), frame);
    }

    /// Merge a realized frame: bindings already held locally are kept and
    /// the new frame contributes the rest.
    pub fn merge(&mut self, frame: Frame) {
        match self.frames.entry(frame.name().to_string()) {
            Entry::Occupied(mut existing) => existing.get_mut().absorb(&frame),
            Entry::Vacant(slot) => {
                slot.insert(frame);
            }
        }
    }

    pub fn merge_all(&mut self, frames: impl IntoIterator<Item = Frame>) {
        for frame in frames {
            self.merge(frame);
        }
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.values()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FromIterator<Frame> for Knowledge {
    fn from_iter<T: IntoIterator<Item = Frame>>(iter: T) -> Self {
        let mut knowledge = Knowledge::new();
        for frame in iter {
            knowledge.insert(frame);
        }
        knowledge
    }
}
