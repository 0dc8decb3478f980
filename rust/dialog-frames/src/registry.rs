//! The global frame registry.

use std::collections::HashMap;

use tracing::debug;

use crate::error::FrameError;
use crate::frame::{Frame, normalize_name};

/// Reusable frame templates shared by every script, keyed by name.
///
/// The registry is populated once while definitions load and is only read
/// afterwards. Templates never carry bindings; callers that want to fill
/// one take an independent copy with [`FrameRegistry::instantiate`].
#[derive(Debug, Clone, Default)]
pub struct FrameRegistry {
    frames: HashMap<String, Frame>,
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template. Each name may be registered only once.
    pub fn register(&mut self, frame: Frame) -> Result<(), FrameError> {
        if self.frames.contains_key(frame.name()) {
            return Err(FrameError::DuplicateFrame {
                name: frame.name().to_string(),
            });
        }
        debug!(frame = %frame.name(), fields = frame.field_count(), "registered global frame");
        let template = frame.instantiate();
        self.frames.insert(template.name().to_string(), template);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Frame> {
        self.frames.get(&normalize_name(name))
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// A fresh, unbound instance of a template.
    pub fn instantiate(&self, name: &str) -> Option<Frame> {
        self.get(name).map(Frame::instantiate)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.frames.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
