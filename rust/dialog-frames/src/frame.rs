//! Named slot sets and the bindings accumulated for them.

use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::FrameError;
use crate::filter::{FieldFilter, parse_field_line};

/// A named collection of fields, each guarded by a [`FieldFilter`], plus
/// the literals bound to those fields so far.
///
/// Fields are fixed at construction and keep their definition order, which
/// is also the order clarifying questions are asked in. Bindings are
/// monotonic: once a field is bound it is never overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    name: String,
    fields: IndexMap<String, FieldFilter>,
    bindings: IndexMap<String, String>,
}

impl Frame {
    /// Create an empty frame. The name is case-normalized.
    pub fn new(name: impl AsRef<str>) -> Self {
        Frame {
            name: normalize_name(name.as_ref()),
            fields: IndexMap::new(),
            bindings: IndexMap::new(),
        }
    }

    pub fn builder(name: impl AsRef<str>) -> FrameBuilder {
        FrameBuilder {
            frame: Frame::new(name),
        }
    }

    /// Build a frame from definition text: one `field: filter` per line,
    /// blank lines ignored.
    pub fn from_definition(name: impl AsRef<str>, body: &str) -> Result<Self, FrameError> {
        let mut builder = Frame::builder(name);
        for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (field, filter) = parse_field_line(line)?;
            builder = builder.field(field, filter);
        }
        Ok(builder.build())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, field: &str) -> Option<&FieldFilter> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldFilter)> {
        self.fields.iter().map(|(name, filter)| (name.as_str(), filter))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn binding(&self, field: &str) -> Option<&str> {
        self.bindings.get(field).map(String::as_str)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn bound_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_bound(&self, field: &str) -> bool {
        self.bindings.contains_key(field)
    }

    pub fn is_complete(&self) -> bool {
        self.bindings.len() == self.fields.len()
    }

    /// Fields without a binding, in definition order.
    pub fn unbound_fields(&self) -> Vec<String> {
        self.fields
            .keys()
            .filter(|field| !self.bindings.contains_key(*field))
            .cloned()
            .collect()
    }

    /// Bind a literal to a field.
    ///
    /// Returns `Ok(false)` and leaves the frame untouched when the field is
    /// already bound.
    pub fn bind(&mut self, field: &str, value: impl Into<String>) -> Result<bool, FrameError> {
        if !self.fields.contains_key(field) {
            return Err(FrameError::UnknownField {
                frame: self.name.clone(),
                field: field.to_string(),
            });
        }
        if self.bindings.contains_key(field) {
            return Ok(false);
        }
        let value = value.into();
        debug!(frame = %self.name, field, value = %value, "bound field");
        self.bindings.insert(field.to_string(), value);
        Ok(true)
    }

    /// Copy bindings from another instance of the same frame, keeping any
    /// binding this instance already has.
    pub fn absorb(&mut self, other: &Frame) {
        for (field, value) in &other.bindings {
            if self.fields.contains_key(field) && !self.bindings.contains_key(field) {
                self.bindings.insert(field.clone(), value.clone());
            }
        }
    }

    /// A fresh instance: same fields, no bindings.
    pub fn instantiate(&self) -> Frame {
        Frame {
            name: self.name.clone(),
            fields: self.fields.clone(),
            bindings: IndexMap::new(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (field, _) in &self.fields {
            match self.bindings.get(field) {
                Some(value) => write!(f, " [{field}: {value:?}]")?,
                None => write!(f, " [{field}: _]")?,
            }
        }
        Ok(())
    }
}

/// Frame names are matched case-insensitively.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Builder for constructing frames ergonomically.
pub struct FrameBuilder {
    frame: Frame,
}

impl FrameBuilder {
    /// Add a field. Redefining a field replaces its filter.
    pub fn field(mut self, name: impl Into<String>, filter: FieldFilter) -> Self {
        self.frame.fields.insert(name.into(), filter);
        self
    }

    pub fn build(self) -> Frame {
        self.frame
    }
}
