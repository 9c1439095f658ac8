//! Diagnostic locators for positions inside a tree.
//!
//! A [`FieldPath`] is built up as a merge recurses and only ever shows up in
//! error messages and log lines. Object fields render dotted
//! (`spec.template.metadata`), list-map records render bracketed with the key
//! they were matched by (`ports[port=80]`).

use std::fmt;

/// One step of a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// An object field.
    Field(String),
    /// A record of a list-map, identified by its merge key and key value.
    Record { key: String, value: String },
}

/// Human-readable position inside a tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// This path extended with an object field.
    pub fn field(&self, name: impl Into<String>) -> Self {
        self.child(Segment::Field(name.into()))
    }

    /// This path extended with a list-map record.
    pub fn record(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.child(Segment::Record {
            key: key.into(),
            value: value.into(),
        })
    }

    fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Record { key, value } => write!(f, "[{key}={value}]")?,
            }
        }
        Ok(())
    }
}
