#![forbid(unsafe_code)]

//! The section registry.
//!
//! A [`SectionRegistry`] is the one ordered list of sections shared by the
//! scroll tracker and the navigation panel. It is built once, validated once,
//! and then cloned by reference (`Arc`) into every consumer, so the two sides
//! cannot disagree about ids or order.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Stable identifier of a section, equal to its document anchor name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(Arc<str>);

impl SectionId {
    /// Create an id from an anchor name.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The anchor name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SectionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SectionId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

/// One entry of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Anchor name, unique within the registry.
    pub id: SectionId,
    /// Display label (without the number prefix).
    pub label: String,
    /// Chapter number as displayed, e.g. `"1.3"` or `"—"`.
    pub number: String,
    /// Position within the registry, starting at 0.
    pub order: usize,
}

/// Errors raised while building a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two entries share an id.
    DuplicateId(String),
    /// An entry has an empty (or whitespace-only) id.
    EmptyId {
        /// Position of the offending entry.
        position: usize,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate section id: {id}"),
            Self::EmptyId { position } => write!(f, "empty section id at position {position}"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Ordered, immutable sequence of sections.
///
/// Cloning is cheap: clones share the same backing slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRegistry {
    sections: Arc<[Section]>,
}

impl SectionRegistry {
    /// Build a registry from `(id, number, label)` triples in display order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if an id appears twice and
    /// [`RegistryError::EmptyId`] if an id is blank.
    pub fn new<I, S1, S2, S3>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S1, S2, S3)>,
        S1: AsRef<str>,
        S2: Into<String>,
        S3: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut sections = Vec::new();
        for (order, (id, number, label)) in entries.into_iter().enumerate() {
            let id = id.as_ref().trim();
            if id.is_empty() {
                return Err(RegistryError::EmptyId { position: order });
            }
            if !seen.insert(id.to_owned()) {
                return Err(RegistryError::DuplicateId(id.to_owned()));
            }
            sections.push(Section {
                id: SectionId::new(id),
                label: label.into(),
                number: number.into(),
                order,
            });
        }
        Ok(Self {
            sections: sections.into(),
        })
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the registry has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Iterate sections in registry order.
    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    /// All sections as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Section] {
        &self.sections
    }

    /// Look up a section by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id.as_str() == id)
    }

    /// Registry position of `id`.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id.as_str() == id)
    }

    /// First section, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Section> {
        self.sections.first()
    }

    /// Section following `id` in registry order.
    #[must_use]
    pub fn next_after(&self, id: &str) -> Option<&Section> {
        self.position(id).and_then(|p| self.sections.get(p + 1))
    }

    /// Section preceding `id` in registry order.
    #[must_use]
    pub fn prev_before(&self, id: &str) -> Option<&Section> {
        self.position(id)
            .and_then(|p| p.checked_sub(1))
            .and_then(|p| self.sections.get(p))
    }

    /// Whether two registries share the same backing storage.
    #[must_use]
    pub fn shares_storage(&self, other: &SectionRegistry) -> bool {
        Arc::ptr_eq(&self.sections, &other.sections)
    }
}

impl<'a> IntoIterator for &'a SectionRegistry {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
