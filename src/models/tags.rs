//! Normalized product tag lists.

use std::collections::HashSet;
use std::fmt;

use crate::error::{AppError, Result};

/// Separator used when a tag list is written back as a single field.
pub const TAG_SEPARATOR: &str = ", ";

/// Check that `tag` can be stored as a single entry of a tag field.
pub fn validate_tag(tag: &str) -> Result<()> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(AppError::config("tag name is empty"));
    }
    if tag.contains(',') {
        return Err(AppError::config(format!(
            "tag name {tag:?} must not contain commas"
        )));
    }
    Ok(())
}

/// Ordered tag list, unique under case-insensitive comparison.
///
/// The first spelling of a tag wins; later duplicates that differ only in
/// case are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Parse the raw comma-separated tag field.
    pub fn parse(raw: &str) -> Self {
        Self::from_iter(raw.split(','))
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, tag: &str) -> bool {
        let needle = tag.trim().to_lowercase();
        self.0.iter().any(|t| t.to_lowercase() == needle)
    }

    /// Append a tag unless an equivalent one is already present.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Remove every case-insensitive match, returning how many were dropped.
    pub fn remove(&mut self, tag: &str) -> usize {
        let needle = tag.trim().to_lowercase();
        let before = self.0.len();
        self.0.retain(|t| t.to_lowercase() != needle);
        before - self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Render the list as the single string field stored remotely.
    pub fn to_field(&self) -> String {
        self.0.join(TAG_SEPARATOR)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let tags = iter
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.to_lowercase()))
            .collect();
        Self(tags)
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_field())
    }
}
