//! Document category types - closed, validated category sets.
//!
//! Categories are matched by name in the stores, but never constructed from
//! raw strings: every set is validated against a [`CategoryRegistry`] of
//! known category names at construction time.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::services::ConsentError;

/// A single validated document category name, e.g. "Proof of Address".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentCategory(String);

impl DocumentCategory {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An order-irrelevant, duplicate-free set of validated categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet(BTreeSet<DocumentCategory>);

impl CategorySet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, category: &DocumentCategory) -> bool {
        self.0.contains(category)
    }

    /// Set intersection; used by the access filter to combine the partner's
    /// live configuration with a grant's snapshotted requested categories.
    pub fn intersection(&self, other: &CategorySet) -> CategorySet {
        CategorySet(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentCategory> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|c| c.0.clone()).collect()
    }
}

/// Registry of category names known to the platform.
///
/// The registry is managed outside this core (document types are an admin
/// concern); it is injected wherever category input is parsed.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    known: BTreeSet<String>,
}

impl CategoryRegistry {
    /// Build a registry from known category names. Names are trimmed;
    /// empty names are rejected.
    pub fn new<I, S>(names: I) -> Result<Self, ConsentError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut known = BTreeSet::new();
        for name in names {
            let name = name.into().trim().to_string();
            if name.is_empty() {
                return Err(ConsentError::Validation(
                    "category names must be non-empty".to_string(),
                ));
            }
            known.insert(name);
        }
        Ok(Self { known })
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    /// Parse a single category name, rejecting anything not in the registry.
    pub fn parse(&self, name: &str) -> Result<DocumentCategory, ConsentError> {
        let name = name.trim();
        if !self.is_known(name) {
            return Err(ConsentError::Validation(format!(
                "unknown document category '{}'",
                name
            )));
        }
        Ok(DocumentCategory(name.to_string()))
    }

    /// Parse a set of category names. Duplicates collapse; unknown names are
    /// rejected rather than silently admitted.
    pub fn parse_set<'a, I>(&self, names: I) -> Result<CategorySet, ConsentError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            set.insert(self.parse(name)?);
        }
        Ok(CategorySet(set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CategoryRegistry {
        CategoryRegistry::new(["Proof of Address", "Tax ID", "Passport"]).unwrap()
    }

    #[test]
    fn test_parse_known_category() {
        let cat = registry().parse("Tax ID").unwrap();
        assert_eq!(cat.as_str(), "Tax ID");
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = registry().parse("Blood Type").unwrap_err();
        assert!(matches!(err, ConsentError::Validation(_)));
    }

    #[test]
    fn test_set_collapses_duplicates() {
        let set = registry()
            .parse_set(["Tax ID", "Tax ID", "Passport"])
            .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_intersection() {
        let reg = registry();
        let a = reg.parse_set(["Proof of Address", "Tax ID"]).unwrap();
        let b = reg.parse_set(["Tax ID", "Passport"]).unwrap();
        let both = a.intersection(&b);
        assert_eq!(both.names(), vec!["Tax ID".to_string()]);
    }

    #[test]
    fn test_empty_registry_name_rejected() {
        assert!(CategoryRegistry::new(["  "]).is_err());
    }
}
