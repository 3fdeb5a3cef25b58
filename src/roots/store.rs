//! In-memory root storage: named categories of vocabulary fragments.
//!
//! A `RootStore` holds the complete root vocabulary for one style, loaded
//! once per run and never mutated by the synthesis engine. Category order is
//! insertion order; it carries no meaning but stays stable within a run so a
//! fixed seed replays the same output.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// One vocabulary fragment with optional descriptive tags.
///
/// Root files accept both the bare-string form (`- 云`) and the tagged form
/// (`- {word: 云, tags: [自然]}`); both deserialize into this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRoot")]
pub struct RootEntry {
    /// The fragment text.
    pub word: String,
    /// Descriptive tags attached by the generator, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl RootEntry {
    /// A bare entry with no tags.
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tags: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRoot {
    Word(String),
    Tagged {
        word: String,
        #[serde(default)]
        tags: Vec<String>,
    },
}

impl From<RawRoot> for RootEntry {
    fn from(raw: RawRoot) -> Self {
        match raw {
            RawRoot::Word(word) => RootEntry {
                word,
                tags: Vec::new(),
            },
            RawRoot::Tagged { word, tags } => RootEntry { word, tags },
        }
    }
}

/// A named category and its ordered roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub roots: Vec<RootEntry>,
}

/// Ordered map from category name to roots for one style.
#[derive(Debug, Clone, Default)]
pub struct RootStore {
    categories: Vec<Category>,
    index: HashMap<String, usize>,
}

impl RootStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a category, replacing its roots if the name already exists.
    pub fn insert(&mut self, name: impl Into<String>, roots: Vec<RootEntry>) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&pos) => self.categories[pos].roots = roots,
            None => {
                self.index.insert(name.clone(), self.categories.len());
                self.categories.push(Category { name, roots });
            }
        }
    }

    /// Roots of the named category, if present.
    pub fn get(&self, name: &str) -> Option<&[RootEntry]> {
        self.index
            .get(name)
            .map(|&pos| self.categories[pos].roots.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Category names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Category name set for template validation.
    pub fn name_set(&self) -> HashSet<String> {
        self.index.keys().cloned().collect()
    }

    /// Categories in insertion order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total root count across all categories.
    pub fn total_roots(&self) -> usize {
        self.categories.iter().map(|c| c.roots.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order_and_replaces() {
        let mut store = RootStore::new();
        store.insert("意象", vec![RootEntry::new("云")]);
        store.insert("建筑", vec![RootEntry::new("轩")]);
        store.insert("意象", vec![RootEntry::new("月")]);

        assert_eq!(store.names().collect::<Vec<_>>(), vec!["意象", "建筑"]);
        assert_eq!(store.get("意象").unwrap()[0].word, "月");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_deserializes_both_root_forms() {
        let roots: Vec<RootEntry> =
            serde_yaml::from_str("- 云\n- word: 月\n  tags: [自然]\n").unwrap();
        assert_eq!(roots[0], RootEntry::new("云"));
        assert_eq!(roots[1].word, "月");
        assert_eq!(roots[1].tags, vec!["自然"]);
    }

    #[test]
    fn test_total_roots() {
        let mut store = RootStore::new();
        store.insert("a", vec![RootEntry::new("x"), RootEntry::new("y")]);
        store.insert("b", vec![RootEntry::new("z")]);
        assert_eq!(store.total_roots(), 3);
    }
}
