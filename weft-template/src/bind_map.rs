use std::rc::Rc;

use indexmap::IndexMap;
use weft_dom::Identifier;

use crate::placeholder::{Pattern, Placeholder};

/// Where a binding writes its rendered value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Attribute { name: String },
    /// Index of the text node among all children of the marked element.
    Text { index: usize },
}

/// One substitution site tied to a context key.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingEntry {
    pub kind: BindingKind,
    pub key: String,
    /// The original templated string. Shared by every entry of the same site.
    pub raw_pattern: Rc<Pattern>,
    pub placeholder: Placeholder,
    pub invoked: bool,
}

impl BindingEntry {
    pub fn new(kind: BindingKind, pattern: Rc<Pattern>, placeholder: &Placeholder) -> Self {
        Self {
            kind,
            key: placeholder.key.clone(),
            raw_pattern: pattern,
            placeholder: placeholder.clone(),
            invoked: placeholder.invoked,
        }
    }

    pub fn placeholder_span(&self) -> &str {
        &self.placeholder.span
    }
}

/// `key → node identifier → entries`, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindMap {
    entries: IndexMap<String, IndexMap<Identifier, Vec<BindingEntry>>>,
}

impl BindMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: &Identifier, entry: BindingEntry) {
        self.entries
            .entry(entry.key.clone())
            .or_default()
            .entry(node.clone())
            .or_default()
            .push(entry);
    }

    pub fn get(&self, key: &str) -> Option<&IndexMap<Identifier, Vec<BindingEntry>>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<Identifier, Vec<BindingEntry>>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of binding entries across all keys.
    pub fn entry_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|nodes| nodes.values())
            .map(Vec::len)
            .sum()
    }
}
