use indexmap::IndexMap;
use tracing::debug;
use weft_dom::Tree;

use crate::bundle::parse_bundle;
use crate::error::{Error, Result};
use crate::markup::parse_markup;

/// An immutable named template fragment.
#[derive(Debug, Clone)]
pub struct Skeleton {
    name: String,
    tree: Tree,
}

impl Skeleton {
    pub fn new(name: impl Into<String>, tree: Tree) -> Self {
        Self {
            name: name.into(),
            tree,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// A detached, mutable working copy.
    pub fn instantiate(&self) -> Tree {
        self.tree.clone()
    }
}

/// Resolves template names to skeletons.
pub trait TemplateSource {
    fn lookup(&self, name: &str) -> Option<&Skeleton>;
}

/// In-memory [`TemplateSource`], usually filled from a markup bundle.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    skeletons: IndexMap<String, Skeleton>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `<template id="...">` block of a bundle.
    pub fn from_bundle(source: &str) -> Result<Self> {
        let mut store = Self::new();
        for entry in parse_bundle(source)? {
            if store.skeletons.contains_key(&entry.name) {
                return Err(Error::DuplicateTemplate(entry.name));
            }
            store.insert_markup(entry.name, &entry.body)?;
        }
        debug!(templates = store.len(), "loaded template bundle");
        Ok(store)
    }

    /// Parse `markup` and store it under `name`, replacing any previous entry.
    pub fn insert_markup(&mut self, name: impl Into<String>, markup: &str) -> Result<()> {
        let name = name.into();
        let tree = parse_markup(markup).map_err(|message| Error::Markup {
            name: name.clone(),
            message,
        })?;
        self.insert(name, tree);
        Ok(())
    }

    pub fn insert(&mut self, name: impl Into<String>, tree: Tree) {
        let name = name.into();
        self.skeletons
            .insert(name.clone(), Skeleton::new(name, tree));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.skeletons.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.skeletons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skeletons.is_empty()
    }
}

impl TemplateSource for TemplateStore {
    fn lookup(&self, name: &str) -> Option<&Skeleton> {
        self.skeletons.get(name)
    }
}
