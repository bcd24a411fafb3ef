use std::collections::HashSet;

use tracing::{trace, warn};
use weft_dom::{Identifier, Tree};

use crate::bind_map::{BindMap, BindingEntry, BindingKind};
use crate::context::Context;

/// One planned node mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    SetAttr {
        node: Identifier,
        name: String,
        value: String,
    },
    SetText {
        node: Identifier,
        index: usize,
        value: String,
    },
}

/// Render an entry's site from its raw pattern. Every placeholder of the
/// pattern is resolved from `ctx`, so the result never depends on what the
/// node currently holds.
pub fn render(entry: &BindingEntry, ctx: &Context) -> String {
    entry
        .raw_pattern
        .render(|ph| ctx.resolve(&ph.key, ph.invoked).to_string())
}

/// Patches refreshing every site bound to `key`. Unknown keys plan nothing.
///
/// Only the context is touched here, so methods invoked while rendering may
/// read or write it freely.
pub fn plan(key: &str, map: &BindMap, ctx: &Context) -> Vec<Patch> {
    let Some(nodes) = map.get(key) else {
        return Vec::new();
    };
    let mut patches = Vec::new();
    for (node, entries) in nodes {
        // A site holding the same key twice is rendered once.
        let mut seen: HashSet<&BindingKind> = HashSet::new();
        for entry in entries {
            if !seen.insert(&entry.kind) {
                continue;
            }
            let value = render(entry, ctx);
            patches.push(match &entry.kind {
                BindingKind::Attribute { name } => Patch::SetAttr {
                    node: node.clone(),
                    name: name.clone(),
                    value,
                },
                BindingKind::Text { index } => Patch::SetText {
                    node: node.clone(),
                    index: *index,
                    value,
                },
            });
        }
    }
    patches
}

/// Apply patches to `tree`, locating nodes by identifier. Returns how many
/// were applied; patches whose target is gone are skipped.
pub fn apply(patches: &[Patch], tree: &mut Tree) -> usize {
    let mut applied = 0;
    for patch in patches {
        match patch {
            Patch::SetAttr { node, name, value } => {
                let Some(n) = tree.find_marked(node) else {
                    warn!(node = %node, "bound node not found, skipping attribute patch");
                    continue;
                };
                if tree.set_attribute(n, name, value.as_str()) {
                    trace!(node = %node, attribute = %name, "attribute updated");
                    applied += 1;
                }
            }
            Patch::SetText { node, index, value } => {
                let Some(n) = tree.find_marked(node) else {
                    warn!(node = %node, "bound node not found, skipping text patch");
                    continue;
                };
                let Some(child) = tree.children(n).get(*index).copied() else {
                    warn!(node = %node, index, "bound text node missing");
                    continue;
                };
                if tree.set_text(child, value.as_str()) {
                    trace!(node = %node, index, "text updated");
                    applied += 1;
                } else {
                    warn!(node = %node, index, "bound child is no longer a text node");
                }
            }
        }
    }
    applied
}

/// Plan and apply the update for `key` against `tree`.
pub fn update(key: &str, tree: &mut Tree, map: &BindMap, ctx: &Context) -> usize {
    let patches = plan(key, map, ctx);
    apply(&patches, tree)
}
