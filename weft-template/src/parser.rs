use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};
use weft_dom::{IdGenerator, Identifier, ListenerId, ListenerOptions, NodeId, NodeKind, Tree};

use crate::bind_map::{BindMap, BindingEntry, BindingKind};
use crate::context::Context;
use crate::error::Result;
use crate::placeholder::{Pattern, Placeholder};

/// `on<type>[.<modifier>]*`
static EVENT_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^on([A-Za-z][A-Za-z0-9_-]*)((?:\.[A-Za-z0-9_-]+)*)$").expect("directive pattern")
});

/// Output of [`parse`].
#[derive(Debug)]
pub struct Parsed {
    pub tree: Tree,
    pub bind_map: BindMap,
    /// Listeners attached for event directives, in document order.
    pub listeners: Vec<ListenerId>,
}

/// Event type and options of a directive attribute name, or `None` if the
/// name is not an event directive.
pub fn parse_directive(name: &str) -> Option<(String, ListenerOptions)> {
    let caps = EVENT_DIRECTIVE.captures(name)?;
    let event_type = caps[1].to_ascii_lowercase();
    let mut options = ListenerOptions::default();
    for modifier in caps[2].split('.').filter(|m| !m.is_empty()) {
        if !options.apply_modifier(modifier) {
            warn!(attribute = name, modifier, "ignoring unknown event modifier");
        }
    }
    Some((event_type, options))
}

/// Mark every element of `tree`, collect its placeholder sites into a
/// [`BindMap`] and turn event directives into listeners.
///
/// Elements are visited depth-first in document order. Handlers are resolved
/// from `ctx` right here, once: writing the handler key later does not
/// change an attached listener.
///
/// Fails only if `ids` cannot allocate an identifier for every element.
pub fn parse(mut tree: Tree, ctx: &Context, ids: &mut IdGenerator) -> Result<Parsed> {
    let mut bind_map = BindMap::new();
    let mut listeners = Vec::new();
    let root = tree.root();
    walk(&mut tree, root, ctx, ids, &mut bind_map, &mut listeners)?;
    debug!(
        keys = bind_map.len(),
        entries = bind_map.entry_count(),
        listeners = listeners.len(),
        "parsed template"
    );
    Ok(Parsed {
        tree,
        bind_map,
        listeners,
    })
}

fn walk(
    tree: &mut Tree,
    node: NodeId,
    ctx: &Context,
    ids: &mut IdGenerator,
    map: &mut BindMap,
    listeners: &mut Vec<ListenerId>,
) -> Result<()> {
    for child in tree.element_children(node) {
        let id = ids.next()?;
        tree.mark(child, id.clone());

        scan_attributes(tree, child, &id, ctx, map, listeners);
        scan_text(tree, child, &id, map);

        walk(tree, child, ctx, ids, map, listeners)?;
    }
    Ok(())
}

fn scan_attributes(
    tree: &mut Tree,
    node: NodeId,
    id: &Identifier,
    ctx: &Context,
    map: &mut BindMap,
    listeners: &mut Vec<ListenerId>,
) {
    for (name, value) in tree.attributes(node) {
        let pattern = Pattern::parse(&value);
        let Some(first) = pattern.placeholders().next() else {
            continue;
        };

        if let Some((event_type, options)) = parse_directive(&name) {
            if let Some(listener) = attach(tree, node, &event_type, options, first, ctx) {
                listeners.push(listener);
            }
            tree.remove_attribute(node, &name);
            continue;
        }

        let pattern = Rc::new(pattern);
        for ph in pattern.placeholders() {
            let kind = BindingKind::Attribute { name: name.clone() };
            map.insert(id, BindingEntry::new(kind, pattern.clone(), ph));
        }
    }
}

fn attach(
    tree: &mut Tree,
    node: NodeId,
    event_type: &str,
    options: ListenerOptions,
    handler: &Placeholder,
    ctx: &Context,
) -> Option<ListenerId> {
    let resolved = ctx.resolve(&handler.key, handler.invoked);
    let Some(method) = resolved.as_method().cloned() else {
        warn!(
            event = event_type,
            key = %handler.key,
            value = ?resolved,
            "event directive does not resolve to a method, no listener attached"
        );
        return None;
    };
    let weak = ctx.downgrade();
    Some(tree.add_listener(node, event_type, options, move |event| {
        if let Some(ctx) = weak.upgrade() {
            method.call(&ctx, Some(event));
        }
    }))
}

fn scan_text(tree: &Tree, node: NodeId, id: &Identifier, map: &mut BindMap) {
    for (index, child) in tree.children(node).iter().enumerate() {
        let NodeKind::Text(text) = tree.kind(*child) else {
            continue;
        };
        let pattern = Pattern::parse(text);
        if !pattern.has_placeholders() {
            continue;
        }
        let pattern = Rc::new(pattern);
        for ph in pattern.placeholders() {
            map.insert(id, BindingEntry::new(BindingKind::Text { index }, pattern.clone(), ph));
        }
    }
}
