//! Host tree for weft: an arena of elements, attributes, text and comment
//! nodes, with a marker side table for re-locating nodes by identifier and a
//! listener table for native-style event listeners.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

pub mod document;
pub mod events;
pub mod html;
pub mod ident;

pub use document::Document;
pub use events::{DispatchOutcome, Event, ListenerId, ListenerOptions, Phase};
pub use ident::{IdError, IdFormat, IdGenerator, Identifier};

use events::{Callback, ListenerTable};

/// Stable handle of a node inside one [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Fragment,
    Element {
        tag: String,
        attrs: IndexMap<String, String>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed mutable tree. Node 0 is always a fragment root.
///
/// Cloning a tree clones its nodes, markers and listeners; node handles and
/// identifiers stay valid in the clone.
#[derive(Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
    markers: HashMap<Identifier, NodeId>,
    marked: HashMap<NodeId, Identifier>,
    listeners: ListenerTable,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Fragment,
                parent: None,
                children: Vec::new(),
            }],
            markers: HashMap::new(),
            marked: HashMap::new(),
            listeners: ListenerTable::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.into(),
            attrs: IndexMap::new(),
        })
    }

    pub fn create_text(&mut self, value: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(value.into()))
    }

    pub fn create_comment(&mut self, value: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(value.into()))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Unlink `node` from its parent. The node stays in the arena.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Element { .. })
    }

    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attrs, .. } => attrs.get(name).map(|s| s.as_str()),
            _ => None,
        }
    }

    /// Attributes of an element in source order. Empty for other nodes.
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Set an attribute, keeping its position if it already exists.
    /// Returns `false` if `node` is not an element.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) -> bool {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element { attrs, .. } => {
                attrs.insert(name.to_string(), value.into());
                true
            }
            _ => false,
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Option<String> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element { attrs, .. } => attrs.shift_remove(name),
            _ => None,
        }
    }

    /// Value of a text or comment node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Text(t) | NodeKind::Comment(t) => Some(t),
            _ => None,
        }
    }

    /// Replace the value of a text node. Returns `false` for any other node.
    pub fn set_text(&mut self, node: NodeId, value: impl Into<String>) -> bool {
        match &mut self.nodes[node.0].kind {
            NodeKind::Text(t) => {
                *t = value.into();
                true
            }
            _ => false,
        }
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        fn walk(tree: &Tree, node: NodeId, out: &mut String) {
            match &tree.nodes[node.0].kind {
                NodeKind::Text(t) => out.push_str(t),
                NodeKind::Comment(_) => {}
                _ => {
                    for c in tree.children(node) {
                        walk(tree, *c, out);
                    }
                }
            }
        }
        walk(self, node, &mut out);
        out
    }

    /// Element descendants of `node` in document (pre-)order, excluding `node`.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        fn walk(tree: &Tree, node: NodeId, out: &mut Vec<NodeId>) {
            for c in tree.children(node) {
                if tree.is_element(*c) {
                    out.push(*c);
                    walk(tree, *c, out);
                }
            }
        }
        walk(self, node, &mut out);
        out
    }

    /// Element descendants of `scope` carrying attribute `name`.
    pub fn find_by_attribute(&self, scope: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.attribute(*n, name).is_some())
            .collect()
    }

    /// First element (document order) whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|n| self.attribute(*n, "id") == Some(id))
    }

    /// Nodes from the root down to `node`, inclusive.
    pub fn ancestry(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = vec![node];
        let mut cur = node;
        while let Some(p) = self.parent(cur) {
            path.push(p);
            cur = p;
        }
        path.reverse();
        path
    }

    // ---- marker side table ----

    /// Attach `id` to `node`, replacing any previous mark of that node.
    pub fn mark(&mut self, node: NodeId, id: Identifier) {
        if let Some(old) = self.marked.insert(node, id.clone()) {
            self.markers.remove(&old);
        }
        self.markers.insert(id, node);
    }

    pub fn find_marked(&self, id: &Identifier) -> Option<NodeId> {
        self.markers.get(id).copied()
    }

    pub fn marker_of(&self, node: NodeId) -> Option<&Identifier> {
        self.marked.get(&node)
    }

    pub fn markers(&self) -> impl Iterator<Item = &Identifier> {
        self.markers.keys()
    }

    // ---- listeners ----

    pub fn add_listener(
        &mut self,
        node: NodeId,
        event_type: impl Into<String>,
        options: ListenerOptions,
        callback: impl Fn(&Event) + 'static,
    ) -> ListenerId {
        self.listeners
            .add(node, event_type.into(), options, Callback::new(callback))
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.contains(id)
    }

    /// Number of listeners attached to `node`.
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.listeners.for_node(node).count()
    }

    pub(crate) fn listener_table(&self) -> &ListenerTable {
        &self.listeners
    }

    // ---- grafting ----

    /// Move the nodes of `other` below its root into this arena and append
    /// the root's children under `parent`. The root itself is not copied;
    /// anything attached to it lands on `parent`. Markers and listeners
    /// travel with their nodes. Returns the handles of the appended
    /// top-level nodes.
    pub fn graft(&mut self, parent: NodeId, other: Tree) -> Vec<NodeId> {
        let offset = self.nodes.len();
        let remap = |n: NodeId| match n.0 {
            0 => parent,
            i => NodeId(i - 1 + offset),
        };
        let top: Vec<NodeId> = other.nodes[0].children.iter().map(|c| remap(*c)).collect();

        for data in other.nodes.into_iter().skip(1) {
            self.nodes.push(NodeData {
                kind: data.kind,
                parent: data.parent.map(remap),
                children: data.children.into_iter().map(remap).collect(),
            });
        }
        for (id, node) in other.markers {
            self.mark(remap(node), id);
        }
        self.listeners.absorb(other.listeners, remap);

        self.nodes[parent.0].children.extend(top.iter().copied());
        top
    }

    // ---- vnode interop ----

    /// Build a tree whose root fragment holds `nodes`.
    pub fn from_vnodes(nodes: &[VNode]) -> Self {
        let mut tree = Tree::new();
        let root = tree.root();
        for n in nodes {
            let id = tree.insert_vnode(n);
            tree.append_child(root, id);
        }
        tree
    }

    fn insert_vnode(&mut self, v: &VNode) -> NodeId {
        match v {
            VNode::Text(t) => self.create_text(t.clone()),
            VNode::Comment(t) => self.create_comment(t.clone()),
            VNode::Element {
                tag,
                props,
                children,
            } => {
                let el = self.push(NodeKind::Element {
                    tag: tag.clone(),
                    attrs: props.attrs.clone(),
                });
                for c in children {
                    let id = self.insert_vnode(c);
                    self.append_child(el, id);
                }
                el
            }
        }
    }

    /// Snapshot `node` (element, text or comment) as a [`VNode`].
    pub fn to_vnode(&self, node: NodeId) -> VNode {
        match &self.nodes[node.0].kind {
            NodeKind::Text(t) => VNode::Text(t.clone()),
            NodeKind::Comment(t) => VNode::Comment(t.clone()),
            NodeKind::Element { tag, attrs } => VNode::Element {
                tag: tag.clone(),
                props: Props {
                    attrs: attrs.clone(),
                },
                children: self.children(node).iter().map(|c| self.to_vnode(*c)).collect(),
            },
            NodeKind::Fragment => VNode::Element {
                tag: String::from("#fragment"),
                props: Props::new(),
                children: self.children(node).iter().map(|c| self.to_vnode(*c)).collect(),
            },
        }
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.nodes.len())
            .field("markers", &self.markers.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Plain value description of a subtree, used to build and inspect trees.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Element {
        tag: String,
        props: Props,
        children: Vec<VNode>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    pub attrs: IndexMap<String, String>,
}

impl Props {
    pub fn new() -> Self {
        Self {
            attrs: IndexMap::new(),
        }
    }
    pub fn set(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.attrs.insert(k.into(), v.into());
        self
    }
}

impl From<()> for Props {
    fn from(_: ()) -> Self {
        Props::default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Props {
            attrs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<Vec<(&str, &str)>> for Props {
    fn from(v: Vec<(&str, &str)>) -> Self {
        v.into_iter().collect()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Props {
    fn from(v: [(&str, &str); N]) -> Self {
        v.into_iter().collect()
    }
}

pub fn h(tag: impl Into<String>, props: impl Into<Props>, children: Vec<VNode>) -> VNode {
    VNode::Element {
        tag: tag.into(),
        props: props.into(),
        children,
    }
}

pub fn text(t: impl Into<String>) -> VNode {
    VNode::Text(t.into())
}

pub fn comment(t: impl Into<String>) -> VNode {
    VNode::Comment(t.into())
}
