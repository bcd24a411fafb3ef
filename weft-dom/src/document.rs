use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::events::{self, DispatchOutcome};
use crate::{Identifier, NodeId, Tree, VNode};

/// Shared handle to a live host tree.
///
/// Cloning the handle shares the tree. Borrows are short-lived: callers must
/// not hold one across a dispatch or a reactive write.
#[derive(Clone, Default, Debug)]
pub struct Document(Rc<RefCell<Tree>>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tree(tree: Tree) -> Self {
        Self(Rc::new(RefCell::new(tree)))
    }

    pub fn from_vnodes(nodes: &[VNode]) -> Self {
        Self::from_tree(Tree::from_vnodes(nodes))
    }

    pub fn borrow(&self) -> Ref<'_, Tree> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Tree> {
        self.0.borrow_mut()
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.0.borrow().element_by_id(id)
    }

    pub fn find_marked(&self, id: &Identifier) -> Option<NodeId> {
        self.0.borrow().find_marked(id)
    }

    /// Insert a detached fragment under `container`.
    pub fn mount(&self, container: NodeId, fragment: Tree) -> Vec<NodeId> {
        self.0.borrow_mut().graft(container, fragment)
    }

    pub fn dispatch(&self, target: NodeId, event_type: &str) -> DispatchOutcome {
        events::dispatch(&self.0, target, event_type)
    }

    pub fn to_html(&self) -> String {
        let tree = self.0.borrow();
        crate::html::to_html(&tree, tree.root())
    }

    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
