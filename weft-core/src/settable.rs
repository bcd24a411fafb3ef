// weft-core/src/settable.rs

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type Hook<T> = Rc<dyn Fn(&T)>;

/// Handle returned by [`Settable::subscribe`], used to remove the hook again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// A value cell with a synchronous post-write hook list.
///
/// Every `set` stores the new value and then runs every hook, in
/// registration order, before returning. There is no equality check, no
/// queue and no dependency tracking: one write is one immediate round of
/// hooks.
pub struct Settable<T> {
    value: RefCell<T>,
    hooks: RefCell<Vec<(HookId, Hook<T>)>>,
    next_id: Cell<u64>,
}

impl<T> Settable<T>
where
    T: Clone,
{
    /// Create a new cell with no hooks.
    pub fn new(initial: T) -> Self {
        Self {
            value: RefCell::new(initial),
            hooks: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Read a copy of the current value.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Store `new` and run every hook with it.
    pub fn set(&self, new: T) {
        *self.value.borrow_mut() = new;

        // Snapshot hooks and value so hooks may re-enter `get`/`set`/`subscribe`.
        let hooks: Vec<Hook<T>> = self
            .hooks
            .borrow()
            .iter()
            .map(|(_, hook)| hook.clone())
            .collect();
        if hooks.is_empty() {
            return;
        }
        let current = self.get();
        for hook in hooks {
            hook(&current);
        }
    }

    /// Store `new` without running hooks.
    pub fn set_silent(&self, new: T) {
        *self.value.borrow_mut() = new;
    }

    /// Register a post-write hook.
    pub fn subscribe(&self, hook: impl Fn(&T) + 'static) -> HookId {
        let id = HookId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.hooks.borrow_mut().push((id, Rc::new(hook)));
        id
    }

    /// Remove a hook. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: HookId) -> bool {
        let mut hooks = self.hooks.borrow_mut();
        let before = hooks.len();
        hooks.retain(|(hid, _)| *hid != id);
        hooks.len() != before
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.borrow().len()
    }
}

impl<T: fmt::Debug> fmt::Debug for Settable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settable")
            .field("value", &self.value.borrow())
            .field("hooks", &self.hooks.borrow().len())
            .finish()
    }
}
