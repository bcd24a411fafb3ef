// weft-core/src/lifecycle.rs
use std::cell::RefCell;

/// Mount and teardown hooks owned by a single instance.
///
/// Each hook runs at most once; running a phase drains it.
#[derive(Default)]
pub struct Lifecycle {
    mounted: RefCell<Vec<Box<dyn FnOnce()>>>,
    destroy: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook to run when the instance is mounted
    pub fn on_mounted(&self, f: impl FnOnce() + 'static) {
        self.mounted.borrow_mut().push(Box::new(f));
    }

    /// Run all mounted hooks in registration order
    pub fn run_mounted_hooks(&self) {
        let hooks: Vec<_> = self.mounted.borrow_mut().drain(..).collect();
        for hook in hooks {
            hook();
        }
    }

    /// Register a hook to run before the instance is destroyed
    pub fn before_destroy(&self, f: impl FnOnce() + 'static) {
        self.destroy.borrow_mut().push(Box::new(f));
    }

    /// Run all destroy hooks, most recently registered first
    pub fn run_destroy_hooks(&self) {
        let hooks: Vec<_> = self.destroy.borrow_mut().drain(..).collect();
        for hook in hooks.into_iter().rev() {
            hook();
        }
    }

    pub fn pending_destroy_hooks(&self) -> usize {
        self.destroy.borrow().len()
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("mounted", &self.mounted.borrow().len())
            .field("destroy", &self.destroy.borrow().len())
            .finish()
    }
}
