use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use weft_core::{HookId, Settable};
use weft_dom::Event;

use crate::value::{Method, Value};

type Slot = Rc<Settable<Value>>;

struct Inner {
    slots: RefCell<IndexMap<String, Slot>>,
}

/// Reactive key/value store of data and methods.
///
/// Every key is a [`Settable`] slot: [`Context::set`] stores the value and
/// then synchronously runs that key's write hooks. Writing one key never
/// triggers hooks of another key, even if a method reads both.
///
/// `Context` is a cheap shared handle; clones see the same store.
#[derive(Clone)]
pub struct Context(Rc<Inner>);

/// Non-owning handle, used by listeners so that attached nodes do not keep
/// the context alive.
#[derive(Clone)]
pub struct WeakContext(Weak<Inner>);

impl WeakContext {
    pub fn upgrade(&self) -> Option<Context> {
        self.0.upgrade().map(Context)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(
            std::iter::empty::<(String, Value)>(),
            std::iter::empty::<(String, Method)>(),
        )
    }
}

impl Context {
    /// Merge `data` and `methods` into one store. A method shadows a data
    /// value of the same key; unnamed methods take their key as name.
    pub fn new<K, M>(
        data: impl IntoIterator<Item = (K, Value)>,
        methods: impl IntoIterator<Item = (M, Method)>,
    ) -> Self
    where
        K: Into<String>,
        M: Into<String>,
    {
        let mut slots: IndexMap<String, Slot> = IndexMap::new();
        for (key, value) in data {
            slots.insert(key.into(), Rc::new(Settable::new(value)));
        }
        for (key, method) in methods {
            let key = key.into();
            let method = match method.name() {
                Some(_) => method,
                None => method.named(key.as_str()),
            };
            slots.insert(key, Rc::new(Settable::new(Value::Method(method))));
        }
        Self(Rc::new(Inner {
            slots: RefCell::new(slots),
        }))
    }

    pub fn downgrade(&self) -> WeakContext {
        WeakContext(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Context) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn slot(&self, key: &str) -> Option<Slot> {
        self.0.slots.borrow().get(key).cloned()
    }

    fn slot_or_insert(&self, key: &str) -> Slot {
        if let Some(slot) = self.slot(key) {
            return slot;
        }
        let slot = Rc::new(Settable::new(Value::Undefined));
        self.0
            .slots
            .borrow_mut()
            .insert(key.to_string(), slot.clone());
        slot
    }

    /// Stored value of `key`; methods come back as [`Value::Method`].
    /// Keys never supplied read as [`Value::Undefined`].
    pub fn get(&self, key: &str) -> Value {
        self.slot(key).map(|s| s.get()).unwrap_or_default()
    }

    /// Like [`Context::get`], but when `invoked` is set and the value is a
    /// method, call it with this context as receiver and return the result.
    pub fn resolve(&self, key: &str, invoked: bool) -> Value {
        match self.get(key) {
            Value::Method(m) if invoked => m.call(self, None),
            other => other,
        }
    }

    /// Call the method stored under `key`. Returns `None` if `key` does not
    /// hold a method.
    pub fn call(&self, key: &str, event: Option<&Event>) -> Option<Value> {
        match self.get(key) {
            Value::Method(m) => Some(m.call(self, event)),
            _ => None,
        }
    }

    /// Store `value` under `key` (no equality check) and run the key's write
    /// hooks before returning.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        // Slot handle is cloned out so hooks can re-enter the store.
        let slot = self.slot_or_insert(key);
        slot.set(value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.slots.borrow().contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.0.slots.borrow().keys().cloned().collect()
    }

    /// Register a hook run after every write of `key`. The key is created
    /// (as `Undefined`) if it does not exist yet.
    pub fn watch(&self, key: &str, hook: impl Fn(&Value) + 'static) -> HookId {
        self.slot_or_insert(key).subscribe(hook)
    }

    pub fn unwatch(&self, key: &str, id: HookId) -> bool {
        self.slot(key).is_some_and(|s| s.unsubscribe(id))
    }

    pub fn watcher_count(&self, key: &str) -> usize {
        self.slot(key).map(|s| s.hook_count()).unwrap_or(0)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.0.slots.borrow();
        f.debug_map()
            .entries(slots.iter().map(|(k, v)| (k, v.get())))
            .finish()
    }
}
