use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::{NodeId, Tree};

static NEXT_LISTENER: AtomicU64 = AtomicU64::new(1);

/// Handle of an attached listener. Unique across every tree in the process,
/// so it survives grafting one tree into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Options of an attached listener, in the spirit of `addEventListener`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerOptions {
    pub once: bool,
    pub capture: bool,
    /// Calls to [`Event::prevent_default`] are ignored while a passive
    /// listener runs.
    pub passive: bool,
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl ListenerOptions {
    /// Apply one dotted modifier. Returns `false` for unknown modifiers.
    pub fn apply_modifier(&mut self, modifier: &str) -> bool {
        match modifier {
            "once" => self.once = true,
            "capture" => self.capture = true,
            "passive" => self.passive = true,
            "prevent" => self.prevent_default = true,
            "stop" => self.stop_propagation = true,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Capturing,
    AtTarget,
    Bubbling,
}

/// Event delivered to listeners.
#[derive(Debug)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
    current_target: Cell<NodeId>,
    phase: Cell<Phase>,
    passive: Cell<bool>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    pub fn new(event_type: impl Into<String>, target: NodeId) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            current_target: Cell::new(target),
            phase: Cell::new(Phase::AtTarget),
            passive: Cell::new(false),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn current_target(&self) -> NodeId {
        self.current_target.get()
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn prevent_default(&self) {
        if !self.passive.get() {
            self.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }
}

#[derive(Clone)]
pub(crate) struct Callback(Rc<dyn Fn(&Event)>);

impl Callback {
    pub(crate) fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }
}

#[derive(Clone)]
pub(crate) struct Listener {
    id: ListenerId,
    node: NodeId,
    event_type: String,
    options: ListenerOptions,
    callback: Callback,
}

/// Listeners of one tree, in registration order.
#[derive(Clone, Default)]
pub(crate) struct ListenerTable {
    entries: Vec<Listener>,
}

impl ListenerTable {
    pub(crate) fn add(
        &mut self,
        node: NodeId,
        event_type: String,
        options: ListenerOptions,
        callback: Callback,
    ) -> ListenerId {
        let id = ListenerId(NEXT_LISTENER.fetch_add(1, Ordering::Relaxed));
        self.entries.push(Listener {
            id,
            node,
            event_type,
            options,
            callback,
        });
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|l| l.id != id);
        self.entries.len() != before
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|l| l.id == id)
    }

    pub(crate) fn for_node(&self, node: NodeId) -> impl Iterator<Item = &Listener> {
        self.entries.iter().filter(move |l| l.node == node)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn absorb(&mut self, other: ListenerTable, remap: impl Fn(NodeId) -> NodeId) {
        for mut l in other.entries {
            l.node = remap(l.node);
            self.entries.push(l);
        }
    }
}

/// Result of [`dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    pub invoked: usize,
    pub default_prevented: bool,
}

/// Listeners to run for one dispatch, in firing order.
fn propagation_plan(tree: &Tree, target: NodeId, event_type: &str) -> Vec<(Listener, Phase)> {
    let path = tree.ancestry(target);
    let table = tree.listener_table();
    let matching = |node: NodeId| {
        table
            .for_node(node)
            .filter(|l| l.event_type == event_type)
            .cloned()
            .collect::<Vec<_>>()
    };

    let mut plan = Vec::new();
    let (ancestors, _) = path.split_at(path.len() - 1);
    for node in ancestors {
        for l in matching(*node).into_iter().filter(|l| l.options.capture) {
            plan.push((l, Phase::Capturing));
        }
    }
    for l in matching(target) {
        plan.push((l, Phase::AtTarget));
    }
    for node in ancestors.iter().rev() {
        for l in matching(*node).into_iter().filter(|l| !l.options.capture) {
            plan.push((l, Phase::Bubbling));
        }
    }
    plan
}

/// Dispatch `event_type` at `target`: capture listeners on ancestors (root
/// first), every listener on the target, then non-capture listeners on
/// ancestors (innermost first).
///
/// The tree is only borrowed while planning and while removing `once`
/// listeners, so listeners may freely mutate it.
pub fn dispatch(tree: &RefCell<Tree>, target: NodeId, event_type: &str) -> DispatchOutcome {
    let plan = propagation_plan(&tree.borrow(), target, event_type);
    let event = Event::new(event_type, target);
    let mut invoked = 0;
    let mut stopped_at: Option<NodeId> = None;

    for (listener, phase) in plan {
        if let Some(node) = stopped_at {
            if node != listener.node {
                break;
            }
        }
        // A previous listener may have removed this one.
        if !tree.borrow().has_listener(listener.id) {
            continue;
        }
        if listener.options.once {
            tree.borrow_mut().remove_listener(listener.id);
        }

        event.current_target.set(listener.node);
        event.phase.set(phase);
        event.passive.set(listener.options.passive);
        if listener.options.prevent_default {
            event.prevent_default();
        }
        trace!(event = event_type, node = listener.node.index(), "invoking listener");
        (listener.callback.0)(&event);
        invoked += 1;

        if listener.options.stop_propagation {
            event.stop_propagation();
        }
        if event.propagation_stopped.get() && stopped_at.is_none() {
            stopped_at = Some(listener.node);
        }
    }

    DispatchOutcome {
        invoked,
        default_prevented: event.default_prevented(),
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("node", &self.node)
            .field("event_type", &self.event_type)
            .field("options", &self.options)
            .finish()
    }
}
