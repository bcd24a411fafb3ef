use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace};
use weft_core::{HookId, Lifecycle};
use weft_dom::{DispatchOutcome, Document, IdGenerator, Identifier, ListenerId, NodeId};

use crate::bind_map::BindMap;
use crate::builder::build;
use crate::config::TemplateConfig;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::loader::Loader;
use crate::parser::{Parsed, parse};
use crate::store::TemplateSource;
use crate::update;
use crate::value::{Method, Value};

type MountedHook = Box<dyn FnOnce(&Context)>;

/// Everything needed to instantiate a [`Template`].
pub struct TemplateOptions {
    pub name: String,
    /// `id` of the container element the template is appended to.
    pub mount: String,
    pub data: IndexMap<String, Value>,
    pub methods: IndexMap<String, Method>,
    pub config: TemplateConfig,
    mounted: Vec<MountedHook>,
}

impl TemplateOptions {
    pub fn new(name: impl Into<String>, mount: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mount: mount.into(),
            data: IndexMap::new(),
            methods: IndexMap::new(),
            config: TemplateConfig::default(),
            mounted: Vec::new(),
        }
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn method(mut self, key: impl Into<String>, method: Method) -> Self {
        self.methods.insert(key.into(), method);
        self
    }

    pub fn config(mut self, config: TemplateConfig) -> Self {
        self.config = config;
        self
    }

    /// Run `f` once the template has been mounted.
    pub fn on_mounted(mut self, f: impl FnOnce(&Context) + 'static) -> Self {
        self.mounted.push(Box::new(f));
        self
    }
}

impl fmt::Debug for TemplateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateOptions")
            .field("name", &self.name)
            .field("mount", &self.mount)
            .field("data", &self.data)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

/// A mounted template instance.
///
/// Construction loads, parses, renders and mounts the template, then ties
/// every bound key of its context to the live document: each
/// [`Template::set`] (or [`Context::set`] on a clone of its context)
/// re-renders the sites of that key before returning.
///
/// Listeners and write hooks stay installed until [`Template::dispose`];
/// dropping the instance does not detach them.
pub struct Template {
    name: String,
    context: Context,
    bind_map: Rc<BindMap>,
    document: Document,
    mounted: Vec<NodeId>,
    listeners: Vec<ListenerId>,
    lifecycle: Lifecycle,
    disposed: Cell<bool>,
}

impl Template {
    pub fn new(
        options: TemplateOptions,
        source: &dyn TemplateSource,
        document: &Document,
    ) -> Result<Self> {
        let TemplateOptions {
            name,
            mount,
            data,
            methods,
            config,
            mounted: mounted_hooks,
        } = options;

        let tree = Loader::new(source, &config).fetch(&name)?;
        let container = document
            .element_by_id(&mount)
            .ok_or_else(|| Error::MountTargetNotFound(mount.clone()))?;

        let context = Context::new(data, methods);
        let mut ids = {
            let doc = document.borrow();
            IdGenerator::new(config.id_format).excluding(doc.markers())
        };
        let Parsed {
            tree,
            bind_map,
            listeners,
        } = parse(tree, &context, &mut ids)?;
        let tree = build(&bind_map, tree, &context);
        let mounted = document.mount(container, tree);
        debug!(template = %name, mount = %mount, nodes = mounted.len(), "mounted template");

        let bind_map = Rc::new(bind_map);
        let hooks = install_updaters(&context, &bind_map, document);

        let lifecycle = Lifecycle::new();
        {
            let document = document.clone();
            let listeners = listeners.clone();
            lifecycle.before_destroy(move || {
                let mut tree = document.borrow_mut();
                for id in listeners {
                    tree.remove_listener(id);
                }
            });
        }
        {
            let context = context.clone();
            lifecycle.before_destroy(move || {
                for (key, id) in hooks {
                    context.unwatch(&key, id);
                }
            });
        }
        for hook in mounted_hooks {
            let context = context.clone();
            lifecycle.on_mounted(move || hook(&context));
        }

        let template = Self {
            name,
            context,
            bind_map,
            document: document.clone(),
            mounted,
            listeners,
            lifecycle,
            disposed: Cell::new(false),
        };
        template.lifecycle.run_mounted_hooks();
        Ok(template)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn bind_map(&self) -> &BindMap {
        &self.bind_map
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Top-level nodes appended to the mount container.
    pub fn mounted_nodes(&self) -> &[NodeId] {
        &self.mounted
    }

    /// Listeners attached for event directives.
    pub fn listeners(&self) -> &[ListenerId] {
        &self.listeners
    }

    pub fn get(&self, key: &str) -> Value {
        self.context.get(key)
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.context.set(key, value);
    }

    /// Live node carrying `id`.
    pub fn node(&self, id: &Identifier) -> Option<NodeId> {
        self.document.find_marked(id)
    }

    pub fn dispatch(&self, target: NodeId, event_type: &str) -> DispatchOutcome {
        self.document.dispatch(target, event_type)
    }

    /// Dispatch at the node carrying `id`, if it is still in the document.
    pub fn dispatch_marked(&self, id: &Identifier, event_type: &str) -> Option<DispatchOutcome> {
        let target = self.node(id)?;
        Some(self.dispatch(target, event_type))
    }

    /// HTML of the mounted nodes.
    pub fn to_html(&self) -> String {
        let tree = self.document.borrow();
        self.mounted
            .iter()
            .map(|n| weft_dom::html::to_html(&tree, *n))
            .collect()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Detach every listener and write hook this instance installed. The
    /// mounted nodes stay in the document. Calling it again does nothing.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.lifecycle.run_destroy_hooks();
        debug!(template = %self.name, "disposed template");
    }
}

/// One write hook per bound key, applying that key's patches to the live
/// document.
fn install_updaters(
    context: &Context,
    bind_map: &Rc<BindMap>,
    document: &Document,
) -> Vec<(String, HookId)> {
    let mut hooks = Vec::new();
    for key in bind_map.keys() {
        let owned_key = key.to_string();
        let map = bind_map.clone();
        let document = document.clone();
        let weak = context.downgrade();
        let id = context.watch(key, move |_| {
            let Some(ctx) = weak.upgrade() else { return };
            // Rendering may run methods; the document is only borrowed to apply.
            let patches = update::plan(&owned_key, &map, &ctx);
            let applied = update::apply(&patches, &mut document.borrow_mut());
            trace!(key = %owned_key, applied, "applied update");
        });
        hooks.push((key.to_string(), id));
    }
    hooks
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("keys", &self.bind_map.len())
            .field("mounted", &self.mounted)
            .field("listeners", &self.listeners.len())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}
