//! Declarative template binding.
//!
//! A named skeleton is loaded (with its dependencies grafted in), parsed into
//! a [`BindMap`] of placeholder sites, rendered once from a reactive
//! [`Context`] and mounted into a host [`Document`](weft_dom::Document).
//! After that, every [`Context::set`] re-renders exactly the sites bound to
//! the written key.

pub mod bind_map;
pub mod builder;
pub mod bundle;
pub mod config;
pub mod context;
pub mod error;
pub mod loader;
pub mod markup;
pub mod parser;
pub mod placeholder;
pub mod store;
pub mod template;
pub mod update;
pub mod value;

pub use bind_map::{BindMap, BindingEntry, BindingKind};
pub use builder::build;
pub use config::TemplateConfig;
pub use context::{Context, WeakContext};
pub use error::{Error, Result};
pub use loader::Loader;
pub use parser::{Parsed, parse};
pub use placeholder::{Pattern, Placeholder, Segment};
pub use store::{Skeleton, TemplateSource, TemplateStore};
pub use template::{Template, TemplateOptions};
pub use update::Patch;
pub use value::{Method, Value};
