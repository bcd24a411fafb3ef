//! Reactive primitives shared by the weft crates.

pub mod lifecycle;
pub mod settable;

pub use lifecycle::Lifecycle;
pub use settable::{HookId, Settable};
