use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use weft_template::{Context, Method, Value};

fn counter() -> Context {
    let mut data = IndexMap::new();
    data.insert("count".to_string(), Value::from(1));
    let mut methods = IndexMap::new();
    methods.insert(
        "double".to_string(),
        Method::computed(|ctx| Value::from(ctx.get("count").as_i64().unwrap_or(0) * 2)),
    );
    Context::new(data, methods)
}

#[test]
fn get_set_and_undefined() {
    let ctx = counter();
    assert_eq!(ctx.get("count"), Value::Int(1));
    assert_eq!(ctx.get("missing"), Value::Undefined);
    assert!(!ctx.contains("missing"));

    ctx.set("missing", "now here");
    assert_eq!(ctx.get("missing"), Value::from("now here"));
    assert_eq!(ctx.keys(), vec!["count", "double", "missing"]);
}

#[test]
fn methods_are_named_after_their_key() {
    let ctx = counter();
    assert_eq!(ctx.get("double").to_string(), "[method double]");
    assert_eq!(ctx.resolve("double", false).to_string(), "[method double]");
    assert_eq!(ctx.resolve("double", true), Value::Int(2));
    // invoking a non-method just reads it
    assert_eq!(ctx.resolve("count", true), Value::Int(1));
}

#[test]
fn call_uses_context_as_receiver() {
    let ctx = counter();
    assert_eq!(ctx.call("double", None), Some(Value::Int(2)));
    ctx.set("count", 21);
    assert_eq!(ctx.call("double", None), Some(Value::Int(42)));
    assert_eq!(ctx.call("count", None), None);
}

#[test]
fn watch_runs_only_for_its_key() {
    let ctx = counter();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let id = {
        let seen = seen.clone();
        ctx.watch("count", move |v| seen.borrow_mut().push(v.clone()))
    };

    ctx.set("count", 2);
    ctx.set("other", 9);
    ctx.set("count", 2);
    assert_eq!(*seen.borrow(), vec![Value::Int(2), Value::Int(2)]);

    assert_eq!(ctx.watcher_count("count"), 1);
    assert!(ctx.unwatch("count", id));
    assert!(!ctx.unwatch("count", id));
    ctx.set("count", 3);
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn hooks_may_write_the_context() {
    let ctx = counter();
    {
        let weak = ctx.downgrade();
        ctx.watch("count", move |v| {
            let ctx = weak.upgrade().unwrap();
            ctx.set("label", format!("count is {v}"));
        });
    }
    ctx.set("count", 5);
    assert_eq!(ctx.get("label"), Value::from("count is 5"));
}

#[test]
fn clones_share_state() {
    let ctx = counter();
    let other = ctx.clone();
    other.set("count", 10);
    assert_eq!(ctx.get("count"), Value::Int(10));
    assert!(ctx.ptr_eq(&other));
    assert!(!ctx.ptr_eq(&counter()));
}

#[test]
fn weak_handle_does_not_keep_context_alive() {
    let ctx = counter();
    let weak = ctx.downgrade();
    assert!(weak.upgrade().is_some());
    drop(ctx);
    assert!(weak.upgrade().is_none());
}
