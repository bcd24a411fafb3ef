use std::cell::RefCell;
use std::rc::Rc;

use weft_dom::{Document, IdError, IdFormat, h};
use weft_template::{
    Error, Method, Template, TemplateConfig, TemplateOptions, TemplateStore, Value,
};

const BUNDLE: &str = r#"
<template id="counter">
  <div class="counter {{ state }}">
    <span class="label">{{ label }}: {{ count }}</span>
    <button onClick="{{ increment }}">+</button>
    <button onClick.once="{{ reset }}" class="reset">reset</button>
    <div data-dependency="footer"></div>
  </div>
</template>

<template id="footer">
  <small>{{ label }} footer</small>
</template>

<template id="greeting">
  <p>prefix {{x}} suffix</p>
</template>
"#;

fn store() -> TemplateStore {
    TemplateStore::from_bundle(BUNDLE).expect("bundle")
}

fn document() -> Document {
    Document::from_vnodes(&[h(
        "body",
        (),
        vec![h("div", vec![("id", "app")], vec![]), h("div", vec![("id", "other")], vec![])],
    )])
}

fn counter_options() -> TemplateOptions {
    counter_at("app")
}

fn counter_at(mount: &str) -> TemplateOptions {
    TemplateOptions::new("counter", mount)
        .data("label", "Clicks")
        .data("count", 0)
        .data("state", "idle")
        .method(
            "increment",
            Method::handler(|ctx, _| {
                let n = ctx.get("count").as_i64().unwrap_or(0);
                ctx.set("count", n + 1);
            }),
        )
        .method("reset", Method::handler(|ctx, _| ctx.set("count", 0)))
}

fn buttons(template: &Template) -> Vec<weft_dom::NodeId> {
    let doc = template.document().borrow();
    let root = template.mounted_nodes()[0];
    doc.descendants(root)
        .into_iter()
        .filter(|n| doc.tag(*n) == Some("button"))
        .collect()
}

#[test]
fn mounts_rendered_content_with_dependency() {
    let doc = document();
    let t = Template::new(counter_options(), &store(), &doc).unwrap();

    let html = t.to_html();
    assert!(html.starts_with(r#"<div class="counter idle">"#), "{html}");
    assert!(html.contains(r#"<span class="label">Clicks: 0</span>"#));
    assert!(html.contains("<small>Clicks footer</small>"));
    assert!(!html.contains("{{"));
    assert!(!html.contains("onClick"));

    let app = doc.element_by_id("app").unwrap();
    assert_eq!(doc.borrow().children(app), t.mounted_nodes());
}

#[test]
fn set_updates_every_site_of_the_key() {
    let doc = document();
    let t = Template::new(counter_options(), &store(), &doc).unwrap();

    t.set("label", "Taps");
    let html = t.to_html();
    assert!(html.contains("Taps: 0"));
    assert!(html.contains("<small>Taps footer</small>"));
    assert_eq!(t.get("label"), Value::from("Taps"));

    // writes through any clone of the context are seen too
    t.context().set("state", "busy");
    assert!(t.to_html().starts_with(r#"<div class="counter busy">"#));
}

#[test]
fn round_trip_keeps_literal_text() {
    let doc = document();
    let t = Template::new(
        TemplateOptions::new("greeting", "app").data("x", "V"),
        &store(),
        &doc,
    )
    .unwrap();
    assert_eq!(t.to_html(), "<p>prefix V suffix</p>");
    t.set("x", "W");
    assert_eq!(t.to_html(), "<p>prefix W suffix</p>");
    t.set("x", "W");
    assert_eq!(t.to_html(), "<p>prefix W suffix</p>");
}

#[test]
fn unknown_key_is_stored_without_touching_the_document() {
    let doc = document();
    let t = Template::new(counter_options(), &store(), &doc).unwrap();
    let before = doc.to_html();
    t.set("neverReferenced", 5);
    assert_eq!(t.get("neverReferenced"), Value::Int(5));
    assert_eq!(doc.to_html(), before);
}

#[test]
fn listener_updates_document_through_context() {
    let doc = document();
    let t = Template::new(counter_options(), &store(), &doc).unwrap();
    let plus = buttons(&t)[0];

    assert_eq!(t.dispatch(plus, "click").invoked, 1);
    t.dispatch(plus, "click");
    assert_eq!(t.get("count"), Value::Int(2));
    assert!(t.to_html().contains("Clicks: 2"));
}

#[test]
fn handler_is_bound_at_parse_time() {
    let doc = document();
    let t = Template::new(counter_options(), &store(), &doc).unwrap();
    let plus = buttons(&t)[0];

    t.set("increment", Method::handler(|ctx, _| ctx.set("count", 100)));
    t.dispatch(plus, "click");
    assert_eq!(t.get("count"), Value::Int(1));
}

#[test]
fn once_modifier_detaches_after_first_event() {
    let doc = document();
    let t = Template::new(counter_options(), &store(), &doc).unwrap();
    let found = buttons(&t);
    assert_eq!(found.len(), 2);
    let (plus, reset) = (found[0], found[1]);

    t.dispatch(plus, "click");
    assert_eq!(t.dispatch(reset, "click").invoked, 1);
    assert_eq!(t.get("count"), Value::Int(0));

    t.dispatch(plus, "click");
    assert_eq!(t.dispatch(reset, "click").invoked, 0);
    assert_eq!(t.get("count"), Value::Int(1));
}

#[test]
fn instances_are_isolated() {
    let doc = document();
    let store = store();
    let a = Template::new(counter_options(), &store, &doc).unwrap();
    let b = Template::new(counter_at("other"), &store, &doc).unwrap();

    a.set("label", "A");
    assert!(a.to_html().contains("A: 0"));
    assert!(b.to_html().contains("Clicks: 0"));

    let a_markers: Vec<_> = {
        let tree = doc.borrow();
        tree.descendants(a.mounted_nodes()[0])
            .into_iter()
            .filter_map(|n| tree.marker_of(n).cloned())
            .collect()
    };
    for m in &a_markers {
        let node = doc.find_marked(m).unwrap();
        let tree = doc.borrow();
        assert!(tree.ancestry(node).contains(&a.mounted_nodes()[0]));
    }
}

#[test]
fn mounted_hooks_run_after_mount() {
    let doc = document();
    let seen = Rc::new(RefCell::new(None));
    let t = {
        let seen = seen.clone();
        let doc2 = doc.clone();
        Template::new(
            counter_options().on_mounted(move |ctx| {
                *seen.borrow_mut() = Some((ctx.get("label"), doc2.to_html().contains("Clicks: 0")));
            }),
            &store(),
            &doc,
        )
        .unwrap()
    };
    assert_eq!(*seen.borrow(), Some((Value::from("Clicks"), true)));
    assert!(!t.is_disposed());
}

#[test]
fn dispose_detaches_listeners_and_hooks() {
    let doc = document();
    let t = Template::new(counter_options(), &store(), &doc).unwrap();
    let plus = buttons(&t)[0];

    t.dispose();
    assert!(t.is_disposed());
    assert_eq!(t.context().watcher_count("label"), 0);
    assert_eq!(t.dispatch(plus, "click").invoked, 0);

    t.set("label", "Gone");
    assert!(t.to_html().contains("Clicks: 0"));
    // nodes stay mounted
    assert!(doc.to_html().contains("Clicks"));

    t.dispose();
}

#[test]
fn missing_template_and_mount_target() {
    let doc = document();
    let err = Template::new(TemplateOptions::new("nope", "app"), &store(), &doc).unwrap_err();
    assert_eq!(err, Error::TemplateNotFound("nope".into()));

    let err = Template::new(TemplateOptions::new("greeting", "nowhere"), &store(), &doc)
        .unwrap_err();
    assert_eq!(err, Error::MountTargetNotFound("nowhere".into()));
    assert!(doc.to_html().contains(r#"<div id="app"></div>"#));
}

#[test]
fn dispatch_by_identifier() {
    let doc = document();
    let t = Template::new(counter_options(), &store(), &doc).unwrap();
    let plus = buttons(&t)[0];
    let id = doc.borrow().marker_of(plus).cloned().expect("marked");

    assert_eq!(t.node(&id), Some(plus));
    assert_eq!(t.dispatch_marked(&id, "click").map(|o| o.invoked), Some(1));
    assert_eq!(t.get("count"), Value::Int(1));
}

#[test]
fn identifier_format_without_body_fails_construction() {
    let doc = document();
    let before = doc.to_html();
    let config = TemplateConfig::default().with_id_format(IdFormat {
        header_len: 1,
        body_len: 0,
    });
    let err = Template::new(counter_options().config(config), &store(), &doc).unwrap_err();
    assert_eq!(err, Error::Identifier(IdError::EmptyBody));
    assert_eq!(doc.to_html(), before);
}

#[test]
fn too_many_elements_for_the_identifier_space() {
    let mut store = TemplateStore::new();
    let items: String = (0..40).map(|i| format!("<li>{i}</li>")).collect();
    store
        .insert_markup("long", &format!("<ul>{items}</ul>"))
        .unwrap();

    let doc = document();
    let format = IdFormat {
        header_len: 0,
        body_len: 1,
    };
    let options =
        TemplateOptions::new("long", "app").config(TemplateConfig::default().with_id_format(format));
    let err = Template::new(options, &store, &doc).unwrap_err();
    assert_eq!(err, Error::Identifier(IdError::Exhausted { capacity: 37 }));
    assert!(doc.to_html().contains(r#"<div id="app"></div>"#));
}

#[test]
fn entities_render_once_escaped() {
    let mut store = TemplateStore::new();
    store
        .insert_markup("pair", r#"<p title="a &amp; b">Tom &amp; {{ who }}</p>"#)
        .unwrap();
    let doc = document();
    let t = Template::new(
        TemplateOptions::new("pair", "app").data("who", "Jerry"),
        &store,
        &doc,
    )
    .unwrap();
    assert_eq!(t.to_html(), r#"<p title="a &amp; b">Tom &amp; Jerry</p>"#);

    t.set("who", "<Spike>");
    assert_eq!(t.to_html(), r#"<p title="a &amp; b">Tom &amp; &lt;Spike&gt;</p>"#);
}
