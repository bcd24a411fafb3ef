use weft_dom::{h, text, Identifier, ListenerOptions, NodeKind, Props, Tree, VNode};

fn first(tree: &Tree) -> weft_dom::NodeId {
    tree.children(tree.root())[0]
}

#[test]
fn attributes_keep_source_order_and_position() {
    let mut tree = Tree::from_vnodes(&[h(
        "input",
        Props::new().set("type", "text").set("value", "a").set("name", "q"),
        vec![],
    )]);
    let input = first(&tree);
    tree.set_attribute(input, "value", "b");
    let names: Vec<String> = tree.attributes(input).into_iter().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["type", "value", "name"]);
    assert_eq!(tree.attribute(input, "value"), Some("b"));

    assert_eq!(tree.remove_attribute(input, "type"), Some("text".to_string()));
    assert_eq!(tree.attributes(input).len(), 2);
}

#[test]
fn set_text_only_touches_text_nodes() {
    let mut tree = Tree::from_vnodes(&[h("p", (), vec![text("a"), h("b", (), vec![])])]);
    let p = first(&tree);
    let kids = tree.children(p).to_vec();
    assert!(tree.set_text(kids[0], "z"));
    assert!(!tree.set_text(kids[1], "z"));
    assert_eq!(tree.text(kids[0]), Some("z"));
}

#[test]
fn descendants_are_document_ordered_elements() {
    let tree = Tree::from_vnodes(&[
        h("div", (), vec![h("span", (), vec![text("x")]), h("em", (), vec![])]),
        h("footer", vec![("data-dependency", "footer")], vec![]),
    ]);
    let tags: Vec<&str> = tree
        .descendants(tree.root())
        .into_iter()
        .filter_map(|n| tree.tag(n))
        .collect();
    assert_eq!(tags, vec!["div", "span", "em", "footer"]);
    assert_eq!(tree.find_by_attribute(tree.root(), "data-dependency").len(), 1);
}

#[test]
fn element_by_id_finds_nested_container() {
    let tree = Tree::from_vnodes(&[h("body", (), vec![h("main", vec![("id", "app")], vec![])])]);
    let main = tree.element_by_id("app").expect("app container");
    assert_eq!(tree.tag(main), Some("main"));
    assert_eq!(tree.element_by_id("missing"), None);
}

#[test]
fn graft_carries_markers_and_listeners() {
    let mut host = Tree::from_vnodes(&[h("div", vec![("id", "app")], vec![])]);
    let container = host.element_by_id("app").unwrap();

    let mut frag = Tree::from_vnodes(&[h("button", (), vec![text("go")]), text("tail")]);
    let button = first(&frag);
    let id = Identifier::new_unchecked("07abc_def012345x");
    frag.mark(button, id.clone());
    let listener = frag.add_listener(button, "click", ListenerOptions::default(), |_| {});

    let top = host.graft(container, frag);
    assert_eq!(top.len(), 2);
    assert_eq!(host.children(container), top.as_slice());

    let moved = host.find_marked(&id).expect("marker travels with node");
    assert_eq!(moved, top[0]);
    assert_eq!(host.parent(moved), Some(container));
    assert!(host.has_listener(listener));
    assert_eq!(host.listener_count(moved), 1);
    assert_eq!(host.text_content(container), "gotail");
}

#[test]
fn graft_leaves_no_detached_root_behind() {
    let mut host = Tree::from_vnodes(&[h("div", vec![("id", "app")], vec![])]);
    let container = host.element_by_id("app").unwrap();
    let before = host.len();

    let frag = Tree::from_vnodes(&[h("button", (), vec![text("go")]), text("tail")]);
    assert_eq!(frag.len(), 4);
    host.graft(container, frag);
    assert_eq!(host.len(), before + 3);

    for _ in 0..3 {
        let frag = Tree::from_vnodes(&[h("i", (), vec![])]);
        host.graft(container, frag);
    }
    assert_eq!(host.len(), before + 6);
    // root, five elements and the two text nodes: every node is reachable
    assert_eq!(host.descendants(host.root()).len(), 5);
    assert_eq!(host.len(), 1 + 5 + 2);
}

#[test]
fn clone_keeps_handles_valid() {
    let mut tree = Tree::from_vnodes(&[h("p", (), vec![text("hi")])]);
    let p = first(&tree);
    tree.mark(p, Identifier::new_unchecked("00000000000000aa"));

    let mut copy = tree.clone();
    copy.set_attribute(p, "class", "x");

    assert_eq!(copy.find_marked(&Identifier::new_unchecked("00000000000000aa")), Some(p));
    assert_eq!(tree.attribute(p, "class"), None);
}

#[test]
fn to_vnode_round_trips_structure() {
    let v = h("ul", vec![("class", "list")], vec![h("li", (), vec![text("one")])]);
    let tree = Tree::from_vnodes(std::slice::from_ref(&v));
    assert_eq!(tree.to_vnode(first(&tree)), v);
    assert!(matches!(tree.kind(tree.root()), NodeKind::Fragment));
    assert!(matches!(tree.to_vnode(tree.root()), VNode::Element { .. }));
}
