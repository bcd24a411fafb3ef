use crate::{NodeId, NodeKind, Tree};

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

/// Serialize `node` and its subtree. A fragment serializes as its children.
/// Markers and listeners live outside the node data and are never emitted.
pub fn to_html(tree: &Tree, node: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, node, &mut out);
    out
}

fn write_node(tree: &Tree, node: NodeId, out: &mut String) {
    match tree.kind(node) {
        NodeKind::Fragment => {
            for c in tree.children(node) {
                write_node(tree, *c, out);
            }
        }
        NodeKind::Text(t) => escape_into(t, false, out),
        NodeKind::Comment(t) => {
            out.push_str("<!--");
            out.push_str(t);
            out.push_str("-->");
        }
        NodeKind::Element { tag, attrs } => {
            out.push('<');
            out.push_str(tag);
            for (k, v) in attrs {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                escape_into(v, true, out);
                out.push('"');
            }
            out.push('>');
            if is_void(tag) {
                return;
            }
            for c in tree.children(node) {
                write_node(tree, *c, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn escape_into(s: &str, attr: bool, out: &mut String) {
    if attr {
        html_escape::encode_double_quoted_attribute_to_string(s, out);
    } else {
        html_escape::encode_text_to_string(s, out);
    }
}
