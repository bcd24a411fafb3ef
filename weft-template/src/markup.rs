use html_escape::decode_html_entities;
use weft_dom::html::is_void;
use weft_dom::{NodeId, Tree};

/// Minimal hand-rolled HTML-ish parser producing a detached [`Tree`]:
/// - nested elements, self-closing (`<input/>`) and void (`<br>`) tags
/// - quoted, unquoted and boolean attributes; names may carry `.` modifiers
/// - text (placeholders are kept verbatim) and `<!-- comments -->`
/// - character references in text and attribute values are decoded, so the
///   tree holds the characters they stand for
///
/// Unknown closing tags are ignored and unclosed elements end at input end.
pub fn parse_markup(input: &str) -> Result<Tree, String> {
    let mut i = 0usize;
    let bytes = input.as_bytes();
    let mut tree = Tree::new();
    let mut stack: Vec<NodeId> = vec![tree.root()];

    while i < bytes.len() {
        let parent = *stack.last().unwrap_or(&tree.root());
        if input[i..].starts_with("<!--") {
            let start = i + 4;
            let Some(len) = input[start..].find("-->") else {
                return Err(format!("unterminated comment at byte {}", i));
            };
            let c = tree.create_comment(&input[start..start + len]);
            tree.append_child(parent, c);
            i = start + len + 3;
        } else if bytes[i] == b'<' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
            i += 2;
            let tag = read_ident(bytes, &mut i);
            skip_ws(bytes, &mut i);
            if i < bytes.len() && bytes[i] == b'>' {
                i += 1;
            }
            // pop until matching tag
            if let Some(pos) = stack
                .iter()
                .rposition(|n| tree.tag(*n).is_some_and(|t| t.eq_ignore_ascii_case(&tag)))
            {
                stack.truncate(pos);
            }
        } else if bytes[i] == b'<' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_alphabetic() {
            i += 1;
            let tag = read_ident(bytes, &mut i);
            let el = tree.create_element(tag.as_str());
            tree.append_child(parent, el);
            let mut self_closing = false;

            loop {
                skip_ws(bytes, &mut i);
                if i >= bytes.len() {
                    return Err(format!("unterminated <{}> tag", tag));
                }
                match bytes[i] {
                    b'/' => {
                        self_closing = true;
                        i += 1;
                        skip_ws(bytes, &mut i);
                        if i < bytes.len() && bytes[i] == b'>' {
                            i += 1;
                        }
                        break;
                    }
                    b'>' => {
                        i += 1;
                        break;
                    }
                    _ => {
                        if let Some((name, value)) = read_attribute(bytes, &mut i) {
                            tree.set_attribute(el, &name, value);
                        } else {
                            // skip unknown token
                            i += 1;
                        }
                    }
                }
            }

            if !self_closing && !is_void(&tag) {
                stack.push(el);
            }
        } else {
            // text until the next tag-like '<'
            let start = i;
            i += 1;
            while i < bytes.len() && !starts_tag(bytes, i) {
                i += 1;
            }
            let raw = &input[start..i];
            let text = if is_all_ws(raw) {
                if parent == tree.root() {
                    continue;
                }
                // collapse indentation between tags
                " ".to_string()
            } else {
                decode_html_entities(raw).into_owned()
            };
            let t = tree.create_text(text);
            tree.append_child(parent, t);
        }
    }

    Ok(tree)
}

fn starts_tag(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'<'
        && i + 1 < bytes.len()
        && (bytes[i + 1].is_ascii_alphabetic() || bytes[i + 1] == b'/' || bytes[i + 1] == b'!')
}

fn is_all_ws(s: &str) -> bool {
    s.chars().all(|c| c.is_whitespace())
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn read_ident(bytes: &[u8], i: &mut usize) -> String {
    let start = *i;
    while *i < bytes.len() {
        let c = bytes[*i] as char;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            *i += 1;
        } else {
            break;
        }
    }
    String::from_utf8_lossy(&bytes[start..*i]).into_owned()
}

fn read_attribute(bytes: &[u8], i: &mut usize) -> Option<(String, String)> {
    let name_start = *i;
    while *i < bytes.len() {
        let c = bytes[*i] as char;
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '@' | '.') {
            *i += 1;
        } else {
            break;
        }
    }
    if *i == name_start {
        return None;
    }
    let name = String::from_utf8(bytes[name_start..*i].to_vec()).ok()?;

    skip_ws(bytes, i);
    let mut value = String::new();
    if *i < bytes.len() && bytes[*i] == b'=' {
        *i += 1;
        skip_ws(bytes, i);
        let raw = read_quoted(bytes, i).or_else(|| read_unquoted(bytes, i))?;
        value = decode_html_entities(&raw).into_owned();
    }
    Some((name, value))
}

fn read_quoted(bytes: &[u8], i: &mut usize) -> Option<String> {
    if *i >= bytes.len() {
        return None;
    }
    let quote = bytes[*i];
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    *i += 1;
    let start = *i;
    while *i < bytes.len() && bytes[*i] != quote {
        *i += 1;
    }
    let s = String::from_utf8(bytes[start..*i].to_vec()).ok()?;
    if *i < bytes.len() {
        *i += 1;
    } // consume closing quote
    Some(s)
}

fn read_unquoted(bytes: &[u8], i: &mut usize) -> Option<String> {
    let start = *i;
    while *i < bytes.len() && !bytes[*i].is_ascii_whitespace() && bytes[*i] != b'>' {
        *i += 1;
    }
    String::from_utf8(bytes[start..*i].to_vec()).ok()
}
