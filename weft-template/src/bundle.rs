use pest::Parser;
use pest::iterators::Pair;

use crate::error::{Error, Result};

#[derive(pest_derive::Parser)]
#[grammar = "grammar.pest"]
struct BundleParser;

/// One named template of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// The block's `id`, or its `name` when it has no `id`.
    pub name: String,
    /// Markup between the opening and closing tags, untouched.
    pub body: String,
    /// 1-based line of the opening tag.
    pub line: usize,
}

/// Split a bundle into its named templates, in source order. Every block
/// must be named.
pub fn parse_bundle(source: &str) -> Result<Vec<BundleEntry>> {
    let file = BundleParser::parse(Rule::file, source)
        .map_err(|e| Error::Bundle(e.to_string()))?
        .next()
        .ok_or_else(|| Error::Bundle("empty bundle".to_string()))?;

    file.into_inner()
        .filter(|pair| pair.as_rule() == Rule::block)
        .map(entry)
        .collect()
}

fn entry(block: Pair<Rule>) -> Result<BundleEntry> {
    let (line, _) = block.line_col();
    let mut id = None;
    let mut name = None;
    let mut body = "";

    for part in block.into_inner() {
        match part.as_rule() {
            Rule::template_open => {
                for attribute in part.into_inner() {
                    let mut inner = attribute.into_inner();
                    let key = inner.next().map(|k| k.as_str());
                    // quoted -> dq_value | sq_value
                    let value = inner
                        .next()
                        .and_then(|q| q.into_inner().next())
                        .map(|v| v.as_str());
                    match (key, value) {
                        (Some("id"), Some(v)) => id = Some(v),
                        (Some("name"), Some(v)) => name = Some(v),
                        _ => {}
                    }
                }
            }
            Rule::template_body => body = part.as_str(),
            _ => {}
        }
    }

    let name = id
        .or(name)
        .ok_or_else(|| Error::Bundle(format!("<template> at line {line} has no id")))?;
    Ok(BundleEntry {
        name: name.to_string(),
        body: body.to_string(),
        line,
    })
}
