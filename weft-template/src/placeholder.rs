//! Placeholder tokenizer.
//!
//! `{{ key }}` substitutes a value, `{{ key() }}` substitutes the result of
//! calling the method stored under `key`. Whitespace inside the braces is
//! ignored; keys are `[A-Za-z0-9_-]+`. Anything else, including unterminated
//! braces, stays literal text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_-]+)\s*(\(\s*\))?\s*\}\}").expect("placeholder pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub key: String,
    pub invoked: bool,
    /// The placeholder exactly as written, braces included.
    pub span: String,
    /// Byte range of `span` within the raw string.
    pub range: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A templated string split into literal and placeholder segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(raw) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                segments.push(Segment::Literal(raw[last..whole.start()].to_string()));
            }
            segments.push(Segment::Placeholder(Placeholder {
                key: caps[1].to_string(),
                invoked: caps.get(2).is_some(),
                span: whole.as_str().to_string(),
                range: whole.range(),
            }));
            last = whole.end();
        }
        if last < raw.len() {
            segments.push(Segment::Literal(raw[last..].to_string()));
        }
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(p) => Some(p),
            Segment::Literal(_) => None,
        })
    }

    pub fn has_placeholders(&self) -> bool {
        self.placeholders().next().is_some()
    }

    /// Rebuild the string from the raw pattern, substituting every
    /// placeholder with `resolve`'s output.
    pub fn render(&self, mut resolve: impl FnMut(&Placeholder) -> String) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Placeholder(p) => out.push_str(&resolve(p)),
            }
        }
        out
    }
}
