use anyhow::{Context as _, Result, anyhow, bail};
use indexmap::IndexMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::debug;
use weft_dom::{Document, IdGenerator, h};
use weft_template::{
    BindingKind, Context, Loader, Template, TemplateConfig, TemplateOptions, TemplateStore, Value,
};

/// Id of the container the CLI mounts into.
pub const MOUNT_ID: &str = "app";

/// Read and parse a template bundle.
pub fn load_store(bundle: &Path) -> Result<TemplateStore> {
    let src = fs::read_to_string(bundle)
        .with_context(|| format!("failed to read {}", bundle.display()))?;
    TemplateStore::from_bundle(&src).with_context(|| format!("failed to load {}", bundle.display()))
}

/// Read a JSON object of initial context values.
pub fn load_data(path: &Path) -> Result<IndexMap<String, Value>> {
    let src =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&src)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let serde_json::Value::Object(map) = json else {
        bail!("{} must hold a JSON object", path.display());
    };
    Ok(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
}

/// Split a `key=value` assignment.
pub fn parse_assignment(s: &str) -> Result<(String, String)> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got `{s}`"))?;
    if key.is_empty() {
        bail!("empty key in `{s}`");
    }
    Ok((key.to_string(), raw.to_string()))
}

/// Read an assignment value as JSON when it parses as such, otherwise as a
/// plain string.
pub fn assignment_value(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw))
}

/// Mount `template` into an empty document, apply `assignments` as context
/// writes in order, and return the resulting HTML.
pub fn render(
    bundle: &Path,
    template: &str,
    data: Option<&Path>,
    assignments: &[(String, String)],
) -> Result<String> {
    let store = load_store(bundle)?;
    let mut options = TemplateOptions::new(template, MOUNT_ID);
    if let Some(path) = data {
        options.data = load_data(path)?;
    }

    let document = Document::from_vnodes(&[h("div", vec![("id", MOUNT_ID)], vec![])]);
    let instance = Template::new(options, &store, &document)
        .with_context(|| format!("failed to mount template `{template}`"))?;
    for (key, raw) in assignments {
        debug!(key = %key, "applying assignment");
        instance.set(key, assignment_value(raw));
    }
    let html = instance.to_html();
    instance.dispose();
    Ok(html)
}

/// Describe the bind map of `template`: one line per binding entry,
/// grouped by key.
pub fn inspect(bundle: &Path, template: &str) -> Result<String> {
    let store = load_store(bundle)?;
    let config = TemplateConfig::default();
    let tree = Loader::new(&store, &config)
        .fetch(template)
        .with_context(|| format!("failed to load template `{template}`"))?;
    let parsed = weft_template::parse(tree, &Context::default(), &mut IdGenerator::default())
        .with_context(|| format!("failed to parse template `{template}`"))?;

    let mut out = String::new();
    for (key, nodes) in parsed.bind_map.iter() {
        writeln!(out, "{key}")?;
        for (id, entries) in nodes {
            let tag = parsed
                .tree
                .find_marked(id)
                .and_then(|n| parsed.tree.tag(n))
                .unwrap_or("?");
            for entry in entries {
                let site = match &entry.kind {
                    BindingKind::Attribute { name } => format!("@{name}"),
                    BindingKind::Text { index } => format!("#text[{index}]"),
                };
                writeln!(out, "  <{tag}> {id} {site} {:?}", entry.raw_pattern.raw())?;
            }
        }
    }
    writeln!(
        out,
        "{} keys, {} entries",
        parsed.bind_map.len(),
        parsed.bind_map.entry_count()
    )?;
    Ok(out)
}
