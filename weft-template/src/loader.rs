use tracing::debug;
use weft_dom::Tree;

use crate::config::TemplateConfig;
use crate::error::{Error, Result};
use crate::store::TemplateSource;

/// Fetches skeletons and grafts their dependencies.
///
/// The template graph must be acyclic: a template that depends on itself,
/// directly or through others, recurses without bound.
pub struct Loader<'a> {
    source: &'a dyn TemplateSource,
    dependency_attribute: &'a str,
}

impl<'a> Loader<'a> {
    pub fn new(source: &'a dyn TemplateSource, config: &'a TemplateConfig) -> Self {
        Self {
            source,
            dependency_attribute: &config.dependency_attribute,
        }
    }

    /// A detached working copy of `name`, every dependency marker holding
    /// the fetched dependency as its last children.
    pub fn fetch(&self, name: &str) -> Result<Tree> {
        let skeleton = self
            .source
            .lookup(name)
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))?;
        let mut tree = skeleton.instantiate();

        // Markers of this fragment only; grafted content resolved its own.
        let markers = tree.find_by_attribute(tree.root(), self.dependency_attribute);
        for marker in markers {
            let Some(dependency) = tree
                .attribute(marker, self.dependency_attribute)
                .map(str::to_string)
            else {
                continue;
            };
            debug!(template = name, dependency = %dependency, "grafting dependency");
            let fragment = self.fetch(&dependency)?;
            tree.graft(marker, fragment);
        }
        Ok(tree)
    }
}
