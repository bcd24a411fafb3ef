use weft_dom::IdFormat;

/// Attribute naming the template to graft into a marker element.
pub const DEFAULT_DEPENDENCY_ATTRIBUTE: &str = "data-dependency";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateConfig {
    pub dependency_attribute: String,
    pub id_format: IdFormat,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dependency_attribute: DEFAULT_DEPENDENCY_ATTRIBUTE.to_string(),
            id_format: IdFormat::default(),
        }
    }
}

impl TemplateConfig {
    pub fn with_dependency_attribute(mut self, name: impl Into<String>) -> Self {
        self.dependency_attribute = name.into();
        self
    }

    pub fn with_id_format(mut self, format: IdFormat) -> Self {
        self.id_format = format;
        self
    }
}
