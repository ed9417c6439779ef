// ABOUTME: Stack template documents in either JSON or YAML form.
// ABOUTME: The first non-blank character decides the parser; there is no fallback.

use thiserror::Error;

use crate::cloud::DeletionPolicy;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("invalid JSON template: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML template: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("template must be a mapping at the top level")]
    NotAMapping,
}

/// A parsed stack template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateDocument {
    Json(serde_json::Value),
    Yaml(serde_yaml::Value),
}

impl TemplateDocument {
    /// Parse a raw template body.
    ///
    /// A body whose trimmed text starts with `{` must be valid JSON; anything
    /// else must be valid YAML. Either way the document must be a mapping.
    pub fn parse(body: &str) -> Result<Self, TemplateError> {
        let trimmed = body.trim();
        if trimmed.starts_with('{') {
            let value: serde_json::Value = serde_json::from_str(trimmed)?;
            if !value.is_object() {
                return Err(TemplateError::NotAMapping);
            }
            Ok(TemplateDocument::Json(value))
        } else {
            let value: serde_yaml::Value = serde_yaml::from_str(trimmed)?;
            if !value.is_mapping() {
                return Err(TemplateError::NotAMapping);
            }
            Ok(TemplateDocument::Yaml(value))
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, TemplateDocument::Json(_))
    }

    /// Deletion policy declared for a resource, if the template declares one.
    pub fn deletion_policy(&self, logical_id: &str) -> Option<DeletionPolicy> {
        let declared = match self {
            TemplateDocument::Json(value) => value
                .get("Resources")
                .and_then(|r| r.get(logical_id))
                .and_then(|r| r.get("DeletionPolicy"))
                .and_then(|p| p.as_str()),
            TemplateDocument::Yaml(value) => value
                .get("Resources")
                .and_then(|r| r.get(logical_id))
                .and_then(|r| r.get("DeletionPolicy"))
                .and_then(|p| p.as_str()),
        };
        declared.and_then(DeletionPolicy::parse)
    }
}
