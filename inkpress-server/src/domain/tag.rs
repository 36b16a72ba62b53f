use chrono::{DateTime, Utc};
use serde::Serialize;

use super::category::normalize_name;
use super::error::DomainError;
use super::publication::slugify;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Tag {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// A tag with its count of currently visible posts. Tags with no visible
/// posts never reach the facet payload.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TagFacet {
    pub(crate) tag: Tag,
    pub(crate) visible_posts: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct TagInput {
    pub(crate) name: String,
    pub(crate) slug: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
}

impl TagInput {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let Self {
            name,
            slug,
            description,
            color,
        } = self;
        let name = normalize_name(&name)?;
        let slug = match slug {
            Some(slug) if !slug.trim().is_empty() => slugify(&slug),
            _ => slugify(&name),
        };
        if slug.is_empty() {
            return Err(DomainError::Validation {
                field: "slug",
                message: "must contain at least one alphanumeric char",
            });
        }
        Ok(Self {
            name,
            slug: Some(slug),
            description,
            color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_slugifies_explicit_slug() {
        let input = TagInput {
            name: "Rust".to_string(),
            slug: Some("Rust Lang".to_string()),
            description: None,
            color: None,
        };
        let validated = input.validate().expect("must validate");
        assert_eq!(validated.slug.as_deref(), Some("rust-lang"));
    }
}
