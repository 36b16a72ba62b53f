use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::DomainError;
use super::publication::slugify;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
    pub(crate) icon: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) sort_order: i32,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// A category with its count of currently visible posts, for the filter
/// sidebar. Zero-count categories are excluded at the query level.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CategoryFacet {
    pub(crate) category: Category,
    pub(crate) visible_posts: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct CategoryInput {
    pub(crate) name: String,
    pub(crate) slug: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
    pub(crate) icon: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) sort_order: i32,
}

impl CategoryInput {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let Self {
            name,
            slug,
            description,
            color,
            icon,
            is_active,
            sort_order,
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
            icon,
            is_active,
            sort_order,
        })
    }
}

pub(super) fn normalize_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() || name.len() > 255 {
        return Err(DomainError::Validation {
            field: "name",
            message: "must be 1..255 chars",
        });
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_derives_slug_from_name_when_absent() {
        let input = CategoryInput {
            name: "Web Security".to_string(),
            slug: None,
            description: None,
            color: None,
            icon: None,
            is_active: true,
            sort_order: 0,
        };
        let validated = input.validate().expect("must validate");
        assert_eq!(validated.slug.as_deref(), Some("web-security"));
    }

    #[test]
    fn input_rejects_blank_name() {
        let input = CategoryInput {
            name: " ".to_string(),
            slug: None,
            description: None,
            color: None,
            icon: None,
            is_active: true,
            sort_order: 0,
        };
        assert!(input.validate().is_err());
    }
}
