use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::publication;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PostStatus {
    Draft,
    Published,
    Scheduled,
}

impl PostStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Scheduled => "scheduled",
        }
    }

    /// Parses the stored/requested status string. An unknown value is a
    /// validation-time rejection, never a state-machine failure.
    pub(crate) fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "scheduled" => Ok(PostStatus::Scheduled),
            _ => Err(DomainError::Validation {
                field: "status",
                message: "must be one of: draft, published, scheduled",
            }),
        }
    }
}

/// SEO metadata stored as a JSON document on the post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct PostMetaData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) meta_keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) og_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) og_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) twitter_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) twitter_description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) content: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) category_id: i64,
    pub(crate) user_id: i64,
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) scheduled_at: Option<DateTime<Utc>>,
    pub(crate) is_featured: bool,
    pub(crate) allow_comments: bool,
    pub(crate) views_count: i32,
    pub(crate) comments_count: i32,
    pub(crate) reading_time: i32,
    pub(crate) meta_data: Option<PostMetaData>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        publication::is_visible_at(self.status, self.published_at, now)
    }
}

/// Author/category/tags eagerly loaded alongside a post for rendering.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PostDetail {
    pub(crate) post: Post,
    pub(crate) category_name: String,
    pub(crate) category_slug: String,
    pub(crate) author_name: String,
    pub(crate) tags: Vec<super::tag::Tag>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) slug: Option<String>,
    pub(crate) excerpt: Option<String>,
    pub(crate) content: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) category_id: i64,
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) scheduled_at: Option<DateTime<Utc>>,
    pub(crate) is_featured: bool,
    pub(crate) allow_comments: bool,
    pub(crate) meta_data: Option<PostMetaData>,
    pub(crate) tag_ids: Vec<i64>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        validate_positive_i64("category_id", self.category_id)?;
        Ok(Self {
            title: normalize_title(&self.title)?,
            slug: normalize_explicit_slug(self.slug)?,
            excerpt: normalize_excerpt(self.excerpt)?,
            content: normalize_content(&self.content)?,
            featured_image: self.featured_image,
            category_id: self.category_id,
            status: self.status,
            published_at: self.published_at,
            scheduled_at: self.scheduled_at,
            is_featured: self.is_featured,
            allow_comments: self.allow_comments,
            meta_data: self.meta_data,
            tag_ids: self.tag_ids,
        })
    }
}

/// Full-update request: absent `slug` means "re-derive from the title".
#[derive(Debug, Clone)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) slug: Option<String>,
    pub(crate) excerpt: Option<String>,
    pub(crate) content: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) category_id: i64,
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) scheduled_at: Option<DateTime<Utc>>,
    pub(crate) is_featured: bool,
    pub(crate) allow_comments: bool,
    pub(crate) meta_data: Option<PostMetaData>,
    pub(crate) tag_ids: Vec<i64>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        validate_positive_i64("category_id", self.category_id)?;
        Ok(Self {
            title: normalize_title(&self.title)?,
            slug: normalize_explicit_slug(self.slug)?,
            excerpt: normalize_excerpt(self.excerpt)?,
            content: normalize_content(&self.content)?,
            featured_image: self.featured_image,
            category_id: self.category_id,
            status: self.status,
            published_at: self.published_at,
            scheduled_at: self.scheduled_at,
            is_featured: self.is_featured,
            allow_comments: self.allow_comments,
            meta_data: self.meta_data,
            tag_ids: self.tag_ids,
        })
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<i64, DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(value)
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.len() > 255 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}

fn normalize_excerpt(excerpt: Option<String>) -> Result<Option<String>, DomainError> {
    let Some(excerpt) = excerpt else {
        return Ok(None);
    };
    let excerpt = excerpt.trim();
    if excerpt.is_empty() {
        return Ok(None);
    }
    if excerpt.len() > 500 {
        return Err(DomainError::Validation {
            field: "excerpt",
            message: "must be at most 500 chars",
        });
    }
    Ok(Some(excerpt.to_string()))
}

// An explicitly supplied slug is forced through slugify so it is URL-safe;
// a blank value counts as "not supplied".
fn normalize_explicit_slug(slug: Option<String>) -> Result<Option<String>, DomainError> {
    let Some(slug) = slug else {
        return Ok(None);
    };
    if slug.trim().is_empty() {
        return Ok(None);
    }
    if slug.len() > 255 {
        return Err(DomainError::Validation {
            field: "slug",
            message: "must be at most 255 chars",
        });
    }
    let slug = publication::slugify(&slug);
    if slug.is_empty() {
        return Err(DomainError::Validation {
            field: "slug",
            message: "must contain at least one alphanumeric char",
        });
    }
    Ok(Some(slug))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn sample_create_request() -> CreatePostRequest {
        CreatePostRequest {
            title: "Hello World".to_string(),
            slug: None,
            excerpt: None,
            content: "Some content".to_string(),
            featured_image: None,
            category_id: 1,
            status: PostStatus::Draft,
            published_at: None,
            scheduled_at: None,
            is_featured: false,
            allow_comments: true,
            meta_data: None,
            tag_ids: Vec::new(),
        }
    }

    #[test]
    fn status_parse_accepts_known_values_only() {
        assert_eq!(PostStatus::parse("draft").unwrap(), PostStatus::Draft);
        assert_eq!(
            PostStatus::parse("published").unwrap(),
            PostStatus::Published
        );
        assert_eq!(
            PostStatus::parse("scheduled").unwrap(),
            PostStatus::Scheduled
        );

        let err = PostStatus::parse("archived").expect_err("unknown status must be rejected");
        assert!(matches!(
            err,
            DomainError::Validation { field: "status", .. }
        ));
    }

    #[test]
    fn create_request_rejects_empty_title() {
        let req = CreatePostRequest {
            title: "   ".to_string(),
            ..sample_create_request()
        };
        let err = req.validate().expect_err("title must be rejected");
        assert!(matches!(
            err,
            DomainError::Validation { field: "title", .. }
        ));
    }

    #[test]
    fn create_request_rejects_non_positive_category() {
        let req = CreatePostRequest {
            category_id: 0,
            ..sample_create_request()
        };
        let err = req.validate().expect_err("category_id must be rejected");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "category_id",
                ..
            }
        ));
    }

    #[test]
    fn create_request_normalizes_blank_slug_and_excerpt_to_none() {
        let req = CreatePostRequest {
            slug: Some("  ".to_string()),
            excerpt: Some("".to_string()),
            ..sample_create_request()
        };
        let validated = req.validate().expect("must validate");
        assert_eq!(validated.slug, None);
        assert_eq!(validated.excerpt, None);
    }

    #[test]
    fn explicit_slug_is_made_url_safe() {
        let req = CreatePostRequest {
            slug: Some("My Fancy Slug!".to_string()),
            ..sample_create_request()
        };
        let validated = req.validate().expect("must validate");
        assert_eq!(validated.slug.as_deref(), Some("my-fancy-slug"));
    }

    #[test]
    fn visibility_follows_published_at() {
        let now = Utc::now();
        let mut post = Post {
            id: 1,
            title: "t".to_string(),
            slug: "t".to_string(),
            excerpt: None,
            content: "c".to_string(),
            featured_image: None,
            category_id: 1,
            user_id: 1,
            status: PostStatus::Published,
            published_at: Some(now - Duration::hours(1)),
            scheduled_at: None,
            is_featured: false,
            allow_comments: true,
            views_count: 0,
            comments_count: 0,
            reading_time: 1,
            meta_data: None,
            created_at: now,
            updated_at: now,
        };
        assert!(post.is_visible_at(now));

        post.published_at = Some(now + Duration::hours(1));
        assert!(!post.is_visible_at(now));

        post.published_at = None;
        assert!(!post.is_visible_at(now));
    }
}
