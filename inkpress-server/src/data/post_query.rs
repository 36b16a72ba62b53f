//! Listing query description shared by the public blog and the admin list.
//!
//! Services build a `PostQuery` and repositories execute it; the predicate
//! composition rules (AND across filters, OR inside search) live in the
//! repository implementations against this one description.

use chrono::{DateTime, Utc};

use crate::domain::post::{PostDetail, PostStatus};

pub(crate) const PUBLIC_PAGE_SIZE: u32 = 12;
pub(crate) const ADMIN_PAGE_SIZE: u32 = 15;
pub(crate) const FEATURED_LIMIT: u32 = 3;
pub(crate) const RELATED_LIMIT: u32 = 4;
pub(crate) const POPULAR_TAGS_LIMIT: u32 = 20;

#[derive(Debug, Clone, Default)]
pub(crate) struct PostFilter {
    /// Case-insensitive substring match, ORed across the searchable fields.
    pub(crate) search: Option<String>,
    /// Public variant: resolves through `categories.slug`.
    pub(crate) category_slug: Option<String>,
    /// Admin variant: direct equality on `posts.category_id`.
    pub(crate) category_id: Option<i64>,
    /// Existential match: the post has at least one tag with this slug.
    pub(crate) tag_slug: Option<String>,
    /// Admin only; public queries always apply the visibility predicate.
    pub(crate) status: Option<PostStatus>,
}

impl PostFilter {
    pub(crate) fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.category_slug.is_none()
            && self.category_id.is_none()
            && self.tag_slug.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PostOrder {
    PublishedAtDesc,
    CreatedAtDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchFields {
    TitleExcerptContent,
    /// The admin list skips `content` for performance.
    TitleExcerpt,
}

#[derive(Debug, Clone)]
pub(crate) struct PostQuery {
    pub(crate) filter: PostFilter,
    pub(crate) visible_only: bool,
    /// The instant "now" is pinned at by the caller, so one request sees one
    /// consistent visibility cut.
    pub(crate) visible_at: DateTime<Utc>,
    pub(crate) search_fields: SearchFields,
    pub(crate) order: PostOrder,
    pub(crate) page: u32,
    pub(crate) per_page: u32,
}

impl PostQuery {
    pub(crate) fn public_listing(filter: PostFilter, page: u32, now: DateTime<Utc>) -> Self {
        Self {
            filter,
            visible_only: true,
            visible_at: now,
            search_fields: SearchFields::TitleExcerptContent,
            order: PostOrder::PublishedAtDesc,
            page: page.max(1),
            per_page: PUBLIC_PAGE_SIZE,
        }
    }

    pub(crate) fn admin_listing(filter: PostFilter, page: u32, now: DateTime<Utc>) -> Self {
        Self {
            filter,
            visible_only: false,
            visible_at: now,
            search_fields: SearchFields::TitleExcerpt,
            order: PostOrder::CreatedAtDesc,
            page: page.max(1),
            per_page: ADMIN_PAGE_SIZE,
        }
    }

    pub(crate) fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.per_page as i64
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PostPage {
    pub(crate) items: Vec<PostDetail>,
    pub(crate) total: i64,
    pub(crate) page: u32,
    pub(crate) per_page: u32,
}

impl PostPage {
    pub(crate) fn last_page(&self) -> u32 {
        let per_page = self.per_page.max(1) as i64;
        ((self.total + per_page - 1) / per_page).max(1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based_and_page_clamped() {
        let now = Utc::now();
        let query = PostQuery::public_listing(PostFilter::default(), 0, now);
        assert_eq!(query.page, 1);
        assert_eq!(query.offset(), 0);

        let query = PostQuery::public_listing(PostFilter::default(), 3, now);
        assert_eq!(query.offset(), 24);
    }

    #[test]
    fn last_page_rounds_up_and_floors_at_one() {
        let page = PostPage {
            items: Vec::new(),
            total: 25,
            page: 1,
            per_page: 12,
        };
        assert_eq!(page.last_page(), 3);

        let empty = PostPage {
            items: Vec::new(),
            total: 0,
            page: 1,
            per_page: 12,
        };
        assert_eq!(empty.last_page(), 1);
    }
}
