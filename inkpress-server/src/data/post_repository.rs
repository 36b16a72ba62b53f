use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::post_query::{PostPage, PostQuery};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDetail, PostMetaData, PostStatus};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
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
    pub(crate) reading_time: i32,
    pub(crate) meta_data: Option<PostMetaData>,
}

/// Full-row replacement produced by the update operation after the state
/// machine and derivation hooks have run.
#[derive(Debug, Clone)]
pub(crate) struct PostChanges {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) content: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) category_id: i64,
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) scheduled_at: Option<DateTime<Utc>>,
    pub(crate) is_featured: bool,
    pub(crate) allow_comments: bool,
    pub(crate) reading_time: i32,
    pub(crate) meta_data: Option<PostMetaData>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, DomainError>;
    async fn get_post_detail_by_slug(&self, slug: &str)
    -> Result<Option<PostDetail>, DomainError>;
    async fn update_post(
        &self,
        id: i64,
        changes: PostChanges,
    ) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;

    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, DomainError>;
    async fn featured_posts(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<PostDetail>, DomainError>;
    async fn related_posts(
        &self,
        post_id: i64,
        category_id: i64,
        tag_ids: &[i64],
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<PostDetail>, DomainError>;
    async fn recent_posts(&self, limit: u32) -> Result<Vec<PostDetail>, DomainError>;

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>)
    -> Result<bool, DomainError>;
    async fn sync_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<(), DomainError>;

    /// Atomic at the storage layer, never read-modify-write.
    async fn increment_views(&self, post_id: i64) -> Result<(), DomainError>;
    /// Always derived by a fresh count of approved comments.
    async fn recount_comments(&self, post_id: i64) -> Result<i32, DomainError>;

    async fn count_visible(&self, now: DateTime<Utc>) -> Result<i64, DomainError>;
    async fn sum_visible_views(&self, now: DateTime<Utc>) -> Result<i64, DomainError>;
    async fn count_all(&self) -> Result<i64, DomainError>;
    async fn count_by_status(&self, status: PostStatus) -> Result<i64, DomainError>;
    async fn sum_all_views(&self) -> Result<i64, DomainError>;
}
