use async_trait::async_trait;

use crate::domain::comment::{Comment, CommentRecord, CommentStatus, Commenter};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) post_id: i64,
    pub(crate) parent_id: Option<i64>,
    pub(crate) commenter: Commenter,
    pub(crate) content: String,
    pub(crate) status: CommentStatus,
    pub(crate) ip_address: Option<String>,
    pub(crate) user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct CommentPage {
    pub(crate) items: Vec<CommentRecord>,
    pub(crate) total: i64,
    pub(crate) page: u32,
    pub(crate) per_page: u32,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError>;
    /// Cascades to the comment's own replies.
    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError>;
    async fn set_comment_status(
        &self,
        id: i64,
        status: CommentStatus,
    ) -> Result<Option<Comment>, DomainError>;

    /// Flat approved set for a post, joined with commenter names; tree
    /// assembly happens in the domain.
    async fn approved_comments_for_post(
        &self,
        post_id: i64,
    ) -> Result<Vec<CommentRecord>, DomainError>;
    /// Moderation queue: optionally filtered by status, newest first.
    async fn list_comments(
        &self,
        status: Option<CommentStatus>,
        page: u32,
        per_page: u32,
    ) -> Result<CommentPage, DomainError>;
    async fn count_comments_by_status(&self, status: CommentStatus) -> Result<i64, DomainError>;
}
