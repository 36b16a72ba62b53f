use chrono::Utc;
use tracing::info;

use crate::data::comment_repository::{CommentPage, CommentRepository, NewComment};
use crate::data::post_query::ADMIN_PAGE_SIZE;
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{
    Comment, CommentNode, CommentStatus, SubmitCommentRequest, build_comment_tree,
};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ModerationStats {
    pub(crate) approved_comments: i64,
    pub(crate) pending_comments: i64,
}

/// Comment submission, the approved public tree and admin moderation.
///
/// The owning post's `comments_count` is a denormalized cache; it is always
/// recomputed by a fresh count, so any interleaving of moderation actions
/// converges to the correct value.
pub(crate) struct CommentService<P, M>
where
    P: PostRepository,
    M: CommentRepository,
{
    posts: P,
    comments: M,
}

impl<P, M> CommentService<P, M>
where
    P: PostRepository,
    M: CommentRepository,
{
    pub(crate) fn new(posts: P, comments: M) -> Self {
        Self { posts, comments }
    }

    /// Creates a pending comment on a visible post that accepts comments.
    /// Every submission awaits moderation; there is no auto-approval.
    pub(crate) async fn submit_comment(
        &self,
        post_slug: &str,
        req: SubmitCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        let detail = self
            .posts
            .get_post_detail_by_slug(post_slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post slug: {post_slug}")))?;
        if !detail.post.is_visible_at(Utc::now()) {
            return Err(DomainError::NotFound(format!("post slug: {post_slug}")));
        }
        if !detail.post.allow_comments {
            return Err(DomainError::Validation {
                field: "post",
                message: "comments are disabled for this post",
            });
        }
        if let Some(parent_id) = req.parent_id {
            let parent = self
                .comments
                .get_comment(parent_id)
                .await?
                .ok_or_else(|| DomainError::NotFound(format!("comment id: {parent_id}")))?;
            if parent.post_id != detail.post.id {
                return Err(DomainError::Validation {
                    field: "parent_id",
                    message: "must reference a comment on the same post",
                });
            }
        }

        let comment = self
            .comments
            .create_comment(NewComment {
                post_id: detail.post.id,
                parent_id: req.parent_id,
                commenter: req.commenter,
                content: req.content,
                status: CommentStatus::Pending,
                ip_address: req.ip_address,
                user_agent: req.user_agent,
            })
            .await?;
        info!(comment_id = comment.id, post_id = comment.post_id, "comment submitted");
        Ok(comment)
    }

    /// Approved comments only, two levels, newest first at both.
    pub(crate) async fn approved_tree(
        &self,
        post_id: i64,
    ) -> Result<Vec<CommentNode>, DomainError> {
        let records = self.comments.approved_comments_for_post(post_id).await?;
        Ok(build_comment_tree(records))
    }

    /// Any status may transition to any other. The cached count is refreshed
    /// whenever a transition crosses the `approved` boundary; repeating a
    /// transition is a no-op.
    pub(crate) async fn moderate_comment(
        &self,
        id: i64,
        new_status: CommentStatus,
    ) -> Result<Comment, DomainError> {
        let previous = self
            .comments
            .get_comment(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {id}")))?;
        if previous.status == new_status {
            return Ok(previous);
        }

        let updated = self
            .comments
            .set_comment_status(id, new_status)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {id}")))?;

        if previous.status == CommentStatus::Approved || new_status == CommentStatus::Approved {
            self.posts.recount_comments(updated.post_id).await?;
        }
        info!(
            comment_id = id,
            from = previous.status.as_str(),
            to = new_status.as_str(),
            "comment moderated"
        );
        Ok(updated)
    }

    pub(crate) async fn delete_comment(&self, id: i64) -> Result<(), DomainError> {
        let comment = self
            .comments
            .get_comment(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {id}")))?;
        self.comments.delete_comment(id).await?;
        // Cascaded replies may have been approved too; recount regardless of
        // the deleted comment's own status.
        self.posts.recount_comments(comment.post_id).await?;
        Ok(())
    }

    pub(crate) async fn list_comments(
        &self,
        status: Option<CommentStatus>,
        page: u32,
    ) -> Result<CommentPage, DomainError> {
        self.comments
            .list_comments(status, page, ADMIN_PAGE_SIZE)
            .await
    }

    pub(crate) async fn moderation_stats(&self) -> Result<ModerationStats, DomainError> {
        Ok(ModerationStats {
            approved_comments: self
                .comments
                .count_comments_by_status(CommentStatus::Approved)
                .await?,
            pending_comments: self
                .comments
                .count_comments_by_status(CommentStatus::Pending)
                .await?,
        })
    }
}
