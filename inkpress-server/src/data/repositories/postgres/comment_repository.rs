use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::map_db_error;
use crate::data::comment_repository::{CommentPage, CommentRepository, NewComment};
use crate::domain::comment::{Comment, CommentRecord, CommentStatus, Commenter};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    user_id: Option<i64>,
    parent_id: Option<i64>,
    author_name: Option<String>,
    author_email: Option<String>,
    author_website: Option<String>,
    content: String,
    status: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CommentRecordRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    user_name: Option<String>,
}

const COMMENT_COLUMNS: &str = "cm.id, cm.post_id, cm.user_id, cm.parent_id, cm.author_name, \
     cm.author_email, cm.author_website, cm.content, cm.status, cm.ip_address, cm.user_agent, \
     cm.created_at, cm.updated_at";

fn map_row_to_comment(row: CommentRow) -> Result<Comment, DomainError> {
    let status = CommentStatus::parse(&row.status)
        .map_err(|_| DomainError::Unexpected(format!("invalid stored status: {}", row.status)))?;
    let commenter = Commenter::from_columns(
        row.user_id,
        row.author_name,
        row.author_email,
        row.author_website,
    )?;
    Ok(Comment {
        id: row.id,
        post_id: row.post_id,
        parent_id: row.parent_id,
        commenter,
        content: row.content,
        status,
        ip_address: row.ip_address,
        user_agent: row.user_agent,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn map_row_to_record(row: CommentRecordRow) -> Result<CommentRecord, DomainError> {
    Ok(CommentRecord {
        comment: map_row_to_comment(row.comment)?,
        user_name: row.user_name,
    })
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let (user_id, author_name, author_email, author_website) = match &input.commenter {
            Commenter::Registered { user_id } => (Some(*user_id), None, None, None),
            Commenter::Guest {
                name,
                email,
                website,
            } => (None, Some(name.clone()), Some(email.clone()), website.clone()),
        };

        let row = sqlx::query_as::<_, CommentRow>(
            "INSERT INTO comments (post_id, user_id, parent_id, author_name, author_email, \
                                   author_website, content, status, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id, post_id, user_id, parent_id, author_name, author_email, \
                       author_website, content, status, ip_address, user_agent, created_at, \
                       updated_at",
        )
        .bind(input.post_id)
        .bind(user_id)
        .bind(input.parent_id)
        .bind(author_name)
        .bind(author_email)
        .bind(author_website)
        .bind(&input.content)
        .bind(input.status.as_str())
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_row_to_comment(row)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments cm WHERE cm.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        row.map(map_row_to_comment).transpose()
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_comment_status(
        &self,
        id: i64,
        status: CommentStatus,
    ) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            "UPDATE comments SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, post_id, user_id, parent_id, author_name, author_email, \
                       author_website, content, status, ip_address, user_agent, created_at, \
                       updated_at",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        row.map(map_row_to_comment).transpose()
    }

    async fn approved_comments_for_post(
        &self,
        post_id: i64,
    ) -> Result<Vec<CommentRecord>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRecordRow>(&format!(
            "SELECT {COMMENT_COLUMNS}, u.name AS user_name \
             FROM comments cm \
             LEFT JOIN users u ON u.id = cm.user_id \
             WHERE cm.post_id = $1 AND cm.status = 'approved' \
             ORDER BY cm.created_at DESC, cm.id DESC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(map_row_to_record).collect()
    }

    async fn list_comments(
        &self,
        status: Option<CommentStatus>,
        page: u32,
        per_page: u32,
    ) -> Result<CommentPage, DomainError> {
        let page = page.max(1);
        let offset = (page - 1) as i64 * per_page as i64;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comments WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status.map(CommentStatus::as_str))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, CommentRecordRow>(&format!(
            "SELECT {COMMENT_COLUMNS}, u.name AS user_name \
             FROM comments cm \
             LEFT JOIN users u ON u.id = cm.user_id \
             WHERE ($1::TEXT IS NULL OR cm.status = $1) \
             ORDER BY cm.created_at DESC, cm.id DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(status.map(CommentStatus::as_str))
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(CommentPage {
            items: rows
                .into_iter()
                .map(map_row_to_record)
                .collect::<Result<_, _>>()?,
            total,
            page,
            per_page,
        })
    }

    async fn count_comments_by_status(&self, status: CommentStatus) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}
