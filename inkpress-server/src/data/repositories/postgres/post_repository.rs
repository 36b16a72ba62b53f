use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::Postgres;
use sqlx::{PgPool, QueryBuilder};

use super::{like_pattern, map_db_error};
use crate::data::post_query::{PostOrder, PostPage, PostQuery, SearchFields};
use crate::data::post_repository::{NewPost, PostChanges, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDetail, PostMetaData, PostStatus};
use crate::domain::tag::Tag;

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    slug: String,
    excerpt: Option<String>,
    content: String,
    featured_image: Option<String>,
    category_id: i64,
    user_id: i64,
    status: String,
    published_at: Option<DateTime<Utc>>,
    scheduled_at: Option<DateTime<Utc>>,
    is_featured: bool,
    allow_comments: bool,
    views_count: i32,
    comments_count: i32,
    reading_time: i32,
    meta_data: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PostDetailRow {
    #[sqlx(flatten)]
    post: PostRow,
    category_name: String,
    category_slug: String,
    author_name: String,
}

#[derive(sqlx::FromRow)]
struct PostTagRow {
    post_id: i64,
    #[sqlx(flatten)]
    tag: super::tag_repository::TagRow,
}

const POST_COLUMNS: &str = "p.id, p.title, p.slug, p.excerpt, p.content, p.featured_image, \
     p.category_id, p.user_id, p.status, p.published_at, p.scheduled_at, p.is_featured, \
     p.allow_comments, p.views_count, p.comments_count, p.reading_time, p.meta_data, \
     p.created_at, p.updated_at";

const DETAIL_COLUMNS: &str = "c.name AS category_name, c.slug AS category_slug, \
     u.name AS author_name";

const DETAIL_FROM: &str = " FROM posts p \
     JOIN categories c ON c.id = p.category_id \
     JOIN users u ON u.id = p.user_id";

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let status = PostStatus::parse(&row.status)
        .map_err(|_| DomainError::Unexpected(format!("invalid stored status: {}", row.status)))?;
    let meta_data = row
        .meta_data
        .map(serde_json::from_value::<PostMetaData>)
        .transpose()
        .map_err(|err| DomainError::Unexpected(format!("invalid stored meta_data: {err}")))?;

    Ok(Post {
        id: row.id,
        title: row.title,
        slug: row.slug,
        excerpt: row.excerpt,
        content: row.content,
        featured_image: row.featured_image,
        category_id: row.category_id,
        user_id: row.user_id,
        status,
        published_at: row.published_at,
        scheduled_at: row.scheduled_at,
        is_featured: row.is_featured,
        allow_comments: row.allow_comments,
        views_count: row.views_count,
        comments_count: row.comments_count,
        reading_time: row.reading_time,
        meta_data,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn meta_data_to_json(
    meta_data: &Option<PostMetaData>,
) -> Result<Option<serde_json::Value>, DomainError> {
    meta_data
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|err| DomainError::Unexpected(format!("meta_data serialization: {err}")))
}

impl PostgresPostRepository {
    async fn tags_by_post(
        &self,
        post_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Tag>>, DomainError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, PostTagRow>(
            "SELECT pt.post_id, t.id, t.name, t.slug, t.description, t.color, \
                    t.created_at, t.updated_at \
             FROM post_tag pt \
             JOIN tags t ON t.id = pt.tag_id \
             WHERE pt.post_id = ANY($1) \
             ORDER BY t.name",
        )
        .bind(post_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut grouped: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.post_id)
                .or_default()
                .push(row.tag.into_tag());
        }
        Ok(grouped)
    }

    async fn assemble_details(
        &self,
        rows: Vec<PostDetailRow>,
    ) -> Result<Vec<PostDetail>, DomainError> {
        let ids: Vec<i64> = rows.iter().map(|row| row.post.id).collect();
        let mut tags = self.tags_by_post(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let post = map_row_to_post(row.post)?;
                let post_tags = tags.remove(&post.id).unwrap_or_default();
                Ok(PostDetail {
                    tags: post_tags,
                    category_name: row.category_name,
                    category_slug: row.category_slug,
                    author_name: row.author_name,
                    post,
                })
            })
            .collect()
    }
}

// Appends the ANDed predicate set of a listing query; `search` ORs its
// field checks internally.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &PostQuery) {
    builder.push(" WHERE TRUE");

    if query.visible_only {
        builder
            .push(" AND p.status = 'published' AND p.published_at <= ")
            .push_bind(query.visible_at);
    }
    if let Some(status) = query.filter.status {
        builder.push(" AND p.status = ").push_bind(status.as_str());
    }
    if let Some(category_id) = query.filter.category_id {
        builder.push(" AND p.category_id = ").push_bind(category_id);
    }
    if let Some(category_slug) = &query.filter.category_slug {
        builder
            .push(" AND c.slug = ")
            .push_bind(category_slug.clone());
    }
    if let Some(tag_slug) = &query.filter.tag_slug {
        builder
            .push(" AND EXISTS (SELECT 1 FROM post_tag pt JOIN tags t ON t.id = pt.tag_id \
                   WHERE pt.post_id = p.id AND t.slug = ")
            .push_bind(tag_slug.clone())
            .push(")");
    }
    if let Some(search) = &query.filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.excerpt ILIKE ")
            .push_bind(pattern.clone());
        if query.search_fields == SearchFields::TitleExcerptContent {
            builder.push(" OR p.content ILIKE ").push_bind(pattern);
        }
        builder.push(")");
    }
}

fn order_clause(order: PostOrder) -> &'static str {
    match order {
        PostOrder::PublishedAtDesc => " ORDER BY p.published_at DESC, p.id DESC",
        PostOrder::CreatedAtDesc => " ORDER BY p.created_at DESC, p.id DESC",
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let meta_data = meta_data_to_json(&input.meta_data)?;
        let row = sqlx::query_as::<_, PostRow>(
            "INSERT INTO posts (title, slug, excerpt, content, featured_image, category_id, \
                                user_id, status, published_at, scheduled_at, is_featured, \
                                allow_comments, reading_time, meta_data) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING id, title, slug, excerpt, content, featured_image, category_id, user_id, \
                       status, published_at, scheduled_at, is_featured, allow_comments, \
                       views_count, comments_count, reading_time, meta_data, created_at, \
                       updated_at",
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(&input.featured_image)
        .bind(input.category_id)
        .bind(input.user_id)
        .bind(input.status.as_str())
        .bind(input.published_at)
        .bind(input.scheduled_at)
        .bind(input.is_featured)
        .bind(input.allow_comments)
        .bind(input.reading_time)
        .bind(meta_data)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, DomainError> {
        let row = sqlx::query_as::<_, PostDetailRow>(&format!(
            "SELECT {POST_COLUMNS}, {DETAIL_COLUMNS}{DETAIL_FROM} WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let Some(row) = row else { return Ok(None) };
        Ok(self.assemble_details(vec![row]).await?.pop())
    }

    async fn get_post_detail_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<PostDetail>, DomainError> {
        let row = sqlx::query_as::<_, PostDetailRow>(&format!(
            "SELECT {POST_COLUMNS}, {DETAIL_COLUMNS}{DETAIL_FROM} WHERE p.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let Some(row) = row else { return Ok(None) };
        Ok(self.assemble_details(vec![row]).await?.pop())
    }

    async fn update_post(
        &self,
        id: i64,
        changes: PostChanges,
    ) -> Result<Option<Post>, DomainError> {
        let meta_data = meta_data_to_json(&changes.meta_data)?;
        let row = sqlx::query_as::<_, PostRow>(
            "UPDATE posts \
             SET title = $2, slug = $3, excerpt = $4, content = $5, featured_image = $6, \
                 category_id = $7, status = $8, published_at = $9, scheduled_at = $10, \
                 is_featured = $11, allow_comments = $12, reading_time = $13, meta_data = $14, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, title, slug, excerpt, content, featured_image, category_id, user_id, \
                       status, published_at, scheduled_at, is_featured, allow_comments, \
                       views_count, comments_count, reading_time, meta_data, created_at, \
                       updated_at",
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.slug)
        .bind(&changes.excerpt)
        .bind(&changes.content)
        .bind(&changes.featured_image)
        .bind(changes.category_id)
        .bind(changes.status.as_str())
        .bind(changes.published_at)
        .bind(changes.scheduled_at)
        .bind(changes.is_featured)
        .bind(changes.allow_comments)
        .bind(changes.reading_time)
        .bind(meta_data)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, DomainError> {
        let mut count_builder =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*){DETAIL_FROM}"));
        push_filters(&mut count_builder, query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {POST_COLUMNS}, {DETAIL_COLUMNS}{DETAIL_FROM}"
        ));
        push_filters(&mut builder, query);
        builder.push(order_clause(query.order));
        builder
            .push(" LIMIT ")
            .push_bind(query.per_page as i64)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let rows: Vec<PostDetailRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(PostPage {
            items: self.assemble_details(rows).await?,
            total,
            page: query.page,
            per_page: query.per_page,
        })
    }

    async fn featured_posts(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<PostDetail>, DomainError> {
        let rows = sqlx::query_as::<_, PostDetailRow>(&format!(
            "SELECT {POST_COLUMNS}, {DETAIL_COLUMNS}{DETAIL_FROM} \
             WHERE p.status = 'published' AND p.published_at <= $1 AND p.is_featured \
             ORDER BY p.published_at DESC, p.id DESC \
             LIMIT $2"
        ))
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.assemble_details(rows).await
    }

    async fn related_posts(
        &self,
        post_id: i64,
        category_id: i64,
        tag_ids: &[i64],
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<PostDetail>, DomainError> {
        let rows = sqlx::query_as::<_, PostDetailRow>(&format!(
            "SELECT {POST_COLUMNS}, {DETAIL_COLUMNS}{DETAIL_FROM} \
             WHERE p.status = 'published' AND p.published_at <= $1 \
               AND p.id <> $2 \
               AND (p.category_id = $3 OR EXISTS \
                    (SELECT 1 FROM post_tag pt WHERE pt.post_id = p.id AND pt.tag_id = ANY($4))) \
             ORDER BY p.published_at DESC, p.id DESC \
             LIMIT $5"
        ))
        .bind(now)
        .bind(post_id)
        .bind(category_id)
        .bind(tag_ids.to_vec())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.assemble_details(rows).await
    }

    async fn recent_posts(&self, limit: u32) -> Result<Vec<PostDetail>, DomainError> {
        let rows = sqlx::query_as::<_, PostDetailRow>(&format!(
            "SELECT {POST_COLUMNS}, {DETAIL_COLUMNS}{DETAIL_FROM} \
             ORDER BY p.created_at DESC, p.id DESC \
             LIMIT $1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.assemble_details(rows).await
    }

    async fn slug_exists(
        &self,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM posts WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(exists)
    }

    async fn sync_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        sqlx::query("DELETE FROM post_tag WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        if !tag_ids.is_empty() {
            sqlx::query(
                "INSERT INTO post_tag (post_id, tag_id) \
                 SELECT $1::BIGINT, tag_id FROM UNNEST($2::BIGINT[]) AS tag_id",
            )
            .bind(post_id)
            .bind(tag_ids.to_vec())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }
        tx.commit().await.map_err(map_db_error)
    }

    async fn increment_views(&self, post_id: i64) -> Result<(), DomainError> {
        sqlx::query("UPDATE posts SET views_count = views_count + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn recount_comments(&self, post_id: i64) -> Result<i32, DomainError> {
        let count: i32 = sqlx::query_scalar(
            "UPDATE posts \
             SET comments_count = (SELECT COUNT(*) FROM comments \
                                   WHERE post_id = $1 AND status = 'approved') \
             WHERE id = $1 \
             RETURNING comments_count",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(count)
    }

    async fn count_visible(&self, now: DateTime<Utc>) -> Result<i64, DomainError> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE status = 'published' AND published_at <= $1",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn sum_visible_views(&self, now: DateTime<Utc>) -> Result<i64, DomainError> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(views_count), 0)::BIGINT FROM posts \
             WHERE status = 'published' AND published_at <= $1",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn count_all(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn count_by_status(&self, status: PostStatus) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn sum_all_views(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COALESCE(SUM(views_count), 0)::BIGINT FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}
