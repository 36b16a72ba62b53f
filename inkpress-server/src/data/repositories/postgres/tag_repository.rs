use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::map_db_error;
use crate::data::tag_repository::{TagFields, TagRepository};
use crate::domain::error::DomainError;
use crate::domain::tag::{Tag, TagFacet};

#[derive(Debug, Clone)]
pub(crate) struct PostgresTagRepository {
    pool: PgPool,
}

impl PostgresTagRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct TagRow {
    pub(super) id: i64,
    pub(super) name: String,
    pub(super) slug: String,
    pub(super) description: Option<String>,
    pub(super) color: Option<String>,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

impl TagRow {
    pub(super) fn into_tag(self) -> Tag {
        Tag {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            color: self.color,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TagFacetRow {
    #[sqlx(flatten)]
    tag: TagRow,
    visible_posts: i64,
}

const TAG_COLUMNS: &str = "t.id, t.name, t.slug, t.description, t.color, t.created_at, t.updated_at";

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn create_tag(&self, input: TagFields) -> Result<Tag, DomainError> {
        let row = sqlx::query_as::<_, TagRow>(
            "INSERT INTO tags (name, slug, description, color) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, slug, description, color, created_at, updated_at",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.color)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.into_tag())
    }

    async fn update_tag(&self, id: i64, changes: TagFields) -> Result<Option<Tag>, DomainError> {
        let row = sqlx::query_as::<_, TagRow>(
            "UPDATE tags \
             SET name = $2, slug = $3, description = $4, color = $5, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, name, slug, description, color, created_at, updated_at",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.slug)
        .bind(&changes.description)
        .bind(&changes.color)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(TagRow::into_tag))
    }

    async fn delete_tag(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, DomainError> {
        let rows = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags t ORDER BY t.name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(rows.into_iter().map(TagRow::into_tag).collect())
    }

    async fn find_tags(&self, ids: &[i64]) -> Result<Vec<Tag>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, TagRow>(&format!(
            "SELECT {TAG_COLUMNS} FROM tags t WHERE t.id = ANY($1) ORDER BY t.name"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(rows.into_iter().map(TagRow::into_tag).collect())
    }

    async fn popular_tags(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<TagFacet>, DomainError> {
        let rows = sqlx::query_as::<_, TagFacetRow>(&format!(
            "SELECT {TAG_COLUMNS}, COUNT(p.id) AS visible_posts \
             FROM tags t \
             JOIN post_tag pt ON pt.tag_id = t.id \
             JOIN posts p ON p.id = pt.post_id \
             WHERE p.status = 'published' AND p.published_at <= $1 \
             GROUP BY t.id, t.name, t.slug, t.description, t.color, t.created_at, t.updated_at \
             ORDER BY visible_posts DESC, t.name \
             LIMIT $2"
        ))
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| TagFacet {
                tag: row.tag.into_tag(),
                visible_posts: row.visible_posts,
            })
            .collect())
    }
}
