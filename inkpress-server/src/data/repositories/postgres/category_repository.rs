use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::map_db_error;
use crate::data::category_repository::{CategoryFields, CategoryRepository};
use crate::domain::category::{Category, CategoryFacet};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: Option<String>,
    color: Option<String>,
    icon: Option<String>,
    is_active: bool,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            color: self.color,
            icon: self.icon,
            is_active: self.is_active,
            sort_order: self.sort_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryFacetRow {
    #[sqlx(flatten)]
    category: CategoryRow,
    visible_posts: i64,
}

const CATEGORY_COLUMNS: &str = "c.id, c.name, c.slug, c.description, c.color, c.icon, \
     c.is_active, c.sort_order, c.created_at, c.updated_at";

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create_category(&self, input: CategoryFields) -> Result<Category, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name, slug, description, color, icon, is_active, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, name, slug, description, color, icon, is_active, sort_order, \
                       created_at, updated_at",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.color)
        .bind(&input.icon)
        .bind(input.is_active)
        .bind(input.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.into_category())
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(CategoryRow::into_category))
    }

    async fn update_category(
        &self,
        id: i64,
        changes: CategoryFields,
    ) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories \
             SET name = $2, slug = $3, description = $4, color = $5, icon = $6, \
                 is_active = $7, sort_order = $8, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, name, slug, description, color, icon, is_active, sort_order, \
                       created_at, updated_at",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.slug)
        .bind(&changes.description)
        .bind(&changes.color)
        .bind(&changes.icon)
        .bind(changes.is_active)
        .bind(changes.sort_order)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(CategoryRow::into_category))
    }

    async fn delete_category(&self, id: i64) -> Result<Option<u64>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        let posts_removed = sqlx::query("DELETE FROM posts WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();
        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();
        tx.commit().await.map_err(map_db_error)?;

        if deleted == 0 {
            return Ok(None);
        }
        Ok(Some(posts_removed))
    }

    async fn list_active_categories(&self) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.is_active ORDER BY c.name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    async fn category_facets(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<CategoryFacet>, DomainError> {
        let rows = sqlx::query_as::<_, CategoryFacetRow>(&format!(
            "SELECT {CATEGORY_COLUMNS}, COUNT(p.id) AS visible_posts \
             FROM categories c \
             JOIN posts p ON p.category_id = c.id \
             WHERE c.is_active AND p.status = 'published' AND p.published_at <= $1 \
             GROUP BY c.id, c.name, c.slug, c.description, c.color, c.icon, c.is_active, \
                      c.sort_order, c.created_at, c.updated_at \
             ORDER BY c.name"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryFacet {
                category: row.category.into_category(),
                visible_posts: row.visible_posts,
            })
            .collect())
    }

    async fn count_active_categories(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE is_active")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}
