use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::category::{Category, CategoryFacet};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct CategoryFields {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
    pub(crate) icon: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) sort_order: i32,
}

#[async_trait]
pub(crate) trait CategoryRepository: Send + Sync {
    async fn create_category(&self, input: CategoryFields) -> Result<Category, DomainError>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError>;
    async fn update_category(
        &self,
        id: i64,
        changes: CategoryFields,
    ) -> Result<Option<Category>, DomainError>;
    /// Deletes the category AND its posts (cascade preserved from the
    /// original schema). Returns the number of posts removed with it.
    async fn delete_category(&self, id: i64) -> Result<Option<u64>, DomainError>;

    /// Active categories ordered by name, for admin forms.
    async fn list_active_categories(&self) -> Result<Vec<Category>, DomainError>;
    /// Active categories with a visible-post count, zero-count excluded,
    /// ordered by name.
    async fn category_facets(&self, now: DateTime<Utc>) -> Result<Vec<CategoryFacet>, DomainError>;
    async fn count_active_categories(&self) -> Result<i64, DomainError>;
}
