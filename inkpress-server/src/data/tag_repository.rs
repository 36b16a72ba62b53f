use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::tag::{Tag, TagFacet};

#[derive(Debug, Clone)]
pub(crate) struct TagFields {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
}

#[async_trait]
pub(crate) trait TagRepository: Send + Sync {
    async fn create_tag(&self, input: TagFields) -> Result<Tag, DomainError>;
    async fn update_tag(&self, id: i64, changes: TagFields) -> Result<Option<Tag>, DomainError>;
    /// Removes the tag and its post associations; posts stay.
    async fn delete_tag(&self, id: i64) -> Result<bool, DomainError>;

    /// All tags ordered by name.
    async fn list_tags(&self) -> Result<Vec<Tag>, DomainError>;
    /// Tags owned by the given ids, for validating a post's tag set.
    async fn find_tags(&self, ids: &[i64]) -> Result<Vec<Tag>, DomainError>;
    /// Tags with at least one visible post, counted, most-used first.
    async fn popular_tags(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<TagFacet>, DomainError>;
}
