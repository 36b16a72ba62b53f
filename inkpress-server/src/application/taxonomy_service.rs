use tracing::warn;

use crate::data::category_repository::{CategoryFields, CategoryRepository};
use crate::data::tag_repository::{TagFields, TagRepository};
use crate::domain::category::{Category, CategoryInput};
use crate::domain::error::DomainError;
use crate::domain::tag::{Tag, TagInput};

/// Admin-side category and tag management.
pub(crate) struct TaxonomyService<C, T>
where
    C: CategoryRepository,
    T: TagRepository,
{
    categories: C,
    tags: T,
}

impl<C, T> TaxonomyService<C, T>
where
    C: CategoryRepository,
    T: TagRepository,
{
    pub(crate) fn new(categories: C, tags: T) -> Self {
        Self { categories, tags }
    }

    pub(crate) async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.categories.list_active_categories().await
    }

    pub(crate) async fn create_category(
        &self,
        input: CategoryInput,
    ) -> Result<Category, DomainError> {
        let input = input.validate()?;
        self.categories
            .create_category(category_fields(input))
            .await
    }

    pub(crate) async fn update_category(
        &self,
        id: i64,
        input: CategoryInput,
    ) -> Result<Category, DomainError> {
        let input = input.validate()?;
        self.categories
            .update_category(id, category_fields(input))
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("category id: {id}")))
    }

    /// Deleting a category takes its posts with it. Kept for parity with the
    /// stored schema's cascade; the log line exists because the blast radius
    /// is easy to underestimate.
    pub(crate) async fn delete_category(&self, id: i64) -> Result<(), DomainError> {
        let posts_removed = self
            .categories
            .delete_category(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("category id: {id}")))?;
        if posts_removed > 0 {
            warn!(category_id = id, posts_removed, "category delete cascaded to posts");
        }
        Ok(())
    }

    pub(crate) async fn list_tags(&self) -> Result<Vec<Tag>, DomainError> {
        self.tags.list_tags().await
    }

    pub(crate) async fn create_tag(&self, input: TagInput) -> Result<Tag, DomainError> {
        let input = input.validate()?;
        self.tags.create_tag(tag_fields(input)).await
    }

    pub(crate) async fn update_tag(&self, id: i64, input: TagInput) -> Result<Tag, DomainError> {
        let input = input.validate()?;
        self.tags
            .update_tag(id, tag_fields(input))
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("tag id: {id}")))
    }

    pub(crate) async fn delete_tag(&self, id: i64) -> Result<(), DomainError> {
        if !self.tags.delete_tag(id).await? {
            return Err(DomainError::NotFound(format!("tag id: {id}")));
        }
        Ok(())
    }
}

// The inputs arrive validated, so the slug is always present here.
fn category_fields(input: CategoryInput) -> CategoryFields {
    CategoryFields {
        slug: input.slug.unwrap_or_default(),
        name: input.name,
        description: input.description,
        color: input.color,
        icon: input.icon,
        is_active: input.is_active,
        sort_order: input.sort_order,
    }
}

fn tag_fields(input: TagInput) -> TagFields {
    TagFields {
        slug: input.slug.unwrap_or_default(),
        name: input.name,
        description: input.description,
        color: input.color,
    }
}

#[cfg(test)]
mod tests {
    use super::TaxonomyService;
    use crate::application::test_fixtures::{PostSeeder, seed_blog};
    use crate::data::post_repository::PostRepository;
    use crate::data::repositories::memory::MemoryStore;
    use crate::domain::category::CategoryInput;
    use crate::domain::error::DomainError;
    use crate::domain::tag::TagInput;

    fn service(store: &MemoryStore) -> TaxonomyService<MemoryStore, MemoryStore> {
        TaxonomyService::new(store.clone(), store.clone())
    }

    fn category_input(name: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            slug: None,
            description: None,
            color: None,
            icon: None,
            is_active: true,
            sort_order: 0,
        }
    }

    #[tokio::test]
    async fn category_slug_collisions_are_rejected() {
        let store = MemoryStore::new();
        let svc = service(&store);

        svc.create_category(category_input("Web Security"))
            .await
            .expect("create must succeed");
        let err = svc
            .create_category(category_input("Web Security"))
            .await
            .expect_err("duplicate slug must fail");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn deleting_a_category_cascades_to_its_posts() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);
        let doomed = posts.visible("Goes away", 1).await;

        service(&store)
            .delete_category(seeded.category.id)
            .await
            .expect("delete must succeed");

        assert!(
            store
                .get_post(doomed.id)
                .await
                .expect("lookup must succeed")
                .is_none()
        );
    }

    #[tokio::test]
    async fn tag_delete_keeps_posts() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);
        let post = posts.visible("Stays", 1).await;
        store
            .sync_tags(post.id, &[seeded.tag.id])
            .await
            .expect("attach tags");

        service(&store)
            .delete_tag(seeded.tag.id)
            .await
            .expect("delete must succeed");

        let detail = store
            .get_post_detail(post.id)
            .await
            .expect("lookup must succeed")
            .expect("post still there");
        assert!(detail.tags.is_empty());
    }

    #[tokio::test]
    async fn tag_updates_reslugify() {
        let store = MemoryStore::new();
        let svc = service(&store);

        let tag = svc
            .create_tag(TagInput {
                name: "Async Rust".to_string(),
                slug: None,
                description: None,
                color: None,
            })
            .await
            .expect("create must succeed");
        assert_eq!(tag.slug, "async-rust");

        let updated = svc
            .update_tag(
                tag.id,
                TagInput {
                    name: "Async Await".to_string(),
                    slug: None,
                    description: None,
                    color: None,
                },
            )
            .await
            .expect("update must succeed");
        assert_eq!(updated.slug, "async-await");
    }
}
