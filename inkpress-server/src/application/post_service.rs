use chrono::Utc;
use tracing::info;

use crate::data::category_repository::CategoryRepository;
use crate::data::post_query::{PostFilter, PostPage, PostQuery};
use crate::data::post_repository::{NewPost, PostChanges, PostRepository};
use crate::data::tag_repository::TagRepository;
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, PostDetail, PostStatus, UpdatePostRequest};
use crate::domain::publication::{
    PublicationState, reading_time_minutes, resolve_publication, slugify,
};

/// Filters the admin list accepts on top of the shared search box.
#[derive(Debug, Clone, Default)]
pub(crate) struct AdminFilters {
    pub(crate) search: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) status: Option<PostStatus>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostDashboardStats {
    pub(crate) total_posts: i64,
    pub(crate) published_posts: i64,
    pub(crate) draft_posts: i64,
    pub(crate) total_views: i64,
    pub(crate) recent_posts: Vec<PostDetail>,
}

const RECENT_POSTS_LIMIT: u32 = 5;

/// Admin-side post management: every create/update runs through the
/// publication state machine and the slug/reading-time derivation before it
/// reaches the store.
pub(crate) struct PostService<P, C, T>
where
    P: PostRepository,
    C: CategoryRepository,
    T: TagRepository,
{
    posts: P,
    categories: C,
    tags: T,
}

impl<P, C, T> PostService<P, C, T>
where
    P: PostRepository,
    C: CategoryRepository,
    T: TagRepository,
{
    pub(crate) fn new(posts: P, categories: C, tags: T) -> Self {
        Self {
            posts,
            categories,
            tags,
        }
    }

    pub(crate) async fn list_posts(
        &self,
        filters: AdminFilters,
        page: u32,
    ) -> Result<PostPage, DomainError> {
        let filter = PostFilter {
            search: filters.search.filter(|s| !s.trim().is_empty()),
            category_slug: None,
            category_id: filters.category_id,
            tag_slug: None,
            status: filters.status,
        };
        let query = PostQuery::admin_listing(filter, page, Utc::now());
        self.posts.list_posts(&query).await
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<PostDetail, DomainError> {
        self.posts
            .get_post_detail(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<PostDetail, DomainError> {
        let req = req.validate()?;
        self.ensure_category_exists(req.category_id).await?;
        let tag_ids = self.ensure_tags_exist(&req.tag_ids).await?;

        let slug = match &req.slug {
            Some(explicit) => self.claim_explicit_slug(explicit, None).await?,
            None => self.derive_unique_slug(&req.title, None).await?,
        };
        let publication = resolve_publication(
            None,
            PublicationState {
                status: req.status,
                published_at: req.published_at,
                scheduled_at: req.scheduled_at,
            },
            Utc::now(),
        )?;

        let post = self
            .posts
            .create_post(NewPost {
                title: req.title,
                slug,
                excerpt: req.excerpt,
                reading_time: reading_time_minutes(&req.content),
                content: req.content,
                featured_image: req.featured_image,
                category_id: req.category_id,
                user_id: author_id,
                status: publication.status,
                published_at: publication.published_at,
                scheduled_at: publication.scheduled_at,
                is_featured: req.is_featured,
                allow_comments: req.allow_comments,
                meta_data: req.meta_data,
            })
            .await?;
        self.posts.sync_tags(post.id, &tag_ids).await?;

        info!(post_id = post.id, slug = %post.slug, "post created");
        self.get_post(post.id).await
    }

    pub(crate) async fn update_post(
        &self,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<PostDetail, DomainError> {
        let req = req.validate()?;
        let previous = self
            .posts
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;
        self.ensure_category_exists(req.category_id).await?;
        let tag_ids = self.ensure_tags_exist(&req.tag_ids).await?;

        // Title edits never regenerate a slug on their own; only a cleared
        // slug field re-derives from the (possibly new) title.
        let slug = match &req.slug {
            Some(explicit) if *explicit != previous.slug => {
                self.claim_explicit_slug(explicit, Some(id)).await?
            }
            Some(explicit) => explicit.clone(),
            None => self.derive_unique_slug(&req.title, Some(id)).await?,
        };

        let previous_state = PublicationState {
            status: previous.status,
            published_at: previous.published_at,
            scheduled_at: previous.scheduled_at,
        };
        let publication = resolve_publication(
            Some(&previous_state),
            PublicationState {
                status: req.status,
                published_at: req.published_at,
                scheduled_at: req.scheduled_at,
            },
            Utc::now(),
        )?;

        // Content may be unchanged, but the recompute is cheap and pure.
        let reading_time = reading_time_minutes(&req.content);

        self.posts
            .update_post(
                id,
                PostChanges {
                    title: req.title,
                    slug,
                    excerpt: req.excerpt,
                    content: req.content,
                    featured_image: req.featured_image,
                    category_id: req.category_id,
                    status: publication.status,
                    published_at: publication.published_at,
                    scheduled_at: publication.scheduled_at,
                    is_featured: req.is_featured,
                    allow_comments: req.allow_comments,
                    reading_time,
                    meta_data: req.meta_data,
                },
            )
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;
        self.posts.sync_tags(id, &tag_ids).await?;

        self.get_post(id).await
    }

    pub(crate) async fn delete_post(&self, id: i64) -> Result<(), DomainError> {
        let deleted = self.posts.delete_post(id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {id}")));
        }
        info!(post_id = id, "post deleted");
        Ok(())
    }

    pub(crate) async fn dashboard_stats(&self) -> Result<PostDashboardStats, DomainError> {
        let now = Utc::now();
        Ok(PostDashboardStats {
            total_posts: self.posts.count_all().await?,
            published_posts: self.posts.count_visible(now).await?,
            draft_posts: self.posts.count_by_status(PostStatus::Draft).await?,
            total_views: self.posts.sum_all_views().await?,
            recent_posts: self.posts.recent_posts(RECENT_POSTS_LIMIT).await?,
        })
    }

    async fn ensure_category_exists(&self, category_id: i64) -> Result<(), DomainError> {
        if self.categories.get_category(category_id).await?.is_none() {
            return Err(DomainError::Validation {
                field: "category_id",
                message: "the selected category does not exist",
            });
        }
        Ok(())
    }

    async fn ensure_tags_exist(&self, tag_ids: &[i64]) -> Result<Vec<i64>, DomainError> {
        let mut unique = tag_ids.to_vec();
        unique.sort_unstable();
        unique.dedup();
        if unique.is_empty() {
            return Ok(unique);
        }
        let found = self.tags.find_tags(&unique).await?;
        if found.len() != unique.len() {
            return Err(DomainError::Validation {
                field: "tag_ids",
                message: "one or more selected tags do not exist",
            });
        }
        Ok(unique)
    }

    async fn claim_explicit_slug(
        &self,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<String, DomainError> {
        if self.posts.slug_exists(slug, exclude_id).await? {
            return Err(DomainError::AlreadyExists(format!("post slug: {slug}")));
        }
        Ok(slug.to_string())
    }

    // Derived slugs are suffixed until free, so identical titles never
    // silently collide.
    async fn derive_unique_slug(
        &self,
        title: &str,
        exclude_id: Option<i64>,
    ) -> Result<String, DomainError> {
        let base = slugify(title);
        if base.is_empty() {
            return Err(DomainError::Validation {
                field: "title",
                message: "must contain at least one alphanumeric char",
            });
        }
        let mut candidate = base.clone();
        let mut suffix = 2u32;
        while self.posts.slug_exists(&candidate, exclude_id).await? {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{AdminFilters, PostService};
    use crate::application::test_fixtures::{PostSeeder, seed_blog};
    use crate::data::repositories::memory::MemoryStore;
    use crate::domain::error::DomainError;
    use crate::domain::post::{CreatePostRequest, PostStatus, UpdatePostRequest};

    fn service(store: &MemoryStore) -> PostService<MemoryStore, MemoryStore, MemoryStore> {
        PostService::new(store.clone(), store.clone(), store.clone())
    }

    fn create_request(title: &str, category_id: i64) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            slug: None,
            excerpt: None,
            content: "Some content".to_string(),
            featured_image: None,
            category_id,
            status: PostStatus::Draft,
            published_at: None,
            scheduled_at: None,
            is_featured: false,
            allow_comments: true,
            meta_data: None,
            tag_ids: Vec::new(),
        }
    }

    fn update_request_from(detail: &crate::domain::post::PostDetail) -> UpdatePostRequest {
        UpdatePostRequest {
            title: detail.post.title.clone(),
            slug: Some(detail.post.slug.clone()),
            excerpt: detail.post.excerpt.clone(),
            content: detail.post.content.clone(),
            featured_image: detail.post.featured_image.clone(),
            category_id: detail.post.category_id,
            status: detail.post.status,
            published_at: detail.post.published_at,
            scheduled_at: detail.post.scheduled_at,
            is_featured: detail.post.is_featured,
            allow_comments: detail.post.allow_comments,
            meta_data: detail.post.meta_data.clone(),
            tag_ids: detail.tags.iter().map(|t| t.id).collect(),
        }
    }

    #[tokio::test]
    async fn identical_titles_get_suffixed_slugs() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let svc = service(&store);

        let first = svc
            .create_post(seeded.user.id, create_request("Hello World", seeded.category.id))
            .await
            .expect("first create must succeed");
        let second = svc
            .create_post(seeded.user.id, create_request("Hello World", seeded.category.id))
            .await
            .expect("second create must succeed");
        let third = svc
            .create_post(seeded.user.id, create_request("Hello World", seeded.category.id))
            .await
            .expect("third create must succeed");

        assert_eq!(first.post.slug, "hello-world");
        assert_eq!(second.post.slug, "hello-world-2");
        assert_eq!(third.post.slug, "hello-world-3");
    }

    #[tokio::test]
    async fn explicit_slug_collision_is_rejected() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let svc = service(&store);

        svc.create_post(seeded.user.id, create_request("Hello World", seeded.category.id))
            .await
            .expect("first create must succeed");

        let mut req = create_request("Different title", seeded.category.id);
        req.slug = Some("hello-world".to_string());
        let err = svc
            .create_post(seeded.user.id, req)
            .await
            .expect_err("explicit collision must fail");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn create_rejects_unknown_category_and_tags() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let svc = service(&store);

        let err = svc
            .create_post(seeded.user.id, create_request("Post", 9999))
            .await
            .expect_err("unknown category must fail");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "category_id",
                ..
            }
        ));

        let mut req = create_request("Post", seeded.category.id);
        req.tag_ids = vec![seeded.tag.id, 9999];
        let err = svc
            .create_post(seeded.user.id, req)
            .await
            .expect_err("unknown tag must fail");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "tag_ids",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn publishing_a_draft_stamps_published_at_and_makes_it_visible() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let svc = service(&store);

        let draft = svc
            .create_post(seeded.user.id, create_request("Hello World", seeded.category.id))
            .await
            .expect("create must succeed");
        assert_eq!(draft.post.slug, "hello-world");
        assert_eq!(draft.post.status, PostStatus::Draft);
        assert!(draft.post.published_at.is_none());

        let mut req = update_request_from(&draft);
        req.status = PostStatus::Published;
        let published = svc
            .update_post(draft.post.id, req)
            .await
            .expect("publish must succeed");

        assert_eq!(published.post.status, PostStatus::Published);
        let stamped = published.post.published_at.expect("published_at stamped");
        assert!(stamped <= Utc::now());
        assert!(published.post.is_visible_at(Utc::now()));
    }

    #[tokio::test]
    async fn scheduling_requires_future_timestamp() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let svc = service(&store);

        let mut req = create_request("Scheduled post", seeded.category.id);
        req.status = PostStatus::Scheduled;
        req.scheduled_at = Some(Utc::now() - Duration::hours(1));
        let err = svc
            .create_post(seeded.user.id, req)
            .await
            .expect_err("past schedule must fail");
        assert!(matches!(err, DomainError::InvalidTransition(_)));

        let mut req = create_request("Scheduled post", seeded.category.id);
        req.status = PostStatus::Scheduled;
        req.scheduled_at = Some(Utc::now() + Duration::hours(1));
        req.published_at = Some(Utc::now());
        let scheduled = svc
            .create_post(seeded.user.id, req)
            .await
            .expect("future schedule must succeed");
        assert_eq!(scheduled.post.status, PostStatus::Scheduled);
        assert!(scheduled.post.published_at.is_none());
    }

    #[tokio::test]
    async fn reverting_to_draft_clears_timestamps() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);
        let svc = service(&store);

        let published = posts.visible("Published post", 1).await;
        let detail = svc.get_post(published.id).await.expect("detail");

        let mut req = update_request_from(&detail);
        req.status = PostStatus::Draft;
        let reverted = svc
            .update_post(published.id, req)
            .await
            .expect("revert must succeed");

        assert_eq!(reverted.post.status, PostStatus::Draft);
        assert!(reverted.post.published_at.is_none());
        assert!(reverted.post.scheduled_at.is_none());
    }

    #[tokio::test]
    async fn title_edit_keeps_slug_unless_cleared() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let svc = service(&store);

        let created = svc
            .create_post(seeded.user.id, create_request("Hello World", seeded.category.id))
            .await
            .expect("create must succeed");

        let mut req = update_request_from(&created);
        req.title = "Completely new title".to_string();
        let updated = svc
            .update_post(created.post.id, req)
            .await
            .expect("update must succeed");
        assert_eq!(updated.post.slug, "hello-world");

        let mut req = update_request_from(&updated);
        req.slug = None;
        let rederived = svc
            .update_post(created.post.id, req)
            .await
            .expect("update must succeed");
        assert_eq!(rederived.post.slug, "completely-new-title");
    }

    #[tokio::test]
    async fn reading_time_tracks_content_edits() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let svc = service(&store);

        let created = svc
            .create_post(seeded.user.id, create_request("Short post", seeded.category.id))
            .await
            .expect("create must succeed");
        assert_eq!(created.post.reading_time, 1);

        let mut req = update_request_from(&created);
        req.content = "word ".repeat(400);
        let updated = svc
            .update_post(created.post.id, req)
            .await
            .expect("update must succeed");
        assert_eq!(updated.post.reading_time, 2);
    }

    #[tokio::test]
    async fn admin_search_skips_content() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);
        let svc = service(&store);

        posts
            .visible_with("Title hit kubernetes", None, "body", 1)
            .await;
        posts
            .visible_with("No match here", None, "kubernetes only in content", 2)
            .await;

        let page = svc
            .list_posts(
                AdminFilters {
                    search: Some("kubernetes".to_string()),
                    ..AdminFilters::default()
                },
                1,
            )
            .await
            .expect("listing must succeed");

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].post.title, "Title hit kubernetes");
    }

    #[tokio::test]
    async fn admin_list_includes_drafts_and_orders_by_created_at() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);
        let svc = service(&store);

        posts.visible("Older published", 5).await;
        posts.draft("Newest draft").await;

        let page = svc
            .list_posts(AdminFilters::default(), 1)
            .await
            .expect("listing must succeed");
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].post.title, "Newest draft");

        let drafts = svc
            .list_posts(
                AdminFilters {
                    status: Some(PostStatus::Draft),
                    ..AdminFilters::default()
                },
                1,
            )
            .await
            .expect("listing must succeed");
        assert_eq!(drafts.total, 1);
    }

    #[tokio::test]
    async fn delete_post_removes_it_and_its_associations() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let svc = service(&store);

        let mut req = create_request("Doomed", seeded.category.id);
        req.tag_ids = vec![seeded.tag.id];
        let created = svc
            .create_post(seeded.user.id, req)
            .await
            .expect("create must succeed");

        svc.delete_post(created.post.id)
            .await
            .expect("delete must succeed");
        assert!(matches!(
            svc.get_post(created.post.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            svc.delete_post(created.post.id).await,
            Err(DomainError::NotFound(_))
        ));
    }
}
