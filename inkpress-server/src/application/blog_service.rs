use chrono::Utc;

use crate::data::category_repository::CategoryRepository;
use crate::data::post_query::{
    FEATURED_LIMIT, POPULAR_TAGS_LIMIT, PostFilter, PostPage, PostQuery, RELATED_LIMIT,
};
use crate::data::post_repository::PostRepository;
use crate::data::tag_repository::TagRepository;
use crate::domain::category::CategoryFacet;
use crate::domain::error::DomainError;
use crate::domain::post::PostDetail;
use crate::domain::tag::TagFacet;

/// Filters a public visitor can apply; everything else stays pinned to the
/// visibility predicate.
#[derive(Debug, Clone, Default)]
pub(crate) struct PublicFilters {
    pub(crate) search: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) tag: Option<String>,
}

impl PublicFilters {
    fn into_post_filter(self) -> PostFilter {
        PostFilter {
            search: self.search.filter(|s| !s.trim().is_empty()),
            category_slug: self.category.filter(|s| !s.trim().is_empty()),
            category_id: None,
            tag_slug: self.tag.filter(|s| !s.trim().is_empty()),
            status: None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PublicListing {
    pub(crate) page: PostPage,
    /// Hero posts, present only on an unfiltered first page.
    pub(crate) featured: Vec<PostDetail>,
    pub(crate) categories: Vec<CategoryFacet>,
    pub(crate) popular_tags: Vec<TagFacet>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PublicStats {
    pub(crate) published_posts: i64,
    pub(crate) active_categories: i64,
    pub(crate) total_views: i64,
}

/// Public reading surface: listing with facets, single-post view, related
/// posts, featured posts and home statistics.
pub(crate) struct BlogService<P, C, T>
where
    P: PostRepository,
    C: CategoryRepository,
    T: TagRepository,
{
    posts: P,
    categories: C,
    tags: T,
}

impl<P, C, T> BlogService<P, C, T>
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
        filters: PublicFilters,
        page: u32,
    ) -> Result<PublicListing, DomainError> {
        let now = Utc::now();
        let query = PostQuery::public_listing(filters.into_post_filter(), page, now);

        let listing = self.posts.list_posts(&query).await?;
        let featured = if query.filter.is_empty() && query.page == 1 {
            self.posts.featured_posts(now, FEATURED_LIMIT).await?
        } else {
            Vec::new()
        };
        let categories = self.categories.category_facets(now).await?;
        let popular_tags = self.tags.popular_tags(now, POPULAR_TAGS_LIMIT).await?;

        Ok(PublicListing {
            page: listing,
            featured,
            categories,
            popular_tags,
        })
    }

    /// Resolves a post by slug. Hidden posts (draft, scheduled, future
    /// publish timestamp) are a `NotFound` unless the caller is
    /// authenticated.
    pub(crate) async fn get_post(
        &self,
        slug: &str,
        include_hidden: bool,
    ) -> Result<PostDetail, DomainError> {
        let detail = self
            .posts
            .get_post_detail_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post slug: {slug}")))?;

        if !include_hidden && !detail.post.is_visible_at(Utc::now()) {
            return Err(DomainError::NotFound(format!("post slug: {slug}")));
        }
        Ok(detail)
    }

    /// Up to 4 other visible posts sharing the category or at least one tag,
    /// newest first. No relevance scoring, never padded.
    pub(crate) async fn related_posts(
        &self,
        detail: &PostDetail,
    ) -> Result<Vec<PostDetail>, DomainError> {
        let tag_ids: Vec<i64> = detail.tags.iter().map(|tag| tag.id).collect();
        self.posts
            .related_posts(
                detail.post.id,
                detail.post.category_id,
                &tag_ids,
                Utc::now(),
                RELATED_LIMIT,
            )
            .await
    }

    /// Fire-and-forget view counter bump; the increment is atomic at the
    /// storage layer.
    pub(crate) async fn increment_views(&self, post_id: i64) -> Result<(), DomainError> {
        self.posts.increment_views(post_id).await
    }

    pub(crate) async fn public_stats(&self) -> Result<PublicStats, DomainError> {
        let now = Utc::now();
        Ok(PublicStats {
            published_posts: self.posts.count_visible(now).await?,
            active_categories: self.categories.count_active_categories().await?,
            total_views: self.posts.sum_visible_views(now).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{BlogService, PublicFilters};
    use crate::application::test_fixtures::{PostSeeder, attach_tags, seed_blog, seed_category};
    use crate::data::post_query::PUBLIC_PAGE_SIZE;
    use crate::data::repositories::memory::MemoryStore;
    use crate::domain::error::DomainError;
    use crate::domain::post::PostStatus;

    fn service(store: &MemoryStore) -> BlogService<MemoryStore, MemoryStore, MemoryStore> {
        BlogService::new(store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn listing_returns_only_visible_posts() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);

        posts.visible("Visible post", 1).await;
        posts.draft("Draft post").await;
        posts.scheduled("Scheduled post", 2).await;
        posts.published_in_future("Future post", 1).await;

        let listing = service(&store)
            .list_posts(PublicFilters::default(), 1)
            .await
            .expect("listing must succeed");

        assert_eq!(listing.page.total, 1);
        assert_eq!(listing.page.items.len(), 1);
        assert_eq!(listing.page.items[0].post.title, "Visible post");
    }

    #[tokio::test]
    async fn search_matches_title_excerpt_and_content_case_insensitively() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);

        posts
            .visible_with("Kubernetes in production", None, "plain body", 1)
            .await;
        posts
            .visible_with("Other title", Some("running KUBERNETES clusters"), "body", 2)
            .await;
        posts
            .visible_with("Third title", None, "a kubernetes deep dive", 3)
            .await;
        posts.visible("Unrelated", 4).await;

        let listing = service(&store)
            .list_posts(
                PublicFilters {
                    search: Some("kubernetes".to_string()),
                    ..PublicFilters::default()
                },
                1,
            )
            .await
            .expect("listing must succeed");

        assert_eq!(listing.page.total, 3);
    }

    #[tokio::test]
    async fn filters_compose_with_and_semantics() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);

        let tagged = posts.visible("Rust and tags", 1).await;
        attach_tags(&store, tagged.id, &[seeded.tag.id]).await;
        posts.visible("Rust without tags", 2).await;

        let listing = service(&store)
            .list_posts(
                PublicFilters {
                    search: Some("rust".to_string()),
                    category: Some(seeded.category.slug.clone()),
                    tag: Some(seeded.tag.slug.clone()),
                },
                1,
            )
            .await
            .expect("listing must succeed");

        assert_eq!(listing.page.total, 1);
        assert_eq!(listing.page.items[0].post.id, tagged.id);
    }

    #[tokio::test]
    async fn featured_posts_appear_only_on_unfiltered_first_page() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);

        for n in 0..4i64 {
            posts
                .visible_featured(&format!("Featured {n}"), n + 1)
                .await;
        }

        let svc = service(&store);
        let first = svc
            .list_posts(PublicFilters::default(), 1)
            .await
            .expect("listing must succeed");
        assert_eq!(first.featured.len(), 3);

        let second = svc
            .list_posts(PublicFilters::default(), 2)
            .await
            .expect("listing must succeed");
        assert!(second.featured.is_empty());

        let filtered = svc
            .list_posts(
                PublicFilters {
                    search: Some("Featured".to_string()),
                    ..PublicFilters::default()
                },
                1,
            )
            .await
            .expect("listing must succeed");
        assert!(filtered.featured.is_empty());
    }

    #[tokio::test]
    async fn pagination_reports_total_and_last_page() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);

        for n in 0..(PUBLIC_PAGE_SIZE + 2) {
            posts.visible(&format!("Post {n}"), n as i64 + 1).await;
        }

        let svc = service(&store);
        let first = svc
            .list_posts(PublicFilters::default(), 1)
            .await
            .expect("listing must succeed");
        assert_eq!(first.page.items.len(), PUBLIC_PAGE_SIZE as usize);
        assert_eq!(first.page.total, (PUBLIC_PAGE_SIZE + 2) as i64);
        assert_eq!(first.page.last_page(), 2);

        let second = svc
            .list_posts(PublicFilters::default(), 2)
            .await
            .expect("listing must succeed");
        assert_eq!(second.page.items.len(), 2);
    }

    #[tokio::test]
    async fn get_post_hides_unpublished_from_anonymous_callers() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);

        let draft = posts.draft("Hidden draft").await;
        let future = posts.published_in_future("Early bird", 1).await;
        let visible = posts.visible("Readable", 1).await;

        let svc = service(&store);
        assert!(matches!(
            svc.get_post(&draft.slug, false).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            svc.get_post(&future.slug, false).await,
            Err(DomainError::NotFound(_))
        ));
        assert_eq!(
            svc.get_post(&visible.slug, false)
                .await
                .expect("visible post must resolve")
                .post
                .id,
            visible.id
        );

        // Authenticated callers can preview drafts.
        assert_eq!(
            svc.get_post(&draft.slug, true)
                .await
                .expect("draft must resolve for admin")
                .post
                .status,
            PostStatus::Draft
        );
    }

    #[tokio::test]
    async fn related_posts_match_category_or_shared_tag() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);
        let other_category = seed_category(&store, "Other", "other").await;
        let other_posts = PostSeeder::new(&store, &other_category, &seeded.user);

        let post_a = posts.visible("Post A", 4).await;
        attach_tags(&store, post_a.id, &[seeded.tag.id, seeded.second_tag.id]).await;

        // B: different category, shares one tag with A.
        let post_b = other_posts.visible("Post B", 3).await;
        attach_tags(&store, post_b.id, &[seeded.tag.id]).await;

        // D: same category, no shared tags.
        let post_d = posts.visible("Post D", 2).await;

        other_posts.visible("Unrelated", 1).await;

        let svc = service(&store);
        let detail = svc
            .get_post(&post_a.slug, false)
            .await
            .expect("post A must resolve");
        let related = svc
            .related_posts(&detail)
            .await
            .expect("related must succeed");

        let ids: Vec<i64> = related.iter().map(|d| d.post.id).collect();
        assert!(ids.contains(&post_b.id));
        assert!(ids.contains(&post_d.id));
        assert!(!ids.contains(&post_a.id));
        assert_eq!(ids.len(), 2);

        // Newest first.
        let times: Vec<_> = related
            .iter()
            .map(|d| d.post.published_at.expect("related posts are published"))
            .collect();
        assert!(times.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn facets_exclude_zero_count_entries() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);
        seed_category(&store, "Empty", "empty").await;

        let post = posts.visible("Tagged", 1).await;
        attach_tags(&store, post.id, &[seeded.tag.id]).await;
        // second_tag has no visible posts and must not appear.

        let listing = service(&store)
            .list_posts(PublicFilters::default(), 1)
            .await
            .expect("listing must succeed");

        let category_slugs: Vec<&str> = listing
            .categories
            .iter()
            .map(|f| f.category.slug.as_str())
            .collect();
        assert_eq!(category_slugs, vec![seeded.category.slug.as_str()]);

        let tag_slugs: Vec<&str> = listing
            .popular_tags
            .iter()
            .map(|f| f.tag.slug.as_str())
            .collect();
        assert_eq!(tag_slugs, vec![seeded.tag.slug.as_str()]);
        assert_eq!(listing.popular_tags[0].visible_posts, 1);
    }

    #[tokio::test]
    async fn public_stats_count_only_visible_posts() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);

        let visible = posts.visible("Seen", 1).await;
        posts.draft("Unseen").await;

        let svc = service(&store);
        svc.increment_views(visible.id).await.expect("bump views");
        svc.increment_views(visible.id).await.expect("bump views");

        let stats = svc.public_stats().await.expect("stats must succeed");
        assert_eq!(stats.published_posts, 1);
        assert_eq!(stats.active_categories, 1);
        assert_eq!(stats.total_views, 2);
    }

    #[tokio::test]
    async fn published_with_future_timestamp_stays_hidden() {
        let store = MemoryStore::new();
        let seeded = seed_blog(&store).await;
        let posts = PostSeeder::new(&store, &seeded.category, &seeded.user);

        let early = posts.published_in_future("Early", 1).await;
        assert_eq!(early.status, PostStatus::Published);
        assert!(early.published_at.expect("set") > Utc::now() - Duration::seconds(1));

        let listing = service(&store)
            .list_posts(PublicFilters::default(), 1)
            .await
            .expect("listing must succeed");
        assert_eq!(listing.page.total, 0);
    }
}
