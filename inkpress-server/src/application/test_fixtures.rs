//! Shared seeding helpers for service tests running on the in-memory store.

use chrono::{Duration, Utc};

use crate::data::category_repository::{CategoryFields, CategoryRepository};
use crate::data::post_repository::{NewPost, PostRepository};
use crate::data::repositories::memory::MemoryStore;
use crate::data::tag_repository::{TagFields, TagRepository};
use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::category::Category;
use crate::domain::post::{Post, PostStatus};
use crate::domain::publication::{reading_time_minutes, slugify};
use crate::domain::tag::Tag;
use crate::domain::user::User;

pub(crate) struct SeededBlog {
    pub(crate) user: User,
    pub(crate) category: Category,
    pub(crate) tag: Tag,
    pub(crate) second_tag: Tag,
}

pub(crate) async fn seed_blog(store: &MemoryStore) -> SeededBlog {
    let user = store
        .create_user(NewUser {
            name: "Max".to_string(),
            email: "max@example.com".to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .expect("seed user");
    let category = seed_category(store, "Rust", "rust").await;
    let tag = seed_tag(store, "Tokio", "tokio").await;
    let second_tag = seed_tag(store, "Axum", "axum").await;
    SeededBlog {
        user,
        category,
        tag,
        second_tag,
    }
}

pub(crate) async fn seed_category(store: &MemoryStore, name: &str, slug: &str) -> Category {
    store
        .create_category(CategoryFields {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            color: None,
            icon: None,
            is_active: true,
            sort_order: 0,
        })
        .await
        .expect("seed category")
}

pub(crate) async fn seed_tag(store: &MemoryStore, name: &str, slug: &str) -> Tag {
    store
        .create_tag(TagFields {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            color: None,
        })
        .await
        .expect("seed tag")
}

pub(crate) async fn attach_tags(store: &MemoryStore, post_id: i64, tag_ids: &[i64]) {
    store
        .sync_tags(post_id, tag_ids)
        .await
        .expect("attach tags");
}

pub(crate) struct PostSeeder {
    store: MemoryStore,
    category_id: i64,
    user_id: i64,
}

impl PostSeeder {
    pub(crate) fn new(store: &MemoryStore, category: &Category, user: &User) -> Self {
        Self {
            store: store.clone(),
            category_id: category.id,
            user_id: user.id,
        }
    }

    async fn insert(
        &self,
        title: &str,
        excerpt: Option<&str>,
        content: &str,
        status: PostStatus,
        published_at: Option<chrono::DateTime<Utc>>,
        scheduled_at: Option<chrono::DateTime<Utc>>,
        is_featured: bool,
    ) -> Post {
        self.store
            .create_post(NewPost {
                title: title.to_string(),
                slug: slugify(title),
                excerpt: excerpt.map(str::to_string),
                content: content.to_string(),
                featured_image: None,
                category_id: self.category_id,
                user_id: self.user_id,
                status,
                published_at,
                scheduled_at,
                is_featured,
                allow_comments: true,
                reading_time: reading_time_minutes(content),
                meta_data: None,
            })
            .await
            .expect("seed post")
    }

    pub(crate) async fn visible(&self, title: &str, hours_ago: i64) -> Post {
        self.insert(
            title,
            None,
            "body",
            PostStatus::Published,
            Some(Utc::now() - Duration::hours(hours_ago)),
            None,
            false,
        )
        .await
    }

    pub(crate) async fn visible_with(
        &self,
        title: &str,
        excerpt: Option<&str>,
        content: &str,
        hours_ago: i64,
    ) -> Post {
        self.insert(
            title,
            excerpt,
            content,
            PostStatus::Published,
            Some(Utc::now() - Duration::hours(hours_ago)),
            None,
            false,
        )
        .await
    }

    pub(crate) async fn visible_featured(&self, title: &str, hours_ago: i64) -> Post {
        self.insert(
            title,
            None,
            "body",
            PostStatus::Published,
            Some(Utc::now() - Duration::hours(hours_ago)),
            None,
            true,
        )
        .await
    }

    pub(crate) async fn draft(&self, title: &str) -> Post {
        self.insert(title, None, "body", PostStatus::Draft, None, None, false)
            .await
    }

    pub(crate) async fn scheduled(&self, title: &str, hours_ahead: i64) -> Post {
        self.insert(
            title,
            None,
            "body",
            PostStatus::Scheduled,
            None,
            Some(Utc::now() + Duration::hours(hours_ahead)),
            false,
        )
        .await
    }

    /// status=published with a future timestamp: pre-scheduling through a
    /// direct timestamp edit, which must stay hidden until the time passes.
    pub(crate) async fn published_in_future(&self, title: &str, hours_ahead: i64) -> Post {
        self.insert(
            title,
            None,
            "body",
            PostStatus::Published,
            Some(Utc::now() + Duration::hours(hours_ahead)),
            None,
            false,
        )
        .await
    }
}
