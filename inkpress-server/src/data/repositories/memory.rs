//! In-memory repositories behind the `memory-store` feature.
//!
//! Implements the same traits as the Postgres repositories with the same
//! query semantics, so services can be exercised without a database. Not a
//! durable store: state lives behind one `RwLock` and dies with the process.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::category_repository::{CategoryFields, CategoryRepository};
use crate::data::comment_repository::{CommentPage, CommentRepository, NewComment};
use crate::data::post_query::{PostOrder, PostPage, PostQuery, SearchFields};
use crate::data::post_repository::{NewPost, PostChanges, PostRepository};
use crate::data::tag_repository::{TagFields, TagRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::category::{Category, CategoryFacet};
use crate::domain::comment::{Comment, CommentRecord, CommentStatus};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDetail};
use crate::domain::tag::{Tag, TagFacet};
use crate::domain::user::User;

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct State {
    users: HashMap<i64, StoredUser>,
    categories: HashMap<i64, Category>,
    tags: HashMap<i64, Tag>,
    posts: HashMap<i64, Post>,
    post_tags: BTreeSet<(i64, i64)>,
    comments: HashMap<i64, Comment>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn tags_for_post(&self, post_id: i64) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .post_tags
            .iter()
            .filter(|(pid, _)| *pid == post_id)
            .filter_map(|(_, tag_id)| self.tags.get(tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    fn detail_for(&self, post: &Post) -> Result<PostDetail, DomainError> {
        let category = self
            .categories
            .get(&post.category_id)
            .ok_or_else(|| DomainError::Unexpected("post without category".to_string()))?;
        let author = self
            .users
            .get(&post.user_id)
            .ok_or_else(|| DomainError::Unexpected("post without author".to_string()))?;
        Ok(PostDetail {
            post: post.clone(),
            category_name: category.name.clone(),
            category_slug: category.slug.clone(),
            author_name: author.user.name.clone(),
            tags: self.tags_for_post(post.id),
        })
    }

    fn details_for(&self, posts: Vec<Post>) -> Result<Vec<PostDetail>, DomainError> {
        posts.iter().map(|post| self.detail_for(post)).collect()
    }

    fn remove_post_cascading(&mut self, post_id: i64) {
        self.posts.remove(&post_id);
        self.post_tags.retain(|(pid, _)| *pid != post_id);
        self.comments.retain(|_, comment| comment.post_id != post_id);
    }

    fn approved_comment_count(&self, post_id: i64) -> i64 {
        self.comments
            .values()
            .filter(|c| c.post_id == post_id && c.status == CommentStatus::Approved)
            .count() as i64
    }

    fn record_for(&self, comment: &Comment) -> CommentRecord {
        let user_name = comment
            .commenter
            .user_id()
            .and_then(|id| self.users.get(&id))
            .map(|stored| stored.user.name.clone());
        CommentRecord {
            comment: comment.clone(),
            user_name,
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

fn matches_search(post: &Post, needle: &str, fields: SearchFields) -> bool {
    let needle = needle.to_lowercase();
    let in_title = post.title.to_lowercase().contains(&needle);
    let in_excerpt = post
        .excerpt
        .as_deref()
        .is_some_and(|e| e.to_lowercase().contains(&needle));
    match fields {
        SearchFields::TitleExcerpt => in_title || in_excerpt,
        SearchFields::TitleExcerptContent => {
            in_title || in_excerpt || post.content.to_lowercase().contains(&needle)
        }
    }
}

fn sort_posts(posts: &mut [Post], order: PostOrder) {
    match order {
        PostOrder::PublishedAtDesc => posts.sort_by(|a, b| {
            (b.published_at, b.id).cmp(&(a.published_at, a.id))
        }),
        PostOrder::CreatedAtDesc => posts.sort_by(|a, b| {
            (b.created_at, b.id).cmp(&(a.created_at, a.id))
        }),
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.state.write().unwrap();
        if !state.categories.contains_key(&input.category_id) {
            return Err(DomainError::NotFound(format!(
                "category id: {}",
                input.category_id
            )));
        }
        if !state.users.contains_key(&input.user_id) {
            return Err(DomainError::NotFound(format!("user id: {}", input.user_id)));
        }
        if state.posts.values().any(|p| p.slug == input.slug) {
            return Err(DomainError::AlreadyExists(format!("post slug: {}", input.slug)));
        }

        let now = Utc::now();
        let id = state.next_id();
        let post = Post {
            id,
            title: input.title,
            slug: input.slug,
            excerpt: input.excerpt,
            content: input.content,
            featured_image: input.featured_image,
            category_id: input.category_id,
            user_id: input.user_id,
            status: input.status,
            published_at: input.published_at,
            scheduled_at: input.scheduled_at,
            is_featured: input.is_featured,
            allow_comments: input.allow_comments,
            views_count: 0,
            comments_count: 0,
            reading_time: input.reading_time,
            meta_data: input.meta_data,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.state.read().unwrap().posts.get(&id).cloned())
    }

    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, DomainError> {
        let state = self.state.read().unwrap();
        state
            .posts
            .get(&id)
            .map(|post| state.detail_for(post))
            .transpose()
    }

    async fn get_post_detail_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<PostDetail>, DomainError> {
        let state = self.state.read().unwrap();
        state
            .posts
            .values()
            .find(|post| post.slug == slug)
            .map(|post| state.detail_for(post))
            .transpose()
    }

    async fn update_post(
        &self,
        id: i64,
        changes: PostChanges,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.state.write().unwrap();
        if state
            .posts
            .values()
            .any(|p| p.id != id && p.slug == changes.slug)
        {
            return Err(DomainError::AlreadyExists(format!(
                "post slug: {}",
                changes.slug
            )));
        }
        let Some(post) = state.posts.get_mut(&id) else {
            return Ok(None);
        };
        post.title = changes.title;
        post.slug = changes.slug;
        post.excerpt = changes.excerpt;
        post.content = changes.content;
        post.featured_image = changes.featured_image;
        post.category_id = changes.category_id;
        post.status = changes.status;
        post.published_at = changes.published_at;
        post.scheduled_at = changes.scheduled_at;
        post.is_featured = changes.is_featured;
        post.allow_comments = changes.allow_comments;
        post.reading_time = changes.reading_time;
        post.meta_data = changes.meta_data;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.state.write().unwrap();
        if !state.posts.contains_key(&id) {
            return Ok(false);
        }
        state.remove_post_cascading(id);
        Ok(true)
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, DomainError> {
        let state = self.state.read().unwrap();
        let category_id_for_slug = query
            .filter
            .category_slug
            .as_deref()
            .map(|slug| {
                state
                    .categories
                    .values()
                    .find(|c| c.slug == slug)
                    .map(|c| c.id)
            });
        let tag_id_for_slug = query
            .filter
            .tag_slug
            .as_deref()
            .map(|slug| state.tags.values().find(|t| t.slug == slug).map(|t| t.id));

        let mut matched: Vec<Post> = state
            .posts
            .values()
            .filter(|post| {
                if query.visible_only && !post.is_visible_at(query.visible_at) {
                    return false;
                }
                if let Some(status) = query.filter.status
                    && post.status != status
                {
                    return false;
                }
                if let Some(category_id) = query.filter.category_id
                    && post.category_id != category_id
                {
                    return false;
                }
                if let Some(resolved) = &category_id_for_slug {
                    match resolved {
                        Some(category_id) if post.category_id == *category_id => {}
                        _ => return false,
                    }
                }
                if let Some(resolved) = &tag_id_for_slug {
                    match resolved {
                        Some(tag_id) if state.post_tags.contains(&(post.id, *tag_id)) => {}
                        _ => return false,
                    }
                }
                if let Some(search) = &query.filter.search
                    && !matches_search(post, search, query.search_fields)
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        sort_posts(&mut matched, query.order);
        let total = matched.len() as i64;
        let items: Vec<Post> = matched
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.per_page as usize)
            .collect();

        Ok(PostPage {
            items: state.details_for(items)?,
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
        let state = self.state.read().unwrap();
        let mut matched: Vec<Post> = state
            .posts
            .values()
            .filter(|post| post.is_featured && post.is_visible_at(now))
            .cloned()
            .collect();
        sort_posts(&mut matched, PostOrder::PublishedAtDesc);
        matched.truncate(limit as usize);
        state.details_for(matched)
    }

    async fn related_posts(
        &self,
        post_id: i64,
        category_id: i64,
        tag_ids: &[i64],
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<PostDetail>, DomainError> {
        let state = self.state.read().unwrap();
        let mut matched: Vec<Post> = state
            .posts
            .values()
            .filter(|post| {
                post.id != post_id
                    && post.is_visible_at(now)
                    && (post.category_id == category_id
                        || tag_ids
                            .iter()
                            .any(|tag_id| state.post_tags.contains(&(post.id, *tag_id))))
            })
            .cloned()
            .collect();
        sort_posts(&mut matched, PostOrder::PublishedAtDesc);
        matched.truncate(limit as usize);
        state.details_for(matched)
    }

    async fn recent_posts(&self, limit: u32) -> Result<Vec<PostDetail>, DomainError> {
        let state = self.state.read().unwrap();
        let mut all: Vec<Post> = state.posts.values().cloned().collect();
        sort_posts(&mut all, PostOrder::CreatedAtDesc);
        all.truncate(limit as usize);
        state.details_for(all)
    }

    async fn slug_exists(
        &self,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state
            .posts
            .values()
            .any(|p| p.slug == slug && Some(p.id) != exclude_id))
    }

    async fn sync_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<(), DomainError> {
        let mut state = self.state.write().unwrap();
        for tag_id in tag_ids {
            if !state.tags.contains_key(tag_id) {
                return Err(DomainError::NotFound(format!("tag id: {tag_id}")));
            }
        }
        state.post_tags.retain(|(pid, _)| *pid != post_id);
        for tag_id in tag_ids {
            state.post_tags.insert((post_id, *tag_id));
        }
        Ok(())
    }

    async fn increment_views(&self, post_id: i64) -> Result<(), DomainError> {
        let mut state = self.state.write().unwrap();
        if let Some(post) = state.posts.get_mut(&post_id) {
            post.views_count += 1;
        }
        Ok(())
    }

    async fn recount_comments(&self, post_id: i64) -> Result<i32, DomainError> {
        let mut state = self.state.write().unwrap();
        let count = state.approved_comment_count(post_id) as i32;
        let Some(post) = state.posts.get_mut(&post_id) else {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        };
        post.comments_count = count;
        Ok(count)
    }

    async fn count_visible(&self, now: DateTime<Utc>) -> Result<i64, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state
            .posts
            .values()
            .filter(|p| p.is_visible_at(now))
            .count() as i64)
    }

    async fn sum_visible_views(&self, now: DateTime<Utc>) -> Result<i64, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state
            .posts
            .values()
            .filter(|p| p.is_visible_at(now))
            .map(|p| p.views_count as i64)
            .sum())
    }

    async fn count_all(&self) -> Result<i64, DomainError> {
        Ok(self.state.read().unwrap().posts.len() as i64)
    }

    async fn count_by_status(
        &self,
        status: crate::domain::post::PostStatus,
    ) -> Result<i64, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state.posts.values().filter(|p| p.status == status).count() as i64)
    }

    async fn sum_all_views(&self) -> Result<i64, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state.posts.values().map(|p| p.views_count as i64).sum())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create_category(&self, input: CategoryFields) -> Result<Category, DomainError> {
        let mut state = self.state.write().unwrap();
        if state.categories.values().any(|c| c.slug == input.slug) {
            return Err(DomainError::AlreadyExists(format!(
                "category slug: {}",
                input.slug
            )));
        }
        let now = Utc::now();
        let id = state.next_id();
        let category = Category {
            id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            color: input.color,
            icon: input.icon,
            is_active: input.is_active,
            sort_order: input.sort_order,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError> {
        Ok(self.state.read().unwrap().categories.get(&id).cloned())
    }

    async fn update_category(
        &self,
        id: i64,
        changes: CategoryFields,
    ) -> Result<Option<Category>, DomainError> {
        let mut state = self.state.write().unwrap();
        if state
            .categories
            .values()
            .any(|c| c.id != id && c.slug == changes.slug)
        {
            return Err(DomainError::AlreadyExists(format!(
                "category slug: {}",
                changes.slug
            )));
        }
        let Some(category) = state.categories.get_mut(&id) else {
            return Ok(None);
        };
        category.name = changes.name;
        category.slug = changes.slug;
        category.description = changes.description;
        category.color = changes.color;
        category.icon = changes.icon;
        category.is_active = changes.is_active;
        category.sort_order = changes.sort_order;
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: i64) -> Result<Option<u64>, DomainError> {
        let mut state = self.state.write().unwrap();
        if state.categories.remove(&id).is_none() {
            return Ok(None);
        }
        let post_ids: Vec<i64> = state
            .posts
            .values()
            .filter(|p| p.category_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in &post_ids {
            state.remove_post_cascading(*post_id);
        }
        Ok(Some(post_ids.len() as u64))
    }

    async fn list_active_categories(&self) -> Result<Vec<Category>, DomainError> {
        let state = self.state.read().unwrap();
        let mut active: Vec<Category> = state
            .categories
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }

    async fn category_facets(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<CategoryFacet>, DomainError> {
        let state = self.state.read().unwrap();
        let mut facets: Vec<CategoryFacet> = state
            .categories
            .values()
            .filter(|c| c.is_active)
            .filter_map(|category| {
                let visible_posts = state
                    .posts
                    .values()
                    .filter(|p| p.category_id == category.id && p.is_visible_at(now))
                    .count() as i64;
                (visible_posts > 0).then(|| CategoryFacet {
                    category: category.clone(),
                    visible_posts,
                })
            })
            .collect();
        facets.sort_by(|a, b| a.category.name.cmp(&b.category.name));
        Ok(facets)
    }

    async fn count_active_categories(&self) -> Result<i64, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state.categories.values().filter(|c| c.is_active).count() as i64)
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn create_tag(&self, input: TagFields) -> Result<Tag, DomainError> {
        let mut state = self.state.write().unwrap();
        if state.tags.values().any(|t| t.slug == input.slug) {
            return Err(DomainError::AlreadyExists(format!("tag slug: {}", input.slug)));
        }
        let now = Utc::now();
        let id = state.next_id();
        let tag = Tag {
            id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            color: input.color,
            created_at: now,
            updated_at: now,
        };
        state.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn update_tag(&self, id: i64, changes: TagFields) -> Result<Option<Tag>, DomainError> {
        let mut state = self.state.write().unwrap();
        if state
            .tags
            .values()
            .any(|t| t.id != id && t.slug == changes.slug)
        {
            return Err(DomainError::AlreadyExists(format!(
                "tag slug: {}",
                changes.slug
            )));
        }
        let Some(tag) = state.tags.get_mut(&id) else {
            return Ok(None);
        };
        tag.name = changes.name;
        tag.slug = changes.slug;
        tag.description = changes.description;
        tag.color = changes.color;
        tag.updated_at = Utc::now();
        Ok(Some(tag.clone()))
    }

    async fn delete_tag(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.state.write().unwrap();
        if state.tags.remove(&id).is_none() {
            return Ok(false);
        }
        state.post_tags.retain(|(_, tag_id)| *tag_id != id);
        Ok(true)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, DomainError> {
        let state = self.state.read().unwrap();
        let mut tags: Vec<Tag> = state.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_tags(&self, ids: &[i64]) -> Result<Vec<Tag>, DomainError> {
        let state = self.state.read().unwrap();
        let mut tags: Vec<Tag> = ids
            .iter()
            .filter_map(|id| state.tags.get(id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn popular_tags(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<TagFacet>, DomainError> {
        let state = self.state.read().unwrap();
        let mut facets: Vec<TagFacet> = state
            .tags
            .values()
            .filter_map(|tag| {
                let visible_posts = state
                    .post_tags
                    .iter()
                    .filter(|(post_id, tag_id)| {
                        *tag_id == tag.id
                            && state
                                .posts
                                .get(post_id)
                                .is_some_and(|p| p.is_visible_at(now))
                    })
                    .count() as i64;
                (visible_posts > 0).then(|| TagFacet {
                    tag: tag.clone(),
                    visible_posts,
                })
            })
            .collect();
        facets.sort_by(|a, b| {
            b.visible_posts
                .cmp(&a.visible_posts)
                .then_with(|| a.tag.name.cmp(&b.tag.name))
        });
        facets.truncate(limit as usize);
        Ok(facets)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.state.write().unwrap();
        if !state.posts.contains_key(&input.post_id) {
            return Err(DomainError::NotFound(format!("post id: {}", input.post_id)));
        }
        if let Some(parent_id) = input.parent_id
            && !state.comments.contains_key(&parent_id)
        {
            return Err(DomainError::NotFound(format!("comment id: {parent_id}")));
        }
        let now = Utc::now();
        let id = state.next_id();
        let comment = Comment {
            id,
            post_id: input.post_id,
            parent_id: input.parent_id,
            commenter: input.commenter,
            content: input.content,
            status: input.status,
            ip_address: input.ip_address,
            user_agent: input.user_agent,
            created_at: now,
            updated_at: now,
        };
        state.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        Ok(self.state.read().unwrap().comments.get(&id).cloned())
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.state.write().unwrap();
        if state.comments.remove(&id).is_none() {
            return Ok(false);
        }
        // Cascade to replies, transitively.
        let mut doomed = vec![id];
        while let Some(parent_id) = doomed.pop() {
            let children: Vec<i64> = state
                .comments
                .values()
                .filter(|c| c.parent_id == Some(parent_id))
                .map(|c| c.id)
                .collect();
            for child in children {
                state.comments.remove(&child);
                doomed.push(child);
            }
        }
        Ok(true)
    }

    async fn set_comment_status(
        &self,
        id: i64,
        status: CommentStatus,
    ) -> Result<Option<Comment>, DomainError> {
        let mut state = self.state.write().unwrap();
        let Some(comment) = state.comments.get_mut(&id) else {
            return Ok(None);
        };
        comment.status = status;
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn approved_comments_for_post(
        &self,
        post_id: i64,
    ) -> Result<Vec<CommentRecord>, DomainError> {
        let state = self.state.read().unwrap();
        let mut records: Vec<CommentRecord> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id && c.status == CommentStatus::Approved)
            .map(|c| state.record_for(c))
            .collect();
        records.sort_by(|a, b| {
            (b.comment.created_at, b.comment.id).cmp(&(a.comment.created_at, a.comment.id))
        });
        Ok(records)
    }

    async fn list_comments(
        &self,
        status: Option<CommentStatus>,
        page: u32,
        per_page: u32,
    ) -> Result<CommentPage, DomainError> {
        let state = self.state.read().unwrap();
        let page = page.max(1);
        let mut records: Vec<CommentRecord> = state
            .comments
            .values()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .map(|c| state.record_for(c))
            .collect();
        records.sort_by(|a, b| {
            (b.comment.created_at, b.comment.id).cmp(&(a.comment.created_at, a.comment.id))
        });
        let total = records.len() as i64;
        let items: Vec<CommentRecord> = records
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .collect();
        Ok(CommentPage {
            items,
            total,
            page,
            per_page,
        })
    }

    async fn count_comments_by_status(&self, status: CommentStatus) -> Result<i64, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state
            .comments
            .values()
            .filter(|c| c.status == status)
            .count() as i64)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.state.write().unwrap();
        if state
            .users
            .values()
            .any(|stored| stored.user.email == input.email)
        {
            return Err(DomainError::AlreadyExists(format!(
                "user email: {}",
                input.email
            )));
        }
        let id = state.next_id();
        let user = User {
            id,
            name: input.name,
            email: input.email,
            created_at: Utc::now(),
        };
        state.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash: input.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        let state = self.state.read().unwrap();
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.email == email)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }
}
