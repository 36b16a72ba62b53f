use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::application::blog_service::PublicFilters;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::dto::{
    CategoryFacetDto, CommentNodeDto, PostDto, PostPageDto, TagFacetDto,
};
use crate::presentation::middleware::auth::optional_user;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct BlogIndexQuery {
    pub(crate) search: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) tag: Option<String>,
    pub(crate) page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct BlogFiltersDto {
    pub(crate) search: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) tag: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct BlogIndexResponseDto {
    pub(crate) posts: PostPageDto,
    pub(crate) featured_posts: Vec<PostDto>,
    pub(crate) categories: Vec<CategoryFacetDto>,
    pub(crate) popular_tags: Vec<TagFacetDto>,
    /// Echoed back so the client can round-trip the active filter set in
    /// pagination links.
    pub(crate) filters: BlogFiltersDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct BlogPostResponseDto {
    pub(crate) post: PostDto,
    pub(crate) related_posts: Vec<PostDto>,
    pub(crate) comments: Vec<CommentNodeDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PublicStatsDto {
    pub(crate) posts_count: i64,
    pub(crate) categories_count: i64,
    pub(crate) views_count: i64,
}

#[utoipa::path(
    get,
    path = "/api/blog",
    tag = "blog",
    params(
        ("search" = Option<String>, Query, description = "Substring filter over title/excerpt/content"),
        ("category" = Option<String>, Query, description = "Category slug filter"),
        ("tag" = Option<String>, Query, description = "Tag slug filter"),
        ("page" = Option<u32>, Query, description = "Page number (1-based)")
    ),
    responses(
        (status = 200, description = "Published posts with facets", body = BlogIndexResponseDto),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn index(
    State(state): State<AppState>,
    Query(query): Query<BlogIndexQuery>,
) -> AppResult<Json<BlogIndexResponseDto>> {
    let filters = PublicFilters {
        search: query.search.clone(),
        category: query.category.clone(),
        tag: query.tag.clone(),
    };
    let listing = state
        .blog_service
        .list_posts(filters, query.page.unwrap_or(1))
        .await?;

    Ok(Json(BlogIndexResponseDto {
        posts: PostPageDto::from(listing.page),
        featured_posts: listing.featured.into_iter().map(PostDto::from).collect(),
        categories: listing
            .categories
            .into_iter()
            .map(CategoryFacetDto::from)
            .collect(),
        popular_tags: listing
            .popular_tags
            .into_iter()
            .map(TagFacetDto::from)
            .collect(),
        filters: BlogFiltersDto {
            search: query.search,
            category: query.category,
            tag: query.tag,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/blog/{slug}",
    tag = "blog",
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "Post with related posts and comments", body = BlogPostResponseDto),
        (status = 404, description = "Post not found or not visible"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> AppResult<Json<BlogPostResponseDto>> {
    // Authenticated authors may preview hidden posts.
    let include_hidden = optional_user(&state, &headers).is_some();
    let detail = state.blog_service.get_post(&slug, include_hidden).await?;

    if let Err(err) = state.blog_service.increment_views(detail.post.id).await {
        warn!(post_id = detail.post.id, error = %err, "view counter bump failed");
    }

    let related = state.blog_service.related_posts(&detail).await?;
    let comments = state.comment_service.approved_tree(detail.post.id).await?;

    Ok(Json(BlogPostResponseDto {
        post: PostDto::from(detail),
        related_posts: related.into_iter().map(PostDto::from).collect(),
        comments: comments.into_iter().map(CommentNodeDto::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "blog",
    responses(
        (status = 200, description = "Public blog statistics", body = PublicStatsDto),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn public_stats(
    State(state): State<AppState>,
) -> AppResult<Json<PublicStatsDto>> {
    let stats = state.blog_service.public_stats().await?;
    Ok(Json(PublicStatsDto {
        posts_count: stats.published_posts,
        categories_count: stats.active_categories,
        views_count: stats.total_views,
    }))
}
