use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::post_service::AdminFilters;
use crate::domain::post::{CreatePostRequest, PostStatus, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::dto::{PostDto, PostMetaDataDto, PostPageDto};
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct AdminPostsQuery {
    pub(crate) search: Option<String>,
    pub(crate) category: Option<i64>,
    pub(crate) status: Option<String>,
    pub(crate) page: Option<u32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PostBodyDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(max = 255))]
    pub(crate) slug: Option<String>,
    #[validate(length(max = 500))]
    pub(crate) excerpt: Option<String>,
    #[validate(length(min = 1))]
    pub(crate) content: String,
    #[validate(length(max = 255))]
    pub(crate) featured_image: Option<String>,
    pub(crate) category_id: i64,
    pub(crate) status: String,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) is_featured: bool,
    #[serde(default = "default_true")]
    pub(crate) allow_comments: bool,
    pub(crate) meta_data: Option<PostMetaDataDto>,
    #[serde(default)]
    pub(crate) tags: Vec<i64>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DashboardResponseDto {
    pub(crate) total_posts: i64,
    pub(crate) published_posts: i64,
    pub(crate) draft_posts: i64,
    pub(crate) total_views: i64,
    pub(crate) approved_comments: i64,
    pub(crate) pending_comments: i64,
    pub(crate) recent_posts: Vec<PostDto>,
}

impl PostBodyDto {
    fn into_create_request(self) -> Result<CreatePostRequest, crate::domain::error::DomainError> {
        let status = PostStatus::parse(&self.status)?;
        Ok(CreatePostRequest {
            title: self.title,
            slug: self.slug,
            excerpt: self.excerpt,
            content: self.content,
            featured_image: self.featured_image,
            category_id: self.category_id,
            status,
            published_at: self.published_at,
            scheduled_at: self.scheduled_at,
            is_featured: self.is_featured,
            allow_comments: self.allow_comments,
            meta_data: self.meta_data.map(Into::into),
            tag_ids: self.tags,
        })
    }

    fn into_update_request(self) -> Result<UpdatePostRequest, crate::domain::error::DomainError> {
        let status = PostStatus::parse(&self.status)?;
        Ok(UpdatePostRequest {
            title: self.title,
            slug: self.slug,
            excerpt: self.excerpt,
            content: self.content,
            featured_image: self.featured_image,
            category_id: self.category_id,
            status,
            published_at: self.published_at,
            scheduled_at: self.scheduled_at,
            is_featured: self.is_featured,
            allow_comments: self.allow_comments,
            meta_data: self.meta_data.map(Into::into),
            tag_ids: self.tags,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/posts",
    tag = "admin-posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("search" = Option<String>, Query, description = "Substring filter over title/excerpt"),
        ("category" = Option<i64>, Query, description = "Category id filter"),
        ("status" = Option<String>, Query, description = "Exact status filter"),
        ("page" = Option<u32>, Query, description = "Page number (1-based)")
    ),
    responses(
        (status = 200, description = "Posts in any status", body = PostPageDto),
        (status = 400, description = "Unknown status value"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<AdminPostsQuery>,
) -> AppResult<Json<PostPageDto>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(PostStatus::parse)
        .transpose()?;

    let filters = AdminFilters {
        search: query.search,
        category_id: query.category,
        status,
    };
    let page = state
        .post_service
        .list_posts(filters, query.page.unwrap_or(1))
        .await?;
    Ok(Json(PostPageDto::from(page)))
}

#[utoipa::path(
    get,
    path = "/api/admin/posts/{id}",
    tag = "admin-posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDto>> {
    let detail = state.post_service.get_post(id).await?;
    Ok(Json(PostDto::from(detail)))
}

#[utoipa::path(
    post,
    path = "/api/admin/posts",
    tag = "admin-posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = PostBodyDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<PostBodyDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = dto.into_create_request()?;
    let detail = state.post_service.create_post(auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(detail))))
}

#[utoipa::path(
    put,
    path = "/api/admin/posts/{id}",
    tag = "admin-posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = PostBodyDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<PostBodyDto>,
) -> AppResult<Json<PostDto>> {
    dto.validate()?;
    let req = dto.into_update_request()?;
    let detail = state.post_service.update_post(id, req).await?;
    Ok(Json(PostDto::from(detail)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/posts/{id}",
    tag = "admin-posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.post_service.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "admin-posts",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Admin dashboard statistics", body = DashboardResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn dashboard(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardResponseDto>> {
    let posts = state.post_service.dashboard_stats().await?;
    let comments = state.comment_service.moderation_stats().await?;

    Ok(Json(DashboardResponseDto {
        total_posts: posts.total_posts,
        published_posts: posts.published_posts,
        draft_posts: posts.draft_posts,
        total_views: posts.total_views,
        approved_comments: comments.approved_comments,
        pending_comments: comments.pending_comments,
        recent_posts: posts.recent_posts.into_iter().map(PostDto::from).collect(),
    }))
}
