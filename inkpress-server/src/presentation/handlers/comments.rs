use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::comment::{CommentStatus, Commenter, SubmitCommentRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::dto::CommentDto;
use crate::presentation::middleware::auth::optional_user;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct SubmitCommentDto {
    #[validate(length(min = 1, max = 2000))]
    pub(crate) content: String,
    pub(crate) parent_id: Option<i64>,
    /// Guest identity; ignored when a valid bearer token is presented.
    #[validate(length(max = 255))]
    pub(crate) author_name: Option<String>,
    #[validate(email)]
    pub(crate) author_email: Option<String>,
    #[validate(length(max = 255))]
    pub(crate) author_website: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ModerateCommentDto {
    pub(crate) status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CommentQueueQuery {
    pub(crate) status: Option<String>,
    pub(crate) page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentPageDto {
    pub(crate) comments: Vec<CommentDto>,
    pub(crate) page: u32,
    pub(crate) per_page: u32,
    pub(crate) total: i64,
}

#[utoipa::path(
    post,
    path = "/api/blog/{slug}/comments",
    tag = "comments",
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    request_body = SubmitCommentDto,
    responses(
        (status = 201, description = "Comment submitted for moderation", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Post not found or not visible"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn submit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(dto): Json<SubmitCommentDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    dto.validate()?;

    let user = optional_user(&state, &headers);
    let commenter = match &user {
        Some(user) => Commenter::Registered {
            user_id: user.user_id,
        },
        None => Commenter::Guest {
            name: dto.author_name.unwrap_or_default(),
            email: dto.author_email.unwrap_or_default(),
            website: dto.author_website,
        },
    };

    let req = SubmitCommentRequest {
        commenter,
        content: dto.content,
        parent_id: dto.parent_id,
        ip_address: client_ip(&headers),
        user_agent: header_value(&headers, header::USER_AGENT),
    };
    let comment = state.comment_service.submit_comment(&slug, req).await?;
    let record = crate::domain::comment::CommentRecord {
        comment,
        user_name: user.map(|u| u.name),
    };

    Ok((StatusCode::CREATED, Json(CommentDto::from(record))))
}

#[utoipa::path(
    get,
    path = "/api/admin/comments",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("status" = Option<String>, Query, description = "Filter by moderation status"),
        ("page" = Option<u32>, Query, description = "Page number (1-based)")
    ),
    responses(
        (status = 200, description = "Moderation queue", body = CommentPageDto),
        (status = 400, description = "Unknown status value"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<CommentQueueQuery>,
) -> AppResult<Json<CommentPageDto>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(CommentStatus::parse)
        .transpose()?;

    let page = state
        .comment_service
        .list_comments(status, query.page.unwrap_or(1))
        .await?;

    Ok(Json(CommentPageDto {
        comments: page.items.into_iter().map(CommentDto::from).collect(),
        page: page.page,
        per_page: page.per_page,
        total: page.total,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/admin/comments/{id}/status",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    request_body = ModerateCommentDto,
    responses(
        (status = 200, description = "Comment moderated", body = CommentDto),
        (status = 400, description = "Unknown status value"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn moderate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<ModerateCommentDto>,
) -> AppResult<Json<CommentDto>> {
    let status = CommentStatus::parse(&dto.status)?;
    let comment = state.comment_service.moderate_comment(id, status).await?;
    let record = crate::domain::comment::CommentRecord {
        comment,
        user_name: None,
    };
    Ok(Json(CommentDto::from(record)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment deleted along with its replies"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.comment_service.delete_comment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers.get("x-forwarded-for")?.to_str().ok()?;
    forwarded
        .split(',')
        .next()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
