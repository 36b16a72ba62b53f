use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::category::CategoryInput;
use crate::domain::tag::TagInput;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::dto::{CategoryDto, TagDto};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CategoryBodyDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) name: String,
    #[validate(length(max = 255))]
    pub(crate) slug: Option<String>,
    #[validate(length(max = 500))]
    pub(crate) description: Option<String>,
    #[validate(length(max = 32))]
    pub(crate) color: Option<String>,
    #[validate(length(max = 64))]
    pub(crate) icon: Option<String>,
    #[serde(default = "default_true")]
    pub(crate) is_active: bool,
    #[serde(default)]
    pub(crate) sort_order: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct TagBodyDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) name: String,
    #[validate(length(max = 255))]
    pub(crate) slug: Option<String>,
    #[validate(length(max = 500))]
    pub(crate) description: Option<String>,
    #[validate(length(max = 32))]
    pub(crate) color: Option<String>,
}

fn default_true() -> bool {
    true
}

impl From<CategoryBodyDto> for CategoryInput {
    fn from(dto: CategoryBodyDto) -> Self {
        Self {
            name: dto.name,
            slug: dto.slug,
            description: dto.description,
            color: dto.color,
            icon: dto.icon,
            is_active: dto.is_active,
            sort_order: dto.sort_order,
        }
    }
}

impl From<TagBodyDto> for TagInput {
    fn from(dto: TagBodyDto) -> Self {
        Self {
            name: dto.name,
            slug: dto.slug,
            description: dto.description,
            color: dto.color,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/categories",
    tag = "taxonomy",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Active categories ordered by name", body = [CategoryDto]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategoryDto>>> {
    let categories = state.taxonomy_service.list_categories().await?;
    Ok(Json(categories.into_iter().map(CategoryDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    tag = "taxonomy",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CategoryBodyDto,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_category(
    State(state): State<AppState>,
    Json(dto): Json<CategoryBodyDto>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    dto.validate()?;
    let category = state.taxonomy_service.create_category(dto.into()).await?;
    Ok((StatusCode::CREATED, Json(CategoryDto::from(category))))
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    tag = "taxonomy",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    request_body = CategoryBodyDto,
    responses(
        (status = 200, description = "Category updated", body = CategoryDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<CategoryBodyDto>,
) -> AppResult<Json<CategoryDto>> {
    dto.validate()?;
    let category = state
        .taxonomy_service
        .update_category(id, dto.into())
        .await?;
    Ok(Json(CategoryDto::from(category)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    tag = "taxonomy",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    responses(
        (status = 204, description = "Category deleted along with its posts"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.taxonomy_service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/tags",
    tag = "taxonomy",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All tags ordered by name", body = [TagDto]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_tags(State(state): State<AppState>) -> AppResult<Json<Vec<TagDto>>> {
    let tags = state.taxonomy_service.list_tags().await?;
    Ok(Json(tags.into_iter().map(TagDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/tags",
    tag = "taxonomy",
    security(
        ("bearer_auth" = [])
    ),
    request_body = TagBodyDto,
    responses(
        (status = 201, description = "Tag created", body = TagDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_tag(
    State(state): State<AppState>,
    Json(dto): Json<TagBodyDto>,
) -> AppResult<(StatusCode, Json<TagDto>)> {
    dto.validate()?;
    let tag = state.taxonomy_service.create_tag(dto.into()).await?;
    Ok((StatusCode::CREATED, Json(TagDto::from(tag))))
}

#[utoipa::path(
    put,
    path = "/api/admin/tags/{id}",
    tag = "taxonomy",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Tag id")
    ),
    request_body = TagBodyDto,
    responses(
        (status = 200, description = "Tag updated", body = TagDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tag not found"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<TagBodyDto>,
) -> AppResult<Json<TagDto>> {
    dto.validate()?;
    let tag = state.taxonomy_service.update_tag(id, dto.into()).await?;
    Ok(Json(TagDto::from(tag)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/tags/{id}",
    tag = "taxonomy",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Tag id")
    ),
    responses(
        (status = 204, description = "Tag deleted; posts keep their other tags"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tag not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.taxonomy_service.delete_tag(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
