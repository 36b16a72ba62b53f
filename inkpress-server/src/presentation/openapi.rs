use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto, UserDto};
use crate::presentation::handlers::blog::{
    BlogFiltersDto, BlogIndexQuery, BlogIndexResponseDto, BlogPostResponseDto, PublicStatsDto,
};
use crate::presentation::handlers::comments::{
    CommentPageDto, CommentQueueQuery, ModerateCommentDto, SubmitCommentDto,
};
use crate::presentation::handlers::dto::{
    CategoryDto, CategoryFacetDto, CommentDto, CommentNodeDto, PostDto, PostMetaDataDto,
    PostPageDto, TagDto, TagFacetDto,
};
use crate::presentation::handlers::posts::{AdminPostsQuery, DashboardResponseDto, PostBodyDto};
use crate::presentation::handlers::taxonomy::{CategoryBodyDto, TagBodyDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::blog::index,
        crate::presentation::handlers::blog::show,
        crate::presentation::handlers::blog::public_stats,
        crate::presentation::handlers::comments::submit,
        crate::presentation::handlers::comments::list_comments,
        crate::presentation::handlers::comments::moderate,
        crate::presentation::handlers::comments::delete,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::posts::dashboard,
        crate::presentation::handlers::taxonomy::list_categories,
        crate::presentation::handlers::taxonomy::create_category,
        crate::presentation::handlers::taxonomy::update_category,
        crate::presentation::handlers::taxonomy::delete_category,
        crate::presentation::handlers::taxonomy::list_tags,
        crate::presentation::handlers::taxonomy::create_tag,
        crate::presentation::handlers::taxonomy::update_tag,
        crate::presentation::handlers::taxonomy::delete_tag
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            UserDto,
            BlogIndexQuery,
            BlogIndexResponseDto,
            BlogFiltersDto,
            BlogPostResponseDto,
            PublicStatsDto,
            SubmitCommentDto,
            ModerateCommentDto,
            CommentQueueQuery,
            CommentPageDto,
            CommentDto,
            CommentNodeDto,
            AdminPostsQuery,
            PostBodyDto,
            DashboardResponseDto,
            PostDto,
            PostPageDto,
            PostMetaDataDto,
            CategoryBodyDto,
            CategoryDto,
            CategoryFacetDto,
            TagBodyDto,
            TagDto,
            TagFacetDto
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "blog", description = "Public blog endpoints"),
        (name = "comments", description = "Comment submission and moderation"),
        (name = "admin-posts", description = "Admin post management"),
        (name = "taxonomy", description = "Category and tag management")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
