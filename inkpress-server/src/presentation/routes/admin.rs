use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, patch, put};

use crate::presentation::AppState;
use crate::presentation::handlers::{comments, posts, taxonomy};
use crate::presentation::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(posts::dashboard))
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/comments", get(comments::list_comments))
        .route("/comments/{id}", delete(comments::delete))
        .route("/comments/{id}/status", patch(comments::moderate))
        .route(
            "/categories",
            get(taxonomy::list_categories).post(taxonomy::create_category),
        )
        .route(
            "/categories/{id}",
            put(taxonomy::update_category).delete(taxonomy::delete_category),
        )
        .route("/tags", get(taxonomy::list_tags).post(taxonomy::create_tag))
        .route(
            "/tags/{id}",
            put(taxonomy::update_tag).delete(taxonomy::delete_tag),
        )
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
