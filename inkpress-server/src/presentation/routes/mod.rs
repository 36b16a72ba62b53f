use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::blog;

pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod public;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api/blog", public::router())
        .route("/api/stats", get(blog::public_stats))
        .nest("/api/admin", admin::router(state))
}
