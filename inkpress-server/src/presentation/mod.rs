use std::sync::Arc;

use sqlx::PgPool;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::application::taxonomy_service::TaxonomyService;
use crate::data::repositories::postgres::category_repository::PostgresCategoryRepository;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::tag_repository::PostgresTagRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

type PgBlogService =
    BlogService<PostgresPostRepository, PostgresCategoryRepository, PostgresTagRepository>;
type PgPostService =
    PostService<PostgresPostRepository, PostgresCategoryRepository, PostgresTagRepository>;
type PgCommentService = CommentService<PostgresPostRepository, PostgresCommentRepository>;
type PgTaxonomyService = TaxonomyService<PostgresCategoryRepository, PostgresTagRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) blog_service: Arc<PgBlogService>,
    pub(crate) post_service: Arc<PgPostService>,
    pub(crate) comment_service: Arc<PgCommentService>,
    pub(crate) taxonomy_service: Arc<PgTaxonomyService>,
    pub(crate) auth_service: Arc<AuthService<PostgresUserRepository>>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(pool: PgPool, jwt: JwtService) -> Self {
        let posts = PostgresPostRepository::new(pool.clone());
        let categories = PostgresCategoryRepository::new(pool.clone());
        let tags = PostgresTagRepository::new(pool.clone());
        let comments = PostgresCommentRepository::new(pool.clone());
        let users = PostgresUserRepository::new(pool);

        let auth_jwt = jwt.clone();
        let jwt = Arc::new(jwt);
        Self {
            blog_service: Arc::new(BlogService::new(
                posts.clone(),
                categories.clone(),
                tags.clone(),
            )),
            post_service: Arc::new(PostService::new(
                posts.clone(),
                categories.clone(),
                tags.clone(),
            )),
            comment_service: Arc::new(CommentService::new(posts, comments)),
            taxonomy_service: Arc::new(TaxonomyService::new(categories, tags)),
            auth_service: Arc::new(AuthService::new(users, auth_jwt)),
            jwt,
        }
    }
}
