pub(crate) mod auth_service;
pub(crate) mod blog_service;
pub(crate) mod comment_service;
pub(crate) mod post_service;
pub(crate) mod taxonomy_service;

#[cfg(test)]
pub(crate) mod test_fixtures;
