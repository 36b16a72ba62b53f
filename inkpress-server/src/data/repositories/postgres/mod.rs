pub(crate) mod category_repository;
pub(crate) mod comment_repository;
pub(crate) mod post_repository;
pub(crate) mod tag_repository;
pub(crate) mod user_repository;

use crate::domain::error::DomainError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub(super) fn map_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return DomainError::AlreadyExists(
                    db_err.constraint().unwrap_or("unique value").to_string(),
                );
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return DomainError::NotFound(
                    db_err.constraint().unwrap_or("referenced row").to_string(),
                );
            }
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}

// ILIKE patterns treat %, _ and \ literally when they come from user input.
pub(super) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("kubernetes"), "%kubernetes%");
        assert_eq!(like_pattern("100%_done"), "%100\\%\\_done%");
    }
}
