//! Publication lifecycle rules for posts.
//!
//! Status resolution, slug derivation and reading-time estimation are
//! explicit pure functions invoked by the create/update operations, so the
//! whole lifecycle is testable without a storage layer.

use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::post::PostStatus;

/// The (status, published_at, scheduled_at) triple the state machine
/// operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PublicationState {
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) scheduled_at: Option<DateTime<Utc>>,
}

/// Resolves a requested status change against the previous state.
///
/// - `-> published`: stamps `published_at = now` unless the caller supplied
///   one (backdating allowed) or the post was already published, in which
///   case the original timestamp is kept.
/// - `-> scheduled`: forces `published_at` to null and requires a strictly
///   future `scheduled_at`.
/// - `-> draft`: forces both timestamps to null.
pub(crate) fn resolve_publication(
    previous: Option<&PublicationState>,
    requested: PublicationState,
    now: DateTime<Utc>,
) -> Result<PublicationState, DomainError> {
    match requested.status {
        PostStatus::Draft => Ok(PublicationState {
            status: PostStatus::Draft,
            published_at: None,
            scheduled_at: None,
        }),
        PostStatus::Scheduled => {
            let scheduled_at = requested
                .scheduled_at
                .ok_or(DomainError::InvalidTransition(
                    "scheduled posts require scheduled_at",
                ))?;
            if scheduled_at <= now {
                return Err(DomainError::InvalidTransition(
                    "scheduled_at must be strictly in the future",
                ));
            }
            Ok(PublicationState {
                status: PostStatus::Scheduled,
                published_at: None,
                scheduled_at: Some(scheduled_at),
            })
        }
        PostStatus::Published => {
            if let Some(scheduled_at) = requested.scheduled_at
                && scheduled_at <= now
            {
                return Err(DomainError::Validation {
                    field: "scheduled_at",
                    message: "must be in the future",
                });
            }
            let kept = previous
                .filter(|prev| prev.status == PostStatus::Published)
                .and_then(|prev| prev.published_at);
            Ok(PublicationState {
                status: PostStatus::Published,
                published_at: requested.published_at.or(kept).or(Some(now)),
                scheduled_at: requested.scheduled_at,
            })
        }
    }
}

/// The public visibility predicate: published with a publish timestamp at or
/// before `now`. A published post with a future or missing timestamp is not
/// visible.
pub(crate) fn is_visible_at(
    status: PostStatus,
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    status == PostStatus::Published && published_at.is_some_and(|at| at <= now)
}

/// Derives a URL-safe, lowercase, hyphen-separated slug.
pub(crate) fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Estimated reading time in minutes at 200 words per minute, never below 1.
pub(crate) fn reading_time_minutes(content: &str) -> i32 {
    let words = strip_markup(content).split_whitespace().count();
    (words.div_ceil(200)).max(1) as i32
}

// Markup tags are removed without inserting whitespace, matching how the
// word count behaved in the original data.
fn strip_markup(content: &str) -> String {
    let mut text = String::with_capacity(content.len());
    let mut in_tag = false;
    for ch in content.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn state(
        status: PostStatus,
        published_at: Option<DateTime<Utc>>,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> PublicationState {
        PublicationState {
            status,
            published_at,
            scheduled_at,
        }
    }

    #[test]
    fn slugify_is_deterministic_and_url_safe() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust & Axum: 2024!  "), "rust-axum-2024");
        assert_eq!(slugify("___"), "");
        let slug = slugify("Ünïcode — stripped?");
        assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        );
    }

    #[test]
    fn reading_time_rounds_up_and_floors_at_one() {
        let four_hundred_words = "word ".repeat(400);
        assert_eq!(reading_time_minutes(&four_hundred_words), 2);
        assert_eq!(reading_time_minutes("word"), 1);
        assert_eq!(reading_time_minutes(""), 1);
        let two_hundred_one = "word ".repeat(201);
        assert_eq!(reading_time_minutes(&two_hundred_one), 2);
    }

    #[test]
    fn reading_time_ignores_markup() {
        let content = format!("<article><h1>Title</h1><p>{}</p></article>", "w ".repeat(250));
        assert_eq!(reading_time_minutes(&content), 2);
    }

    #[test]
    fn publishing_without_timestamp_stamps_now() {
        let now = Utc::now();
        let resolved = resolve_publication(
            None,
            state(PostStatus::Published, None, None),
            now,
        )
        .expect("must resolve");
        assert_eq!(resolved.published_at, Some(now));
        assert_eq!(resolved.scheduled_at, None);
    }

    #[test]
    fn publishing_with_explicit_backdate_is_kept() {
        let now = Utc::now();
        let backdate = now - Duration::days(7);
        let resolved = resolve_publication(
            None,
            state(PostStatus::Published, Some(backdate), None),
            now,
        )
        .expect("must resolve");
        assert_eq!(resolved.published_at, Some(backdate));
    }

    #[test]
    fn republishing_keeps_the_original_timestamp() {
        let now = Utc::now();
        let original = now - Duration::days(3);
        let previous = state(PostStatus::Published, Some(original), None);
        let resolved = resolve_publication(
            Some(&previous),
            state(PostStatus::Published, None, None),
            now,
        )
        .expect("must resolve");
        assert_eq!(resolved.published_at, Some(original));
    }

    #[test]
    fn scheduling_requires_a_future_timestamp() {
        let now = Utc::now();
        let err = resolve_publication(
            None,
            state(PostStatus::Scheduled, None, Some(now - Duration::minutes(1))),
            now,
        )
        .expect_err("past scheduled_at must fail");
        assert!(matches!(err, DomainError::InvalidTransition(_)));

        let err = resolve_publication(None, state(PostStatus::Scheduled, None, None), now)
            .expect_err("missing scheduled_at must fail");
        assert!(matches!(err, DomainError::InvalidTransition(_)));
    }

    #[test]
    fn scheduling_forces_published_at_to_null() {
        let now = Utc::now();
        let future = now + Duration::hours(2);
        let resolved = resolve_publication(
            None,
            state(PostStatus::Scheduled, Some(now), Some(future)),
            now,
        )
        .expect("must resolve");
        assert_eq!(resolved.published_at, None);
        assert_eq!(resolved.scheduled_at, Some(future));
    }

    #[test]
    fn drafting_clears_both_timestamps() {
        let now = Utc::now();
        let previous = state(PostStatus::Published, Some(now), None);
        let resolved = resolve_publication(
            Some(&previous),
            state(
                PostStatus::Draft,
                Some(now),
                Some(now + Duration::hours(1)),
            ),
            now,
        )
        .expect("must resolve");
        assert_eq!(resolved.published_at, None);
        assert_eq!(resolved.scheduled_at, None);
    }

    #[test]
    fn visibility_boundary_is_inclusive() {
        let now = Utc::now();
        assert!(is_visible_at(PostStatus::Published, Some(now), now));
        assert!(!is_visible_at(
            PostStatus::Published,
            Some(now + Duration::seconds(1)),
            now
        ));
        assert!(!is_visible_at(PostStatus::Published, None, now));
        assert!(!is_visible_at(PostStatus::Draft, Some(now), now));
        assert!(!is_visible_at(PostStatus::Scheduled, Some(now), now));
    }
}
