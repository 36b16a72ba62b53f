use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

pub(crate) const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum CommentStatus {
    Pending,
    Approved,
    Spam,
    Rejected,
}

impl CommentStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Spam => "spam",
            CommentStatus::Rejected => "rejected",
        }
    }

    pub(crate) fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "pending" => Ok(CommentStatus::Pending),
            "approved" => Ok(CommentStatus::Approved),
            "spam" => Ok(CommentStatus::Spam),
            "rejected" => Ok(CommentStatus::Rejected),
            _ => Err(DomainError::Validation {
                field: "status",
                message: "must be one of: pending, approved, spam, rejected",
            }),
        }
    }
}

/// Who wrote a comment: a registered user or a guest with inline identity.
/// The "exactly one of the two" invariant is structural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) enum Commenter {
    Registered {
        user_id: i64,
    },
    Guest {
        name: String,
        email: String,
        website: Option<String>,
    },
}

impl Commenter {
    /// Rebuilds the union from the four nullable storage columns.
    pub(crate) fn from_columns(
        user_id: Option<i64>,
        author_name: Option<String>,
        author_email: Option<String>,
        author_website: Option<String>,
    ) -> Result<Self, DomainError> {
        match (user_id, author_name, author_email) {
            (Some(user_id), None, None) => Ok(Commenter::Registered { user_id }),
            (None, Some(name), Some(email)) => Ok(Commenter::Guest {
                name,
                email,
                website: author_website,
            }),
            _ => Err(DomainError::Unexpected(
                "comment row identifies neither a user nor a guest".to_string(),
            )),
        }
    }

    pub(crate) fn user_id(&self) -> Option<i64> {
        match self {
            Commenter::Registered { user_id } => Some(*user_id),
            Commenter::Guest { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) parent_id: Option<i64>,
    pub(crate) commenter: Commenter,
    pub(crate) content: String,
    pub(crate) status: CommentStatus,
    pub(crate) ip_address: Option<String>,
    pub(crate) user_agent: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// A comment joined with the linked user's name, when there is one.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CommentRecord {
    pub(crate) comment: Comment,
    pub(crate) user_name: Option<String>,
}

impl CommentRecord {
    /// Linked user's name, else the stored guest name, else a literal
    /// fallback. Pure resolution, no side effects.
    pub(crate) fn display_name(&self) -> String {
        match &self.comment.commenter {
            Commenter::Registered { .. } => self
                .user_name
                .clone()
                .unwrap_or_else(|| ANONYMOUS_DISPLAY_NAME.to_string()),
            Commenter::Guest { name, .. } => {
                if name.is_empty() {
                    ANONYMOUS_DISPLAY_NAME.to_string()
                } else {
                    name.clone()
                }
            }
        }
    }
}

/// A top-level comment with its direct replies, both newest first.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CommentNode {
    pub(crate) record: CommentRecord,
    pub(crate) replies: Vec<CommentRecord>,
}

/// Assembles the two-level public tree from a flat list of approved
/// comments.
///
/// Replies deeper than one level attach to the direct-reply list of their
/// nearest top-level ancestor; a reply whose ancestor chain does not reach a
/// comment in the list (parent unapproved or deleted) is dropped.
pub(crate) fn build_comment_tree(records: Vec<CommentRecord>) -> Vec<CommentNode> {
    let parent_of: HashMap<i64, Option<i64>> = records
        .iter()
        .map(|record| (record.comment.id, record.comment.parent_id))
        .collect();

    let mut tops: Vec<CommentNode> = Vec::new();
    let mut replies_by_top: HashMap<i64, Vec<CommentRecord>> = HashMap::new();

    for record in records {
        match record.comment.parent_id {
            None => tops.push(CommentNode {
                record,
                replies: Vec::new(),
            }),
            Some(parent_id) => {
                if let Some(top_id) = resolve_top_ancestor(&parent_of, parent_id) {
                    replies_by_top.entry(top_id).or_default().push(record);
                }
            }
        }
    }

    for node in &mut tops {
        if let Some(mut replies) = replies_by_top.remove(&node.record.comment.id) {
            sort_newest_first(&mut replies);
            node.replies = replies;
        }
    }
    tops.sort_by(|a, b| {
        (b.record.comment.created_at, b.record.comment.id)
            .cmp(&(a.record.comment.created_at, a.record.comment.id))
    });
    tops
}

fn resolve_top_ancestor(parent_of: &HashMap<i64, Option<i64>>, mut id: i64) -> Option<i64> {
    // Hop budget bounds the walk in case of a corrupt parent cycle.
    let mut hops = parent_of.len() + 1;
    loop {
        match parent_of.get(&id)? {
            None => return Some(id),
            Some(parent) => {
                id = *parent;
                hops -= 1;
                if hops == 0 {
                    return None;
                }
            }
        }
    }
}

fn sort_newest_first(records: &mut [CommentRecord]) {
    records.sort_by(|a, b| {
        (b.comment.created_at, b.comment.id).cmp(&(a.comment.created_at, a.comment.id))
    });
}

#[derive(Debug, Clone)]
pub(crate) struct SubmitCommentRequest {
    pub(crate) commenter: Commenter,
    pub(crate) content: String,
    pub(crate) parent_id: Option<i64>,
    pub(crate) ip_address: Option<String>,
    pub(crate) user_agent: Option<String>,
}

impl SubmitCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let content = self.content.trim();
        if content.is_empty() || content.len() > 2000 {
            return Err(DomainError::Validation {
                field: "content",
                message: "must be 1..2000 chars",
            });
        }
        let commenter = match self.commenter {
            Commenter::Registered { user_id } => {
                if user_id <= 0 {
                    return Err(DomainError::Validation {
                        field: "user_id",
                        message: "must be > 0",
                    });
                }
                Commenter::Registered { user_id }
            }
            Commenter::Guest {
                name,
                email,
                website,
            } => {
                let name = name.trim().to_string();
                if name.is_empty() || name.len() > 255 {
                    return Err(DomainError::Validation {
                        field: "author_name",
                        message: "must be 1..255 chars",
                    });
                }
                let email = email.trim().to_lowercase();
                if !email.validate_email() {
                    return Err(DomainError::Validation {
                        field: "author_email",
                        message: "must be a valid email",
                    });
                }
                Commenter::Guest {
                    name,
                    email,
                    website: website.filter(|w| !w.trim().is_empty()),
                }
            }
        };
        Ok(Self {
            commenter,
            content: content.to_string(),
            parent_id: self.parent_id,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn record(id: i64, parent_id: Option<i64>, minutes_ago: i64) -> CommentRecord {
        let created_at = Utc::now() - Duration::minutes(minutes_ago);
        CommentRecord {
            comment: Comment {
                id,
                post_id: 1,
                parent_id,
                commenter: Commenter::Guest {
                    name: format!("guest-{id}"),
                    email: format!("guest-{id}@example.com"),
                    website: None,
                },
                content: "hello".to_string(),
                status: CommentStatus::Approved,
                ip_address: None,
                user_agent: None,
                created_at,
                updated_at: created_at,
            },
            user_name: None,
        }
    }

    #[test]
    fn tree_orders_both_levels_newest_first() {
        let records = vec![
            record(1, None, 60),
            record(2, None, 10),
            record(3, Some(1), 30),
            record(4, Some(1), 5),
        ];
        let tree = build_comment_tree(records);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].record.comment.id, 2);
        assert_eq!(tree[1].record.comment.id, 1);

        let replies: Vec<i64> = tree[1].replies.iter().map(|r| r.comment.id).collect();
        assert_eq!(replies, vec![4, 3]);
    }

    #[test]
    fn deep_replies_flatten_to_the_top_ancestor() {
        let records = vec![
            record(1, None, 60),
            record(2, Some(1), 40),
            record(3, Some(2), 20),
            record(4, Some(3), 10),
        ];
        let tree = build_comment_tree(records);

        assert_eq!(tree.len(), 1);
        let replies: Vec<i64> = tree[0].replies.iter().map(|r| r.comment.id).collect();
        assert_eq!(replies, vec![4, 3, 2]);
    }

    #[test]
    fn reply_with_missing_ancestor_is_dropped() {
        // Parent 99 is not in the approved set.
        let records = vec![record(1, None, 60), record(2, Some(99), 10)];
        let tree = build_comment_tree(records);

        assert_eq!(tree.len(), 1);
        assert!(tree[0].replies.is_empty());
    }

    #[test]
    fn commenter_from_columns_enforces_exactly_one_identity() {
        assert!(matches!(
            Commenter::from_columns(Some(7), None, None, None),
            Ok(Commenter::Registered { user_id: 7 })
        ));
        assert!(
            Commenter::from_columns(
                None,
                Some("Ann".to_string()),
                Some("ann@example.com".to_string()),
                None
            )
            .is_ok()
        );
        assert!(Commenter::from_columns(None, None, None, None).is_err());
        assert!(
            Commenter::from_columns(
                Some(7),
                Some("Ann".to_string()),
                Some("ann@example.com".to_string()),
                None
            )
            .is_err()
        );
    }

    #[test]
    fn display_name_resolution_order() {
        let mut registered = record(1, None, 0);
        registered.comment.commenter = Commenter::Registered { user_id: 5 };
        registered.user_name = Some("Max".to_string());
        assert_eq!(registered.display_name(), "Max");

        registered.user_name = None;
        assert_eq!(registered.display_name(), ANONYMOUS_DISPLAY_NAME);

        let guest = record(2, None, 0);
        assert_eq!(guest.display_name(), "guest-2");
    }

    #[test]
    fn submit_request_validates_guest_identity() {
        let req = SubmitCommentRequest {
            commenter: Commenter::Guest {
                name: "  ".to_string(),
                email: "ann@example.com".to_string(),
                website: None,
            },
            content: "nice post".to_string(),
            parent_id: None,
            ip_address: None,
            user_agent: None,
        };
        let err = req.validate().expect_err("blank guest name must fail");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "author_name",
                ..
            }
        ));
    }

    #[test]
    fn submit_request_rejects_empty_content() {
        let req = SubmitCommentRequest {
            commenter: Commenter::Registered { user_id: 1 },
            content: "   ".to_string(),
            parent_id: None,
            ip_address: None,
            user_agent: None,
        };
        assert!(req.validate().is_err());
    }
}
