//! Response DTOs shared by the public blog and the admin surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::post_query::PostPage;
use crate::domain::category::{Category, CategoryFacet};
use crate::domain::comment::{CommentNode, CommentRecord, Commenter};
use crate::domain::post::{PostDetail, PostMetaData};
use crate::domain::tag::{Tag, TagFacet};

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TagDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
}

impl From<Tag> for TagDto {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
            description: tag.description,
            color: tag.color,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TagFacetDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) color: Option<String>,
    pub(crate) posts_count: i64,
}

impl From<TagFacet> for TagFacetDto {
    fn from(facet: TagFacet) -> Self {
        Self {
            id: facet.tag.id,
            name: facet.tag.name,
            slug: facet.tag.slug,
            color: facet.tag.color,
            posts_count: facet.visible_posts,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
    pub(crate) icon: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) sort_order: i32,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            color: category.color,
            icon: category.icon,
            is_active: category.is_active,
            sort_order: category.sort_order,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryFacetDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) color: Option<String>,
    pub(crate) icon: Option<String>,
    pub(crate) posts_count: i64,
}

impl From<CategoryFacet> for CategoryFacetDto {
    fn from(facet: CategoryFacet) -> Self {
        Self {
            id: facet.category.id,
            name: facet.category.name,
            slug: facet.category.slug,
            color: facet.category.color,
            icon: facet.category.icon,
            posts_count: facet.visible_posts,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct PostMetaDataDto {
    pub(crate) meta_title: Option<String>,
    pub(crate) meta_description: Option<String>,
    pub(crate) meta_keywords: Option<String>,
    pub(crate) og_title: Option<String>,
    pub(crate) og_description: Option<String>,
    pub(crate) twitter_title: Option<String>,
    pub(crate) twitter_description: Option<String>,
}

impl From<PostMetaData> for PostMetaDataDto {
    fn from(meta: PostMetaData) -> Self {
        Self {
            meta_title: meta.meta_title,
            meta_description: meta.meta_description,
            meta_keywords: meta.meta_keywords,
            og_title: meta.og_title,
            og_description: meta.og_description,
            twitter_title: meta.twitter_title,
            twitter_description: meta.twitter_description,
        }
    }
}

impl From<PostMetaDataDto> for PostMetaData {
    fn from(dto: PostMetaDataDto) -> Self {
        Self {
            meta_title: dto.meta_title,
            meta_description: dto.meta_description,
            meta_keywords: dto.meta_keywords,
            og_title: dto.og_title,
            og_description: dto.og_description,
            twitter_title: dto.twitter_title,
            twitter_description: dto.twitter_description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) content: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) category_id: i64,
    pub(crate) category_name: String,
    pub(crate) category_slug: String,
    pub(crate) author_id: i64,
    pub(crate) author_name: String,
    pub(crate) status: String,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) scheduled_at: Option<DateTime<Utc>>,
    pub(crate) is_featured: bool,
    pub(crate) allow_comments: bool,
    pub(crate) views_count: i32,
    pub(crate) comments_count: i32,
    pub(crate) reading_time: i32,
    pub(crate) meta_data: Option<PostMetaDataDto>,
    pub(crate) tags: Vec<TagDto>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<PostDetail> for PostDto {
    fn from(detail: PostDetail) -> Self {
        let post = detail.post;
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            content: post.content,
            featured_image: post.featured_image,
            category_id: post.category_id,
            category_name: detail.category_name,
            category_slug: detail.category_slug,
            author_id: post.user_id,
            author_name: detail.author_name,
            status: post.status.as_str().to_string(),
            published_at: post.published_at,
            scheduled_at: post.scheduled_at,
            is_featured: post.is_featured,
            allow_comments: post.allow_comments,
            views_count: post.views_count,
            comments_count: post.comments_count,
            reading_time: post.reading_time,
            meta_data: post.meta_data.map(PostMetaDataDto::from),
            tags: detail.tags.into_iter().map(TagDto::from).collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostPageDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) page: u32,
    pub(crate) per_page: u32,
    pub(crate) total: i64,
    pub(crate) last_page: u32,
}

impl From<PostPage> for PostPageDto {
    fn from(page: PostPage) -> Self {
        let last_page = page.last_page();
        Self {
            posts: page.items.into_iter().map(PostDto::from).collect(),
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            last_page,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) parent_id: Option<i64>,
    pub(crate) author_name: String,
    pub(crate) author_website: Option<String>,
    pub(crate) content: String,
    pub(crate) status: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<CommentRecord> for CommentDto {
    fn from(record: CommentRecord) -> Self {
        let author_name = record.display_name();
        let author_website = match &record.comment.commenter {
            Commenter::Guest { website, .. } => website.clone(),
            Commenter::Registered { .. } => None,
        };
        Self {
            id: record.comment.id,
            post_id: record.comment.post_id,
            parent_id: record.comment.parent_id,
            author_name,
            author_website,
            content: record.comment.content,
            status: record.comment.status.as_str().to_string(),
            created_at: record.comment.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentNodeDto {
    pub(crate) comment: CommentDto,
    pub(crate) replies: Vec<CommentDto>,
}

impl From<CommentNode> for CommentNodeDto {
    fn from(node: CommentNode) -> Self {
        Self {
            comment: CommentDto::from(node.record),
            replies: node.replies.into_iter().map(CommentDto::from).collect(),
        }
    }
}
