use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who may read a post's full body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Free,
    Premium,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Free => "free",
            AccessLevel::Premium => "premium",
        }
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(AccessLevel::Free),
            "premium" => Ok(AccessLevel::Premium),
            other => Err(format!("unknown access level: {other}")),
        }
    }
}

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("unknown post status: {other}")),
        }
    }
}

/// Post entity - a blog article.
///
/// Slug uniqueness is scoped to the calendar date of `publish_date`; the
/// store validates it at insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub access_level: AccessLevel,
    pub status: PostStatus,
    pub publish_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub view_count: u32,
}

impl Post {
    /// Create a new post. The slug is derived from the title; the slug is
    /// fixed at creation and later title edits do not change it.
    pub fn new(author_id: Uuid, title: String, body: String) -> Self {
        let now = Utc::now();
        let slug = slugify(&title);
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            slug,
            body,
            category: None,
            tags: Vec::new(),
            access_level: AccessLevel::Free,
            status: PostStatus::Published,
            publish_date: now,
            created_at: now,
            updated_at: now,
            view_count: 0,
        }
    }
}

/// Lowercase the title and collapse every non-alphanumeric run into a
/// single hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Hello,  World!"), "hello-world");
        assert_eq!(slugify("  Rust & Tokio 101 "), "rust-tokio-101");
    }

    #[test]
    fn slug_derived_at_creation() {
        let post = Post::new(Uuid::new_v4(), "My First Post".into(), "body".into());
        assert_eq!(post.slug, "my-first-post");
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.access_level, AccessLevel::Free);
    }
}
