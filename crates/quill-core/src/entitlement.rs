//! Body visibility evaluation.
//!
//! Pure and free of I/O: the caller supplies the viewer's premium status
//! (derived from the subscription ledger) and gets back either the full
//! body or a truncated preview with a paywall flag.

use uuid::Uuid;

use crate::domain::{AccessLevel, Post};

/// Number of characters shown to non-entitled viewers of a premium post.
pub const PREVIEW_CHARS: usize = 200;

/// What the viewer is allowed to see of a post's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    pub body: String,
    pub paywalled: bool,
}

/// Decide full body vs. truncated preview, in priority order: the post's
/// author always sees the full body, then free posts are open to everyone,
/// then premium viewers see everything. Anyone else gets the first
/// [`PREVIEW_CHARS`] characters plus an ellipsis.
pub fn render_body(post: &Post, viewer_id: Uuid, viewer_is_premium: bool) -> Rendering {
    let full = post.author_id == viewer_id
        || post.access_level == AccessLevel::Free
        || viewer_is_premium;

    if full {
        return Rendering {
            body: post.body.clone(),
            paywalled: false,
        };
    }

    // Character-based, not byte-based: truncation must not split a
    // multi-byte character.
    let mut preview: String = post.body.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    Rendering {
        body: preview,
        paywalled: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostStatus;

    fn premium_post(author_id: Uuid, body: &str) -> Post {
        let mut post = Post::new(author_id, "Premium thoughts".into(), body.into());
        post.access_level = AccessLevel::Premium;
        post.status = PostStatus::Published;
        post
    }

    #[test]
    fn free_posts_are_open_regardless_of_premium() {
        let post = Post::new(Uuid::new_v4(), "Open".into(), "anyone can read".into());
        for premium in [false, true] {
            let rendering = render_body(&post, Uuid::new_v4(), premium);
            assert_eq!(rendering.body, "anyone can read");
            assert!(!rendering.paywalled);
        }
    }

    #[test]
    fn author_bypasses_the_paywall() {
        let author = Uuid::new_v4();
        let post = premium_post(author, "secret sauce");
        let rendering = render_body(&post, author, false);
        assert_eq!(rendering.body, "secret sauce");
        assert!(!rendering.paywalled);
    }

    #[test]
    fn premium_viewer_sees_full_body() {
        let post = premium_post(Uuid::new_v4(), "for subscribers");
        let rendering = render_body(&post, Uuid::new_v4(), true);
        assert_eq!(rendering.body, "for subscribers");
        assert!(!rendering.paywalled);
    }

    #[test]
    fn others_get_a_truncated_preview() {
        let body = "x".repeat(500);
        let post = premium_post(Uuid::new_v4(), &body);
        let rendering = render_body(&post, Uuid::new_v4(), false);
        assert!(rendering.paywalled);
        assert_eq!(rendering.body.len(), PREVIEW_CHARS + 3);
        assert!(rendering.body.ends_with("..."));
    }

    #[test]
    fn preview_respects_character_boundaries() {
        let body = "é".repeat(300);
        let post = premium_post(Uuid::new_v4(), &body);
        let rendering = render_body(&post, Uuid::new_v4(), false);
        assert_eq!(rendering.body.chars().count(), PREVIEW_CHARS + 3);
    }
}
