//! Comment handlers.

use actix_web::{HttpResponse, web};

use quill_shared::dto::{CommentResponse, CreateCommentRequest};
use quill_shared::events::format_display_date;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{slug}/comments
///
/// Persists the comment, then the engine pushes it to every live viewer of
/// the post.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let req = body.into_inner();

    let comment = state
        .comments
        .create(&slug, identity.user_id, req.body, req.parent_id)
        .await?;

    Ok(HttpResponse::Created().json(CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author: identity.username,
        body: comment.body,
        parent_id: comment.parent_id,
        created_date: format_display_date(comment.created_date),
    }))
}
