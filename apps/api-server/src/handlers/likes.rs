//! Like toggle handler.

use actix_web::{HttpResponse, web};

use quill_shared::dto::LikeResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{slug}/like
///
/// Toggle semantics: first call likes, the next un-likes. The count always
/// reflects the persisted rows at the time of response.
pub async fn toggle(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let outcome = state.likes.toggle(&slug, identity.user_id).await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        liked: outcome.liked,
        count: outcome.count,
    }))
}
