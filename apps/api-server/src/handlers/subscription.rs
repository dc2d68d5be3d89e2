//! Subscription handlers.

use actix_web::{HttpResponse, web};

use quill_shared::dto::SubscriptionResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/subscription
///
/// Activates (or re-activates) premium for the current user. The expiry is
/// always reset to 30 days from today, never extended.
pub async fn activate(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let expiry = state.subscription.activate(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(SubscriptionResponse {
        active: true,
        end_date: Some(expiry.to_string()),
        message: Some(format!("Subscribed until {}", expiry.format("%b %d, %Y"))),
    }))
}

/// GET /api/subscription
pub async fn status(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let status = state.subscription.status(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(SubscriptionResponse {
        active: status.active,
        end_date: status.end_date.map(|d| d.to_string()),
        message: None,
    }))
}
