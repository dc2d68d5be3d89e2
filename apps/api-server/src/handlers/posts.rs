//! Post handlers: list, detail (entitlement-gated), and author CRUD.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use quill_core::domain::{AccessLevel, Post, PostStatus};
use quill_core::service::{CommentThread, NewPost, PostUpdate};
use quill_shared::dto::{
    CommentNode, CreatePostRequest, PostDetailResponse, PostListResponse, PostSummary,
    UpdatePostRequest,
};
use quill_shared::events::format_display_date;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
}

/// GET /api/posts?page=N
pub async fn list(
    state: web::Data<AppState>,
    _identity: Identity,
    params: web::Query<ListParams>,
) -> AppResult<HttpResponse> {
    let page = params.page.unwrap_or(1).max(1);
    let posts = state.posts.list(page, state.page_size).await?;

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts: posts.into_iter().map(summary).collect(),
        page,
    }))
}

/// GET /api/posts/{slug}
pub async fn detail(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let premium = state.subscription.is_premium(identity.user_id).await?;
    let view = state.posts.view(&slug, identity.user_id, premium).await?;

    let post = view.post;
    Ok(HttpResponse::Ok().json(PostDetailResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        author_id: post.author_id,
        body: view.body,
        paywall: view.paywalled,
        category: post.category,
        tags: post.tags,
        access_level: post.access_level.as_str().to_string(),
        status: post.status.as_str().to_string(),
        publish_date: post.publish_date.to_rfc3339(),
        view_count: post.view_count,
        like_count: view.like_count,
        liked_by_viewer: view.liked_by_viewer,
        comments: view.comments.into_iter().map(node).collect(),
    }))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let new_post = NewPost {
        title: req.title,
        body: req.body,
        category: req.category,
        tags: req.tags,
        access_level: parse_access_level(req.access_level.as_deref())?,
        status: parse_status(req.status.as_deref())?,
    };

    let post = state
        .posts
        .create(identity.user_id, identity.role, new_post)
        .await?;

    Ok(HttpResponse::Created().json(summary(post)))
}

/// PUT /api/posts/{slug}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let req = body.into_inner();

    let update = PostUpdate {
        title: req.title,
        body: req.body,
        category: req.category,
        tags: req.tags,
        access_level: req
            .access_level
            .as_deref()
            .map(|raw| parse_access_level(Some(raw)))
            .transpose()?,
        status: req
            .status
            .as_deref()
            .map(|raw| parse_status(Some(raw)))
            .transpose()?,
    };

    let post = state.posts.update(&slug, identity.user_id, update).await?;
    Ok(HttpResponse::Ok().json(summary(post)))
}

/// DELETE /api/posts/{slug}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    state.posts.delete(&slug, identity.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

fn summary(post: Post) -> PostSummary {
    PostSummary {
        id: post.id,
        title: post.title,
        slug: post.slug,
        author_id: post.author_id,
        category: post.category,
        tags: post.tags,
        access_level: post.access_level.as_str().to_string(),
        publish_date: post.publish_date.to_rfc3339(),
        view_count: post.view_count,
    }
}

fn node(thread: CommentThread) -> CommentNode {
    CommentNode {
        id: thread.id,
        author: thread.author,
        body: thread.body,
        parent_id: thread.parent_id,
        created_date: format_display_date(thread.created_date),
        replies: thread.replies.into_iter().map(node).collect(),
    }
}

fn parse_access_level(raw: Option<&str>) -> Result<AccessLevel, AppError> {
    match raw {
        None => Ok(AccessLevel::Free),
        Some(raw) => raw.parse().map_err(AppError::BadRequest),
    }
}

fn parse_status(raw: Option<&str>) -> Result<PostStatus, AppError> {
    match raw {
        None => Ok(PostStatus::Published),
        Some(raw) => raw.parse().map_err(AppError::BadRequest),
    }
}
