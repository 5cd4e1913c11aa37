//! Post handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::{NewPost, PostChanges};
use quill_shared::dto::{CreatePostRequest, UpdatePostRequest};

use super::convert::{post_response, post_with_author, posts_response};
use crate::middleware::error::AppResult;
use crate::middleware::session::Identity;
use crate::state::AppState;

/// GET /api/posts
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_posts().await?;
    Ok(HttpResponse::Ok().json(posts_response(&posts)))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let (post, author) = state.posts.get_post_with_author(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post_with_author(&post, &author)))
}

/// POST /api/posts. The author is the session user.
pub async fn create_post(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .create_post(
            identity.user_id,
            NewPost {
                title: req.title,
                content: req.content,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(post_response(&post)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .update_post(
            identity.user_id,
            path.into_inner(),
            PostChanges {
                title: req.title,
                content: req.content,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(post_response(&post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete_post(identity.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
