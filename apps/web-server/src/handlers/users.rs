//! Account and session handlers.

use actix_web::{HttpRequest, HttpResponse, web};

use quill_core::domain::{NewUser, UserChanges};
use quill_shared::ApiResponse;
use quill_shared::dto::{LoginRequest, RegisterRequest, UpdateUserRequest};

use super::convert::{posts_response, user_response, user_with_posts};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::session::{Identity, removal_cookie, session_cookie, session_id};
use crate::state::AppState;

/// POST /api/users
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .accounts
        .create_user(NewUser {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;
    let session = state.sessions.open(&user).await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok(HttpResponse::Created()
        .cookie(session_cookie(&state.session_config, &session))
        .json(user_response(&user)))
}

/// POST /api/users/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .accounts
        .authenticate(&req.email, &req.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password.".to_string()))?;
    let session = state.sessions.open(&user).await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&state.session_config, &session))
        .json(ApiResponse::ok_with_message(
            user_response(&user),
            format!("Logged in as {}", user.username),
        )))
}

/// POST /api/users/logout
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let no_session = || AppError::NotFound("No active session".to_string());

    let sid = session_id(&req, &state.session_config).ok_or_else(no_session)?;
    if !state.sessions.close(&sid).await? {
        return Err(no_session());
    }

    Ok(HttpResponse::NoContent()
        .cookie(removal_cookie(&state.session_config))
        .finish())
}

/// GET /api/users/me
pub async fn me(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let user = state.accounts.find_user(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(user_response(&user)))
}

/// GET /api/users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let (user, posts) = state.accounts.find_user_with_posts(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user_with_posts(&user, &posts)))
}

/// GET /api/users/{id}/posts
pub async fn user_posts(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.posts_by_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts_response(&posts)))
}

/// PUT /api/users/{id}. Only the signed-in user may edit themselves.
pub async fn update_user(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if identity.user_id != id {
        return Err(AppError::Forbidden);
    }

    let req = body.into_inner();
    let user = state
        .accounts
        .update_user(
            id,
            UserChanges {
                username: req.username,
                email: req.email,
                password: req.password,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}

/// DELETE /api/users/{id}. Removes the account with its posts and sessions.
pub async fn delete_user(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if identity.user_id != id {
        return Err(AppError::Forbidden);
    }

    state.accounts.delete_user(id).await?;
    tracing::info!(user_id = id, "User deleted");

    Ok(HttpResponse::NoContent()
        .cookie(removal_cookie(&state.session_config))
        .finish())
}
