//! Session cookie extractor.

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use chrono::Utc;
use futures::future::LocalBoxFuture;

use quill_core::domain::Session;

use crate::config::SessionConfig;
use crate::middleware::error::AppError;
use crate::state::AppState;

/// Signed-in user, resolved from the session cookie.
///
/// Use this in handlers to require a live session:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i32,
    pub username: String,
    pub sid: String,
}

impl From<Session> for Identity {
    fn from(session: Session) -> Self {
        Self {
            user_id: session.user_id,
            username: session.username,
            sid: session.sid,
        }
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let sid = state
            .as_ref()
            .and_then(|s| session_id(req, &s.session_config));

        Box::pin(async move {
            let Some(state) = state else {
                tracing::error!("AppState not found in app data");
                return Err(AppError::Internal("Server configuration error".to_string()));
            };
            let Some(sid) = sid else {
                return Err(AppError::Unauthorized("Please log in.".to_string()));
            };

            match state.sessions.resolve(&sid).await? {
                Some(session) => Ok(Identity::from(session)),
                None => Err(AppError::Unauthorized(
                    "Your session has expired. Please log in again.".to_string(),
                )),
            }
        })
    }
}

/// Session id carried by the request, if any.
pub fn session_id(req: &HttpRequest, config: &SessionConfig) -> Option<String> {
    req.cookie(&config.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// HTTP-only cookie carrying `session`'s id until the session expires.
pub fn session_cookie(config: &SessionConfig, session: &Session) -> Cookie<'static> {
    let remaining = (session.expires_at - Utc::now()).num_seconds().max(0);

    Cookie::build(config.cookie_name.clone(), session.sid.clone())
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(remaining))
        .finish()
}

/// Cookie that tells the client to drop the session cookie.
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build(config.cookie_name.clone(), "")
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .finish();
    cookie.make_removal();
    cookie
}
