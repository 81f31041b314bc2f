//! Session token transport: bearer header or cookie.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use coachline_core::{access::Caller, errors::CoachError, models::auth::AuthUser};
use uuid::Uuid;

use crate::middleware::error_handling::AppError;

/// Cookie holding the PKCE verifier between `/auth/google` and the callback.
pub const PKCE_COOKIE: &str = "coachline-pkce";

/// Reads the access token from `Authorization: Bearer` first, then from the
/// session cookie.
pub fn token_from(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

pub fn session_cookie(name: &str, token: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// A cookie that, added to a jar's removal set, clears `name`.
pub fn expired_cookie(name: &str) -> Cookie<'static> {
    Cookie::build(name.to_string()).path("/").build()
}

/// The authenticated caller, resolved once per request by the access
/// middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub token: String,
    pub user: AuthUser,
    pub caller: Caller,
}

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.caller.user_id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError(CoachError::Authentication("Not signed in".to_string())))
    }
}
