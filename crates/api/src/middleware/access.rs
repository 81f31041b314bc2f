//! Role-gated access middleware.
//!
//! Every request passes through [`require_access`]. Public paths go straight
//! through; everything else needs a session whose caller the route policy
//! in `coachline_core::access` allows.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use coachline_core::{
    access::{self, Access, COMPLETE_ACCOUNT_PATH, Caller},
    errors::CoachResult,
    models::auth::AuthUser,
    roles,
};
use tracing::{debug, warn};

use crate::{
    ApiState,
    middleware::{
        error_handling::AppError,
        session::{CurrentUser, token_from},
    },
};

/// Builds the caller facts for a resolved user. The role cannot be derived
/// without the profile and settings, so a failed lookup fails the caller.
pub async fn resolve_caller(state: &ApiState, token: &str, user: &AuthUser) -> CoachResult<Caller> {
    let profile = state.profiles.get_profile(token, user.id).await?;
    let settings = state.profiles.get_app_settings(token).await?;

    Ok(Caller {
        user_id: user.id,
        role: roles::derive_role(user.id, settings.as_ref(), profile.map(|p| p.role)),
        metadata_complete: user.user_metadata.is_complete(),
    })
}

/// Where a freshly signed-in caller should land.
pub fn landing_path(caller: &Caller) -> &'static str {
    if !caller.metadata_complete {
        COMPLETE_ACCOUNT_PATH
    } else {
        caller.role.landing_path()
    }
}

pub async fn require_access(
    State(state): State<Arc<ApiState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if access::is_public(&path) {
        return next.run(req).await;
    }

    let current = match token_from(req.headers(), &state.config.session_cookie) {
        Some(token) => match state.auth.get_user(&token).await {
            Ok(user) => match resolve_caller(&state, &token, &user).await {
                Ok(caller) => Some(CurrentUser { token, user, caller }),
                Err(e) => {
                    warn!(user_id = %user.id, %path, error = %e, "caller lookup failed");
                    return AppError(e).into_response();
                }
            },
            Err(e) => {
                debug!(error = %e, "session token rejected");
                None
            }
        },
        None => None,
    };

    match access::authorize(&path, current.as_ref().map(|c| &c.caller)) {
        Access::Allow => {
            if let Some(current) = current {
                req.extensions_mut().insert(current);
            }
            next.run(req).await
        }
        Access::Redirect(to) => {
            debug!(%path, redirect = %to, "access redirected");
            Redirect::to(&to).into_response()
        }
    }
}
