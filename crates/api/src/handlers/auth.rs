//! Sign-in, sign-up, OAuth and password flows.
//!
//! These routes sit under the public `/auth/` prefix, so they read the
//! session token themselves when they need one.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use coachline_core::{
    access::LOGIN_PATH,
    errors::CoachError,
    models::{
        auth::{
            AuthRedirect, LoginRequest, ResetPasswordRequest, SignUpOutcome, SignUpRequest,
            UpdatePasswordRequest, UserMetadata,
        },
        profile::NewPlayer,
    },
    roles, validation,
};
use coachline_remote::Credential;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        access::{landing_path, resolve_caller},
        error_handling::AppError,
        session::{PKCE_COOKIE, expired_cookie, session_cookie, token_from},
    },
};

pub const CONFIRM_EMAIL_MESSAGE: &str = "Check your email to confirm your account";
pub const RESET_SENT_MESSAGE: &str = "Password reset email sent";

const OAUTH_PROVIDER: &str = "google";
const CALLBACK_PATH: &str = "/auth/callback";

fn redirect_to(path: &str) -> Json<AuthRedirect> {
    Json(AuthRedirect {
        redirect: path.to_string(),
        message: None,
    })
}

/// Makes sure a new account has its profile row and primary player.
pub(crate) async fn bootstrap_account(
    state: &ApiState,
    credential: &Credential,
    user_id: Uuid,
    player_name: &str,
) -> Result<(), AppError> {
    state.profiles.ensure_profile_exists(credential, user_id).await?;
    state
        .profiles
        .create_player(credential, &NewPlayer::primary(user_id, player_name))
        .await?;
    Ok(())
}

pub async fn login(
    State(state): State<Arc<ApiState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthRedirect>), AppError> {
    validation::validate_email(&req.email)?;
    validation::validate_required("Password", &req.password)?;

    let session = state
        .auth
        .sign_in_with_password(req.email.trim(), &req.password)
        .await?;
    let caller = resolve_caller(&state, &session.access_token, &session.user).await?;
    info!(user_id = %caller.user_id, role = caller.role.as_str(), "signed in");

    let jar = jar.add(session_cookie(&state.config.session_cookie, &session.access_token));
    Ok((jar, redirect_to(landing_path(&caller))))
}

pub async fn signup(
    State(state): State<Arc<ApiState>>,
    jar: CookieJar,
    Json(req): Json<SignUpRequest>,
) -> Result<(CookieJar, Json<AuthRedirect>), AppError> {
    validation::validate_email(&req.email)?;
    validation::validate_password(&req.password, &req.confirm_password)?;
    let player_name = validation::validate_required("Player name", &req.player_name)?;

    let metadata = UserMetadata {
        account_type: Some(req.account_type),
        player_name: Some(player_name.clone()),
        full_name: req
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
    };
    let outcome = state
        .auth
        .sign_up(
            req.email.trim(),
            &req.password,
            &metadata,
            &state.config.site_link(CALLBACK_PATH),
        )
        .await?;

    match outcome {
        SignUpOutcome::SignedIn(session) => {
            let credential = Credential::User(session.access_token.clone());
            bootstrap_account(&state, &credential, session.user.id, &player_name).await?;
            let caller = resolve_caller(&state, &session.access_token, &session.user).await?;

            let jar = jar.add(session_cookie(&state.config.session_cookie, &session.access_token));
            Ok((jar, redirect_to(landing_path(&caller))))
        }
        SignUpOutcome::ConfirmationSent(user) => {
            info!(user_id = %user.id, "sign-up awaiting email confirmation");
            Ok((
                jar,
                Json(AuthRedirect {
                    redirect: LOGIN_PATH.to_string(),
                    message: Some(CONFIRM_EMAIL_MESSAGE.to_string()),
                }),
            ))
        }
    }
}

/// Starts the OAuth sign-in. The PKCE verifier rides in a cookie until the
/// provider sends the browser back to the callback.
pub async fn google(State(state): State<Arc<ApiState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let verifier = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let url = state.auth.oauth_authorize_url(
        OAUTH_PROVIDER,
        &state.config.site_link(CALLBACK_PATH),
        &verifier,
    );
    (jar.add(session_cookie(PKCE_COOKIE, &verifier)), Redirect::to(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

fn login_error(message: &str) -> Redirect {
    Redirect::to(&format!("{}?error={}", LOGIN_PATH, urlencoding::encode(message)))
}

pub async fn callback(
    State(state): State<Arc<ApiState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(error) = params.error_description.or(params.error) {
        warn!(%error, "oauth provider returned an error");
        return login_error(&error).into_response();
    }
    let Some(code) = params.code else {
        return login_error("Missing authorization code").into_response();
    };
    let Some(verifier) = jar.get(PKCE_COOKIE).map(|c| c.value().to_string()) else {
        return login_error("Sign-in expired, please try again").into_response();
    };

    let session = match state.auth.exchange_code(&code, &verifier).await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "code exchange failed");
            return login_error(&e.to_string()).into_response();
        }
    };
    let token = session.access_token.as_str();
    let user_id = session.user.id;

    if let Err(e) = state
        .profiles
        .ensure_profile_exists(&Credential::User(token.to_string()), user_id)
        .await
    {
        warn!(%user_id, error = %e, "profile bootstrap failed");
        return login_error(&e.to_string()).into_response();
    }
    repair_role(&state, token, user_id).await;

    let caller = match resolve_caller(&state, token, &session.user).await {
        Ok(caller) => caller,
        Err(e) => {
            warn!(%user_id, error = %e, "caller lookup failed after oauth");
            return login_error(&e.to_string()).into_response();
        }
    };
    info!(%user_id, role = caller.role.as_str(), "signed in with oauth");

    let jar = jar
        .remove(expired_cookie(PKCE_COOKIE))
        .add(session_cookie(&state.config.session_cookie, token));
    (jar, Redirect::to(landing_path(&caller))).into_response()
}

/// Writes the designated role back to the stored profile when they
/// disagree. This is the only place stored roles are corrected.
async fn repair_role(state: &ApiState, token: &str, user_id: Uuid) {
    let profile = match state.profiles.get_profile(token, user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => return,
        Err(e) => {
            warn!(%user_id, error = %e, "profile lookup failed during role repair");
            return;
        }
    };
    let settings = match state.profiles.get_app_settings(token).await {
        Ok(settings) => settings,
        Err(e) => {
            warn!(%user_id, error = %e, "settings lookup failed during role repair");
            return;
        }
    };

    if let Some(role) = roles::reconcile(&profile, settings.as_ref()) {
        match state.profiles.set_role(token, user_id, role).await {
            Ok(()) => info!(%user_id, role = role.as_str(), "stored role corrected"),
            Err(e) => warn!(%user_id, error = %e, "failed to correct stored role"),
        }
    }
}

pub async fn reset_password(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<AuthRedirect>, AppError> {
    validation::validate_email(&req.email)?;
    state
        .auth
        .send_password_reset(req.email.trim(), &state.config.site_link("/reset-password"))
        .await?;

    Ok(Json(AuthRedirect {
        redirect: LOGIN_PATH.to_string(),
        message: Some(RESET_SENT_MESSAGE.to_string()),
    }))
}

/// Sets a new password using the recovery session from the reset link.
pub async fn update_password(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<AuthRedirect>, AppError> {
    let token = token_from(&headers, &state.config.session_cookie)
        .ok_or_else(|| CoachError::Authentication("Reset link is invalid or expired".to_string()))?;
    validation::validate_password(&req.password, &req.confirm_password)?;

    let user = state.auth.update_password(&token, &req.password).await?;
    let caller = resolve_caller(&state, &token, &user).await?;
    info!(user_id = %user.id, "password updated");

    Ok(redirect_to(landing_path(&caller)))
}

pub async fn logout(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Json<AuthRedirect>) {
    if let Some(token) = token_from(&headers, &state.config.session_cookie) {
        if let Err(e) = state.auth.sign_out(&token).await {
            warn!(error = %e, "sign out failed; clearing the session anyway");
        }
    }
    let jar = jar.remove(expired_cookie(&state.config.session_cookie));
    (jar, redirect_to(LOGIN_PATH))
}
