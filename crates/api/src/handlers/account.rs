//! Account completion and parent/player provisioning.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use coachline_core::{
    access::Caller,
    errors::CoachError,
    models::{
        auth::{
            AuthRedirect, CompleteAccountRequest, SignupParentRequest, SignupParentResponse,
            UserMetadata,
        },
        profile::{AccountType, NewPlayer},
    },
    query::{ChangeEvent, Table},
    validation,
};
use coachline_remote::Credential;
use eyre::eyre;
use tracing::info;

use crate::{
    ApiState,
    handlers::auth::bootstrap_account,
    middleware::{access::landing_path, error_handling::AppError, session::CurrentUser},
};

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// What the completion form is pre-filled with.
pub async fn get_metadata(user: CurrentUser) -> Json<UserMetadata> {
    Json(user.user.user_metadata)
}

pub async fn complete_account(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(req): Json<CompleteAccountRequest>,
) -> Result<Json<AuthRedirect>, AppError> {
    let player_name = validation::validate_required("Player name", &req.player_name)?;
    let metadata = UserMetadata {
        account_type: Some(req.account_type),
        player_name: Some(player_name.clone()),
        full_name: trimmed(req.full_name.as_deref()),
    };

    let updated = state.auth.update_user_metadata(&user.token, &metadata).await?;

    let credential = Credential::User(user.token.clone());
    let players = state.profiles.list_players(&user.token, user.id()).await?;
    if players.is_empty() {
        bootstrap_account(&state, &credential, user.id(), &player_name).await?;
    } else {
        state.profiles.ensure_profile_exists(&credential, user.id()).await?;
    }
    state.signals.publish_all([
        ChangeEvent::row(Table::Profiles, user.id()),
        ChangeEvent::new(Table::Players),
    ]);
    info!(user_id = %user.id(), "account completed");

    let caller = Caller {
        metadata_complete: updated.user_metadata.is_complete(),
        ..user.caller
    };
    Ok(Json(AuthRedirect {
        redirect: landing_path(&caller).to_string(),
        message: None,
    }))
}

/// Creates a parent account and a linked player login in one step. Runs
/// with the service key because neither identity has a session yet.
///
/// The parent owns the player row; the player login's profile points at
/// that row through `player_id`.
pub async fn signup_parent(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<SignupParentRequest>,
) -> Result<(StatusCode, Json<SignupParentResponse>), AppError> {
    if state.config.backend_service_role_key.is_none() {
        return Err(AppError(CoachError::Internal(eyre!(
            "Parent sign-up requires BACKEND_SERVICE_ROLE_KEY"
        ))));
    }

    validation::validate_email(&req.parent_email)?;
    validation::validate_email(&req.player_email)?;
    validation::validate_password(&req.parent_password, &req.parent_password)?;
    validation::validate_password(&req.player_password, &req.player_password)?;
    let player_name = validation::validate_required("Player name", &req.player_name)?;
    if req.parent_email.trim().eq_ignore_ascii_case(req.player_email.trim()) {
        return Err(AppError(CoachError::Validation(
            "Parent and player emails must be different".to_string(),
        )));
    }

    let parent_metadata = UserMetadata {
        account_type: Some(AccountType::Parent),
        player_name: Some(player_name.clone()),
        full_name: trimmed(req.parent_name.as_deref()),
    };
    let player_metadata = UserMetadata {
        account_type: Some(AccountType::Player),
        player_name: Some(player_name.clone()),
        full_name: Some(player_name.clone()),
    };

    let parent = state
        .auth
        .admin_create_user(req.parent_email.trim(), &req.parent_password, &parent_metadata)
        .await?;
    let player_user = state
        .auth
        .admin_create_user(req.player_email.trim(), &req.player_password, &player_metadata)
        .await?;

    state
        .profiles
        .ensure_profile_exists(&Credential::Service, player_user.id)
        .await?;
    state
        .profiles
        .ensure_profile_exists(&Credential::Service, parent.id)
        .await?;
    state
        .profiles
        .create_player(&Credential::Service, &NewPlayer::primary(parent.id, &player_name))
        .await?;
    let player = state
        .profiles
        .primary_player(&Credential::Service, parent.id)
        .await?
        .ok_or_else(|| eyre!("player row for parent {} was not created", parent.id))?;
    state
        .profiles
        .link_player(&Credential::Service, player_user.id, player.id)
        .await?;

    state.signals.publish_all([
        ChangeEvent::row(Table::Profiles, player_user.id),
        ChangeEvent::new(Table::Players),
    ]);
    info!(
        parent_id = %parent.id,
        player_user_id = %player_user.id,
        player_id = %player.id,
        "parent account provisioned"
    );

    Ok((
        StatusCode::CREATED,
        Json(SignupParentResponse {
            parent_id: parent.id,
            player_user_id: player_user.id,
            player_id: player.id,
        }),
    ))
}
