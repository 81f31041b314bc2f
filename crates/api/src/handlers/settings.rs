use std::sync::Arc;

use axum::{Json, extract::State};
use coachline_core::{
    errors::{CoachError, CoachResult},
    models::profile::{Profile, ProfileUpdate, SettingsView},
    query::{ChangeEvent, QueryKey, Table},
    validation,
};

use crate::{
    ApiState,
    middleware::{error_handling::AppError, session::CurrentUser},
};

async fn load_profile(state: &ApiState, user: &CurrentUser) -> CoachResult<Profile> {
    state
        .profiles
        .get_profile(&user.token, user.id())
        .await?
        .ok_or_else(|| CoachError::NotFound("Profile not found".to_string()))
}

pub async fn get_settings(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<SettingsView>, AppError> {
    let profile = state
        .cache
        .get_or_fetch(user.id(), QueryKey::Profile, || load_profile(&state, &user))
        .await?;

    Ok(Json(SettingsView {
        profile,
        email: user.user.email.clone(),
    }))
}

pub async fn update_settings(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(req): Json<ProfileUpdate>,
) -> Result<Json<SettingsView>, AppError> {
    let time_zone = match req.time_zone.as_deref().map(str::trim) {
        Some(tz) if !tz.is_empty() => Some(validation::validate_time_zone(tz)?.name().to_string()),
        _ => None,
    };
    let update = ProfileUpdate {
        full_name: req
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        time_zone,
    };

    let profile = state
        .profiles
        .update_profile(&user.token, user.id(), &update)
        .await?;
    state.signals.publish(ChangeEvent::row(Table::Profiles, user.id()));

    Ok(Json(SettingsView {
        profile,
        email: user.user.email,
    }))
}
