//! Coach screens: dashboard, availability, openings, requests and roster.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use coachline_core::{
    errors::{CoachError, CoachResult},
    models::{
        booking::{BookingWithDetails, Decision, DecisionRequest},
        profile::{ClientSummary, Role},
        schedule::{
            AvailabilityTemplate, CreateOpeningRequest, CreateTemplateRequest,
            GenerateOpeningsRequest, GenerateOpeningsResponse, NewOpening, NewTemplate, Opening,
            SetActiveRequest,
        },
        views::CoachDashboard,
    },
    query::{ChangeEvent, QueryKey, Table},
    validation,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{error_handling::AppError, session::CurrentUser},
};

/// How many upcoming lessons the dashboards show.
pub const UPCOMING_LIMIT: usize = 5;

async fn load_dashboard(state: &ApiState, user: &CurrentUser) -> CoachResult<CoachDashboard> {
    let lessons = state
        .lessons
        .list_lessons(&user.token, Role::Coach, user.id(), Some(Utc::now()))
        .await?;
    let pending = state
        .bookings
        .list_pending_requests(&user.token, user.id())
        .await?;
    let unread = state.messages.unread_count(&user.token, user.id()).await?;

    Ok(CoachDashboard {
        upcoming_lessons: lessons.into_iter().take(UPCOMING_LIMIT).collect(),
        pending_requests: pending.len(),
        unread_messages: unread,
    })
}

pub async fn dashboard(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<CoachDashboard>, AppError> {
    let view = state
        .cache
        .get_or_fetch(user.id(), QueryKey::CoachDashboard, || load_dashboard(&state, &user))
        .await?;
    Ok(Json(view))
}

// Availability templates

pub async fn list_templates(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<Vec<AvailabilityTemplate>>, AppError> {
    let templates = state
        .cache
        .get_or_fetch(user.id(), QueryKey::Templates, || async {
            state
                .schedule
                .list_templates(&user.token, user.id())
                .await
                .map_err(CoachError::from)
        })
        .await?;
    Ok(Json(templates))
}

pub async fn create_template(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<AvailabilityTemplate>), AppError> {
    validation::validate_template(req.weekday, req.start_time, req.end_time, req.slot_minutes)?;

    let template = state
        .schedule
        .create_template(
            &user.token,
            &NewTemplate {
                coach_id: user.id(),
                weekday: req.weekday,
                start_time: req.start_time,
                end_time: req.end_time,
                slot_minutes: req.slot_minutes,
                active: true,
            },
        )
        .await?;
    state
        .signals
        .publish(ChangeEvent::row(Table::AvailabilityTemplates, template.id));

    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn set_template_active(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<AvailabilityTemplate>, AppError> {
    let template = state
        .schedule
        .set_template_active(&user.token, id, req.active)
        .await?;
    state
        .signals
        .publish(ChangeEvent::row(Table::AvailabilityTemplates, id));
    Ok(Json(template))
}

pub async fn delete_template(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.schedule.delete_template(&user.token, id).await?;
    state
        .signals
        .publish(ChangeEvent::row(Table::AvailabilityTemplates, id));
    Ok(StatusCode::NO_CONTENT)
}

/// Expands the active templates into concrete openings.
pub async fn generate_openings(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(req): Json<GenerateOpeningsRequest>,
) -> Result<Json<GenerateOpeningsResponse>, AppError> {
    validation::validate_weeks(req.weeks)?;

    let created = state.schedule.generate_openings(&user.token, req.weeks).await?;
    state.signals.publish(ChangeEvent::new(Table::Openings));
    info!(coach_id = %user.id(), weeks = req.weeks, created, "openings generated");

    Ok(Json(GenerateOpeningsResponse { created }))
}

// Openings

pub async fn list_openings(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<Vec<Opening>>, AppError> {
    let openings = state
        .cache
        .get_or_fetch(user.id(), QueryKey::Openings, || async {
            state
                .schedule
                .list_openings(&user.token, user.id(), Utc::now())
                .await
                .map_err(CoachError::from)
        })
        .await?;
    Ok(Json(openings))
}

pub async fn create_opening(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(req): Json<CreateOpeningRequest>,
) -> Result<(StatusCode, Json<Opening>), AppError> {
    if req.start_at >= req.end_at {
        return Err(AppError(CoachError::Validation(
            "Start time must be before end time".to_string(),
        )));
    }
    if req.capacity < 1 {
        return Err(AppError(CoachError::Validation(
            "Capacity must be at least 1".to_string(),
        )));
    }

    let opening = state
        .schedule
        .create_opening(
            &user.token,
            &NewOpening {
                coach_id: user.id(),
                start_at: req.start_at,
                end_at: req.end_at,
                capacity: req.capacity,
                spots_available: req.capacity,
            },
        )
        .await?;
    state.signals.publish(ChangeEvent::row(Table::Openings, opening.id));

    Ok((StatusCode::CREATED, Json(opening)))
}

pub async fn delete_opening(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.schedule.delete_opening(&user.token, id).await?;
    state.signals.publish(ChangeEvent::row(Table::Openings, id));
    Ok(StatusCode::NO_CONTENT)
}

// Booking requests

async fn pending_requests(
    state: &ApiState,
    user: &CurrentUser,
) -> CoachResult<Vec<BookingWithDetails>> {
    state
        .cache
        .get_or_fetch(user.id(), QueryKey::PendingRequests, || async {
            state
                .bookings
                .list_pending_requests(&user.token, user.id())
                .await
                .map_err(CoachError::from)
        })
        .await
}

pub async fn list_requests(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<Vec<BookingWithDetails>>, AppError> {
    Ok(Json(pending_requests(&state, &user).await?))
}

/// Accepts or declines a pending request and returns the refreshed list.
pub async fn decide_request(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<Vec<BookingWithDetails>>, AppError> {
    if req.decision == Decision::Cancel {
        return Err(AppError(CoachError::Validation(
            "Requests can only be accepted or declined".to_string(),
        )));
    }

    state.bookings.decide_booking(&user.token, id, req.decision).await?;
    state.signals.publish_all([
        ChangeEvent::row(Table::Bookings, id),
        ChangeEvent::new(Table::Openings),
        ChangeEvent::new(Table::Lessons),
    ]);

    Ok(Json(pending_requests(&state, &user).await?))
}

// Roster

pub async fn list_clients(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<Vec<ClientSummary>>, AppError> {
    let clients = state
        .cache
        .get_or_fetch(user.id(), QueryKey::Clients, || async {
            state
                .profiles
                .list_clients(&user.token)
                .await
                .map_err(CoachError::from)
        })
        .await?;
    Ok(Json(clients))
}
