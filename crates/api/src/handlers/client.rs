//! Client screens: dashboard, booking, requests and players.

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
        booking::{BookRequest, BookResponse, BookingWithDetails, Decision},
        profile::{CreatePlayerRequest, NewPlayer, Player, PlayerUpdate, Role},
        views::{BOOKING_REQUESTED, BookView, ClientDashboard, ListView, NO_OPENINGS},
    },
    query::{ChangeEvent, QueryKey, Table},
    validation,
};
use coachline_remote::Credential;
use tracing::info;
use uuid::Uuid;

use crate::{
    ApiState,
    handlers::coach::UPCOMING_LIMIT,
    middleware::{error_handling::AppError, session::CurrentUser},
};

pub const ALREADY_SUBMITTING: &str = "This booking request is already being submitted";

async fn load_dashboard(state: &ApiState, user: &CurrentUser) -> CoachResult<ClientDashboard> {
    let lessons = state
        .lessons
        .list_lessons(&user.token, Role::Client, user.id(), Some(Utc::now()))
        .await?;
    let bookings = state
        .bookings
        .list_client_bookings(&user.token, user.id())
        .await?;
    let unread = state.messages.unread_count(&user.token, user.id()).await?;

    Ok(ClientDashboard {
        upcoming_lessons: lessons.into_iter().take(UPCOMING_LIMIT).collect(),
        bookings,
        unread_messages: unread,
    })
}

pub async fn dashboard(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<ClientDashboard>, AppError> {
    let view = state
        .cache
        .get_or_fetch(user.id(), QueryKey::ClientDashboard, || load_dashboard(&state, &user))
        .await?;
    Ok(Json(view))
}

async fn load_book_view(state: &ApiState, user: &CurrentUser) -> CoachResult<BookView> {
    let now = Utc::now();
    let openings = state
        .schedule
        .list_bookable_openings(&user.token, now)
        .await?
        .into_iter()
        .filter(|opening| opening.is_bookable(now))
        .collect();
    Ok(BookView {
        openings: ListView::from_items(openings, NO_OPENINGS),
    })
}

pub async fn book_view(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<BookView>, AppError> {
    let view = state
        .cache
        .get_or_fetch(user.id(), QueryKey::BookableOpenings, || load_book_view(&state, &user))
        .await?;
    Ok(Json(view))
}

/// Submits a booking request. Each submission reaches the backend once;
/// a second submission with the same key while the first is still running
/// is rejected.
pub async fn request_booking(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let idempotency_key = req.idempotency_key.unwrap_or_else(Uuid::new_v4);
    let location = req
        .location_requested
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    let Some(_guard) = state.in_flight.begin(idempotency_key) else {
        return Err(AppError(CoachError::Conflict(ALREADY_SUBMITTING.to_string())));
    };

    let booking_id = state
        .bookings
        .request_booking(&user.token, req.opening_id, idempotency_key, location)
        .await?;
    state.signals.publish_all([
        ChangeEvent::row(Table::Bookings, booking_id),
        ChangeEvent::row(Table::Openings, req.opening_id),
    ]);
    info!(client_id = %user.id(), %booking_id, "booking request submitted");

    Ok((
        StatusCode::CREATED,
        Json(BookResponse {
            booking_id,
            idempotency_key,
            message: BOOKING_REQUESTED.to_string(),
        }),
    ))
}

async fn my_bookings(state: &ApiState, user: &CurrentUser) -> CoachResult<Vec<BookingWithDetails>> {
    state
        .cache
        .get_or_fetch(user.id(), QueryKey::MyBookings, || async {
            state
                .bookings
                .list_client_bookings(&user.token, user.id())
                .await
                .map_err(CoachError::from)
        })
        .await
}

pub async fn list_requests(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<Vec<BookingWithDetails>>, AppError> {
    Ok(Json(my_bookings(&state, &user).await?))
}

pub async fn cancel_request(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BookingWithDetails>>, AppError> {
    state.bookings.decide_booking(&user.token, id, Decision::Cancel).await?;
    state.signals.publish_all([
        ChangeEvent::row(Table::Bookings, id),
        ChangeEvent::new(Table::Openings),
        ChangeEvent::new(Table::Lessons),
    ]);

    Ok(Json(my_bookings(&state, &user).await?))
}

// Players

async fn players(state: &ApiState, user: &CurrentUser) -> CoachResult<Vec<Player>> {
    state
        .cache
        .get_or_fetch(user.id(), QueryKey::Players, || async {
            state
                .profiles
                .list_players(&user.token, user.id())
                .await
                .map_err(CoachError::from)
        })
        .await
}

pub async fn list_players(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<Vec<Player>>, AppError> {
    Ok(Json(players(&state, &user).await?))
}

pub async fn create_player(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(req): Json<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<Vec<Player>>), AppError> {
    let name = validation::validate_required("Player name", &req.name)?;
    validation::validate_measurement("Height", req.height_inches)?;
    validation::validate_measurement("Weight", req.weight_lbs)?;
    validation::validate_measurement("Age", req.age)?;

    let player = NewPlayer {
        handedness: req.handedness,
        height_inches: req.height_inches,
        weight_lbs: req.weight_lbs,
        age: req.age,
        date_of_birth: req.date_of_birth,
        is_primary: req.is_primary,
        ..NewPlayer::primary(user.id(), name)
    };
    state
        .profiles
        .create_player(&Credential::User(user.token.clone()), &player)
        .await?;
    state.signals.publish(ChangeEvent::new(Table::Players));

    Ok((StatusCode::CREATED, Json(players(&state, &user).await?)))
}

pub async fn update_player(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(mut update): Json<PlayerUpdate>,
) -> Result<Json<Player>, AppError> {
    if let Some(name) = &update.name {
        update.name = Some(validation::validate_required("Player name", name)?);
    }
    validation::validate_measurement("Height", update.height_inches)?;
    validation::validate_measurement("Weight", update.weight_lbs)?;
    validation::validate_measurement("Age", update.age)?;

    let player = state.profiles.update_player(&user.token, id, &update).await?;
    state.signals.publish(ChangeEvent::row(Table::Players, id));

    Ok(Json(player))
}
