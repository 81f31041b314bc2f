//! Lesson lists and details, shared by both roles. The backend's row
//! policies limit each role to its own lessons.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use coachline_core::{
    errors::{CoachError, CoachResult},
    models::lesson::{AddNoteRequest, LessonDetail, LessonNote, LessonWithClient},
    query::{ChangeEvent, QueryKey, Table},
    validation,
};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{error_handling::AppError, session::CurrentUser},
};

pub async fn list_lessons(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<Vec<LessonWithClient>>, AppError> {
    let lessons = state
        .cache
        .get_or_fetch(user.id(), QueryKey::Lessons, || async {
            state
                .lessons
                .list_lessons(&user.token, user.caller.role, user.id(), None)
                .await
                .map_err(CoachError::from)
        })
        .await?;
    Ok(Json(lessons))
}

async fn load_detail(state: &ApiState, user: &CurrentUser, id: Uuid) -> CoachResult<LessonDetail> {
    let lesson = state
        .lessons
        .get_lesson(&user.token, id)
        .await?
        .ok_or_else(|| CoachError::NotFound("Lesson not found".to_string()))?;
    let notes = state.lessons.list_notes(&user.token, id).await?;
    Ok(LessonDetail { lesson, notes })
}

pub async fn get_lesson(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LessonDetail>, AppError> {
    let detail = state
        .cache
        .get_or_fetch(user.id(), QueryKey::Lesson(id), || load_detail(&state, &user, id))
        .await?;
    Ok(Json(detail))
}

pub async fn add_note(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AddNoteRequest>,
) -> Result<(StatusCode, Json<LessonNote>), AppError> {
    let content = validation::validate_required("Note", &req.content)?;

    let note = state.lessons.add_note(&user.token, id, &content).await?;
    state.signals.publish(ChangeEvent::row(Table::LessonNotes, note.id));

    Ok((StatusCode::CREATED, Json(note)))
}
