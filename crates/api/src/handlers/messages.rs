//! # Messaging
//!
//! One thread per coach/client pair. The coach picks a thread from the
//! conversation list; a client only ever talks to the designated coach,
//! and their thread is created on the first message sent.
//!
//! Reading a thread marks the other party's messages read, so thread views
//! always go to the backend and are never cached.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use coachline_core::{
    errors::{CoachError, CoachResult},
    models::messaging::{Conversation, ConversationWithClient, SendMessageRequest, ThreadView},
    query::{ChangeEvent, QueryKey, Table},
    validation,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{error_handling::AppError, session::CurrentUser},
};

pub const EMPTY_MESSAGE: &str = "Message cannot be empty";

fn content_of(req: &SendMessageRequest) -> CoachResult<String> {
    validation::message_content(&req.content)
        .ok_or_else(|| CoachError::Validation(EMPTY_MESSAGE.to_string()))
}

async fn read_thread(
    state: &ApiState,
    user: &CurrentUser,
    conversation: Option<Conversation>,
) -> CoachResult<ThreadView> {
    let Some(conversation) = conversation else {
        return Ok(ThreadView {
            conversation: None,
            messages: Vec::new(),
        });
    };

    let marked = state
        .messages
        .mark_read(&user.token, conversation.id, user.id())
        .await?;
    if marked > 0 {
        debug!(conversation_id = %conversation.id, marked, "messages marked read");
        state.signals.publish(ChangeEvent::new(Table::Messages));
    }

    let messages = state.messages.list_messages(&user.token, conversation.id).await?;
    Ok(ThreadView {
        conversation: Some(conversation),
        messages,
    })
}

async fn post_message(
    state: &ApiState,
    user: &CurrentUser,
    conversation: &Conversation,
    content: &str,
) -> CoachResult<()> {
    let message = state
        .messages
        .send_message(&user.token, conversation.id, user.id(), content)
        .await?;
    state
        .messages
        .touch_conversation(&user.token, conversation.id)
        .await?;
    state.signals.publish_all([
        ChangeEvent::row(Table::Messages, message.id),
        ChangeEvent::row(Table::Conversations, conversation.id),
    ]);
    Ok(())
}

async fn conversation(
    state: &ApiState,
    user: &CurrentUser,
    id: Uuid,
) -> CoachResult<Conversation> {
    state
        .messages
        .get_conversation(&user.token, id)
        .await?
        .ok_or_else(|| CoachError::NotFound("Conversation not found".to_string()))
}

/// The coach every client messages.
async fn designated_coach(state: &ApiState, user: &CurrentUser) -> CoachResult<Uuid> {
    state
        .profiles
        .get_app_settings(&user.token)
        .await?
        .and_then(|settings| settings.coach_id)
        .ok_or_else(|| CoachError::NotFound("No coach is available to message yet".to_string()))
}

pub async fn list_conversations(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<Vec<ConversationWithClient>>, AppError> {
    let conversations = state
        .cache
        .get_or_fetch(user.id(), QueryKey::Conversations, || async {
            state
                .messages
                .list_conversations(&user.token, user.caller.role, user.id())
                .await
                .map_err(CoachError::from)
        })
        .await?;
    Ok(Json(conversations))
}

pub async fn coach_thread(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ThreadView>, AppError> {
    let conversation = conversation(&state, &user, id).await?;
    Ok(Json(read_thread(&state, &user, Some(conversation)).await?))
}

pub async fn coach_send(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ThreadView>, AppError> {
    let content = content_of(&req)?;

    let conversation = conversation(&state, &user, id).await?;
    post_message(&state, &user, &conversation, &content).await?;

    Ok(Json(read_thread(&state, &user, Some(conversation)).await?))
}

pub async fn client_thread(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<ThreadView>, AppError> {
    let coach_id = designated_coach(&state, &user).await?;
    let conversation = state
        .messages
        .find_conversation(&user.token, coach_id, user.id())
        .await?;
    Ok(Json(read_thread(&state, &user, conversation).await?))
}

pub async fn client_send(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ThreadView>, AppError> {
    let content = content_of(&req)?;

    let coach_id = designated_coach(&state, &user).await?;
    let conversation = match state
        .messages
        .find_conversation(&user.token, coach_id, user.id())
        .await?
    {
        Some(conversation) => conversation,
        None => {
            let created = state
                .messages
                .create_conversation(&user.token, coach_id, user.id())
                .await?;
            debug!(conversation_id = %created.id, "conversation started");
            created
        }
    };
    post_message(&state, &user, &conversation, &content).await?;

    Ok(Json(read_thread(&state, &user, Some(conversation)).await?))
}
