//! Change stream and change webhook.
//!
//! Browsers hold `GET /events` open and refetch a screen whenever an event
//! for one of its tables arrives. The backend reports writes made elsewhere
//! through `POST /hooks/changes`; both local and reported writes go through
//! the same `ChangeSignals::publish`.

use std::{convert::Infallible, sync::Arc};

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
};
use coachline_core::{
    errors::CoachError,
    query::{ChangeEvent, ChangeNotification},
};
use futures_util::stream::Stream;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::{
    ApiState,
    middleware::{error_handling::AppError, session::CurrentUser},
};

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// The part of a change a subscriber is sent: the table, never the row id.
/// Subscribers refetch their own views, which the backend scopes per user.
fn announced(change: &ChangeEvent) -> ChangeEvent {
    ChangeEvent::new(change.table)
}

pub async fn stream(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let role = user.caller.role;
    let user_id = user.id();
    let mut rx = state.signals.subscribe();

    let events = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(change) if change.concerns(role) => match Event::default().event("change").json_data(announced(&change)) {
                    Ok(event) => yield Ok(event),
                    Err(e) => warn!(error = %e, "failed to encode change event"),
                },
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(%user_id, skipped, "change stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}

pub async fn change_hook(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(notification): Json<ChangeNotification>,
) -> Result<StatusCode, AppError> {
    if let Some(secret) = &state.config.webhook_secret {
        let given = headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());
        if given != Some(secret.as_str()) {
            return Err(AppError(CoachError::Authentication(
                "Invalid webhook secret".to_string(),
            )));
        }
    }

    match notification.event() {
        Some(event) => state.signals.publish(event),
        None => debug!(table = %notification.table, kind = %notification.kind, "change for untracked table ignored"),
    }
    Ok(StatusCode::ACCEPTED)
}
