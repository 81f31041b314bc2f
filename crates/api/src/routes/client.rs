use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/client/dashboard", get(handlers::client::dashboard))
        .route(
            "/client/book",
            get(handlers::client::book_view).post(handlers::client::request_booking),
        )
        .route("/client/requests", get(handlers::client::list_requests))
        .route(
            "/client/requests/:id/cancel",
            post(handlers::client::cancel_request),
        )
        .route("/client/lessons", get(handlers::lessons::list_lessons))
        .route("/client/lessons/:id", get(handlers::lessons::get_lesson))
        .route(
            "/client/messages",
            get(handlers::messages::client_thread).post(handlers::messages::client_send),
        )
        .route(
            "/client/players",
            get(handlers::client::list_players).post(handlers::client::create_player),
        )
        .route("/client/players/:id", put(handlers::client::update_player))
}
