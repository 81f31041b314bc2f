use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/coach/dashboard", get(handlers::coach::dashboard))
        .route(
            "/coach/availability",
            get(handlers::coach::list_templates).post(handlers::coach::create_template),
        )
        .route(
            "/coach/availability/:id",
            delete(handlers::coach::delete_template),
        )
        .route(
            "/coach/availability/:id/active",
            post(handlers::coach::set_template_active),
        )
        .route(
            "/coach/openings",
            get(handlers::coach::list_openings).post(handlers::coach::create_opening),
        )
        .route(
            "/coach/openings/generate",
            post(handlers::coach::generate_openings),
        )
        .route("/coach/openings/:id", delete(handlers::coach::delete_opening))
        .route("/coach/requests", get(handlers::coach::list_requests))
        .route(
            "/coach/requests/:id/decision",
            post(handlers::coach::decide_request),
        )
        .route("/coach/lessons", get(handlers::lessons::list_lessons))
        .route("/coach/lessons/:id", get(handlers::lessons::get_lesson))
        .route("/coach/lessons/:id/notes", post(handlers::lessons::add_note))
        .route("/coach/clients", get(handlers::coach::list_clients))
        .route("/coach/messages", get(handlers::messages::list_conversations))
        .route(
            "/coach/messages/:id",
            get(handlers::messages::coach_thread).post(handlers::messages::coach_send),
        )
}
