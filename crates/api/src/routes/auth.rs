use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(handlers::screens::index))
        .route("/login", get(handlers::screens::login))
        .route("/signup", get(handlers::screens::signup))
        .route("/reset-password", get(handlers::screens::reset_password))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/google", get(handlers::auth::google))
        .route("/auth/callback", get(handlers::auth::callback))
        .route("/auth/reset-password", post(handlers::auth::reset_password))
        .route("/auth/update-password", post(handlers::auth::update_password))
        .route("/auth/logout", post(handlers::auth::logout))
        .route(
            "/complete-account",
            get(handlers::account::get_metadata).post(handlers::account::complete_account),
        )
        .route("/api/signup-parent", post(handlers::account::signup_parent))
}
