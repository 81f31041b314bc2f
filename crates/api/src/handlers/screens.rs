//! Public entry screens. They describe the form each screen submits so a
//! redirect to them always lands somewhere.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Screen {
    pub screen: &'static str,
    pub action: &'static str,
    pub providers: &'static [&'static str],
}

pub async fn index() -> Json<Screen> {
    login().await
}

pub async fn login() -> Json<Screen> {
    Json(Screen {
        screen: "login",
        action: "/auth/login",
        providers: &["/auth/google"],
    })
}

pub async fn signup() -> Json<Screen> {
    Json(Screen {
        screen: "signup",
        action: "/auth/signup",
        providers: &["/auth/google"],
    })
}

pub async fn reset_password() -> Json<Screen> {
    Json(Screen {
        screen: "reset_password",
        action: "/auth/reset-password",
        providers: &[],
    })
}
