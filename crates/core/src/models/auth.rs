use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::profile::AccountType;

/// Metadata the auth provider stores alongside a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl UserMetadata {
    /// A client account is complete once it knows its type and player name.
    pub fn is_complete(&self) -> bool {
        self.account_type.is_some()
            && self
                .player_name
                .as_deref()
                .is_some_and(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The provider signed the user in immediately.
    SignedIn(Session),
    /// The provider is waiting for the user to confirm their email.
    ConfirmationSent(AuthUser),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: Option<String>,
    pub account_type: AccountType,
    pub player_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteAccountRequest {
    pub account_type: AccountType,
    pub player_name: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupParentRequest {
    pub parent_email: String,
    pub parent_password: String,
    pub parent_name: Option<String>,
    pub player_name: String,
    pub player_email: String,
    pub player_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupParentResponse {
    pub parent_id: Uuid,
    pub player_user_id: Uuid,
    /// The parent's player row, which the player login is linked to.
    pub player_id: Uuid,
}

/// Where the browser should go next after an auth action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRedirect {
    pub redirect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
