use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the coaching relationship an account is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coach,
    #[default]
    Client,
}

impl Role {
    /// Path a user of this role lands on after signing in.
    pub fn landing_path(self) -> &'static str {
        match self {
            Role::Coach => "/coach/dashboard",
            Role::Client => "/client/dashboard",
        }
    }

    /// Path prefix reserved for this role.
    pub fn path_prefix(self) -> &'static str {
        match self {
            Role::Coach => "/coach",
            Role::Client => "/client",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Coach => "coach",
            Role::Client => "client",
        }
    }
}

/// A client account is either a parent managing players or a player themself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Parent,
    Player,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub account_type: Option<AccountType>,
    pub time_zone: Option<String>,
    pub player_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Right,
    Left,
    Switch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub handedness: Option<Handedness>,
    pub height_inches: Option<i32>,
    pub weight_lbs: Option<i32>,
    pub age: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default = "default_player_status")]
    pub player_status: String,
    #[serde(default)]
    pub is_primary: bool,
}

pub fn default_player_status() -> String {
    "active".to_string()
}

/// Arguments of the `create_player` procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub account_id: Uuid,
    pub name: String,
    pub handedness: Option<Handedness>,
    pub height_inches: Option<i32>,
    pub weight_lbs: Option<i32>,
    pub age: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    pub player_status: String,
    pub is_primary: bool,
}

impl NewPlayer {
    pub fn primary(account_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            account_id,
            name: name.into(),
            handedness: None,
            height_inches: None,
            weight_lbs: None,
            age: None,
            date_of_birth: None,
            player_status: default_player_status(),
            is_primary: true,
        }
    }
}

/// Partial update of a player row; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handedness: Option<Handedness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_inches: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_lbs: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// The single settings row designating the coach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub id: i64,
    pub coach_id: Option<Uuid>,
}

/// A client profile together with its players, as shown on the coach roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(default)]
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlayerRequest {
    pub name: String,
    pub handedness: Option<Handedness>,
    pub height_inches: Option<i32>,
    pub weight_lbs: Option<i32>,
    pub age: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsView {
    pub profile: Profile,
    pub email: Option<String>,
}
