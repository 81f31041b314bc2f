use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::{profile::Profile, schedule::Opening},
    relation::Related,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Declined,
    Cancel,
}

/// How a pending booking is resolved by `decide_booking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Decline,
    Cancel,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Decline => "decline",
            Decision::Cancel => "cancel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub opening_id: Uuid,
    pub client_id: Uuid,
    pub status: BookingStatus,
    pub location_requested: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A booking row with its opening and requesting client embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingWithDetails {
    #[serde(flatten)]
    pub booking: Booking,
    #[serde(default)]
    pub opening: Related<Opening>,
    #[serde(default)]
    pub client: Related<Profile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRequest {
    pub opening_id: Uuid,
    pub idempotency_key: Option<Uuid>,
    pub location_requested: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookResponse {
    pub booking_id: Uuid,
    pub idempotency_key: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}
