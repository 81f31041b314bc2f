use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recurring weekly rule that the backend expands into openings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityTemplate {
    pub id: Uuid,
    pub coach_id: Option<Uuid>,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_minutes: i32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub coach_id: Uuid,
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_minutes: i32,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// A concrete, capacity-limited bookable slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub capacity: i32,
    pub spots_available: i32,
}

impl Opening {
    /// Whether a client may still request this opening at `now`.
    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        self.spots_available > 0 && self.start_at > now
    }

    pub fn spots_taken(&self) -> i32 {
        (self.capacity - self.spots_available).max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOpening {
    pub coach_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub capacity: i32,
    pub spots_available: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOpeningRequest {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default = "default_capacity")]
    pub capacity: i32,
}

fn default_capacity() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOpeningsRequest {
    pub weeks: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOpeningsResponse {
    pub created: i64,
}
