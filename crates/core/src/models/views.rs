//! View models returned by the screen routes.

use serde::{Deserialize, Serialize};

use crate::models::{
    booking::BookingWithDetails,
    lesson::LessonWithClient,
    schedule::Opening,
};

/// Literal shown when nothing can be booked.
pub const NO_OPENINGS: &str = "No Available Openings";

/// Acknowledgment shown after a booking request is accepted by the backend.
pub const BOOKING_REQUESTED: &str = "Booking request sent";

/// A list screen either has rows or renders an empty-state panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListView<T> {
    Empty { message: String },
    Populated { items: Vec<T> },
}

impl<T> ListView<T> {
    pub fn from_items(items: Vec<T>, empty_message: &str) -> Self {
        if items.is_empty() {
            ListView::Empty {
                message: empty_message.to_string(),
            }
        } else {
            ListView::Populated { items }
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            ListView::Empty { .. } => &[],
            ListView::Populated { items } => items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachDashboard {
    pub upcoming_lessons: Vec<LessonWithClient>,
    pub pending_requests: usize,
    pub unread_messages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDashboard {
    pub upcoming_lessons: Vec<LessonWithClient>,
    pub bookings: Vec<BookingWithDetails>,
    pub unread_messages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookView {
    pub openings: ListView<Opening>,
}
