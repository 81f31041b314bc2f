//! Mock repositories for testing

pub use crate::repositories::{
    auth::MockAuthApi, bookings::MockBookingRepo, lessons::MockLessonRepo,
    messages::MockMessageRepo, profiles::MockProfileRepo, schedule::MockScheduleRepo,
};
