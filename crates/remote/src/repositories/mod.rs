pub mod auth;
pub mod bookings;
pub mod lessons;
pub mod messages;
pub mod profiles;
pub mod schedule;
