pub mod auth;
pub mod booking;
pub mod lesson;
pub mod messaging;
pub mod profile;
pub mod schedule;
pub mod views;
