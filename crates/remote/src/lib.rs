//! # Coachline Remote
//!
//! Typed access to the hosted backend that owns all persistence, auth and
//! booking logic. Each concern is a trait (`AuthApi`, `ProfileRepo`,
//! `ScheduleRepo`, `BookingRepo`, `LessonRepo`, `MessageRepo`) implemented
//! by [`BackendClient`], so callers depend on the trait and tests substitute
//! mocks.

pub mod client;
pub mod config;
pub mod error;
pub mod postgrest;
pub mod repositories;

pub mod mock;

pub use client::{BackendClient, Credential};
pub use config::RemoteConfig;
pub use error::{RemoteError, RemoteResult};
pub use repositories::{
    auth::AuthApi, bookings::BookingRepo, lessons::LessonRepo, messages::MessageRepo,
    profiles::ProfileRepo, schedule::ScheduleRepo,
};

/// Builds the client used at the composition root.
pub fn create_client(config: RemoteConfig) -> RemoteResult<BackendClient> {
    BackendClient::new(config)
}
