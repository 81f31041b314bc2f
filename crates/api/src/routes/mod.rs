pub mod auth;
pub mod client;
pub mod coach;
pub mod health;
pub mod shared;
