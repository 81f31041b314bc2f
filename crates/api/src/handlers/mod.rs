pub mod account;
pub mod auth;
pub mod client;
pub mod coach;
pub mod events;
pub mod lessons;
pub mod messages;
pub mod screens;
pub mod settings;
